/**
 * Application State Management
 *
 * `AppState` is the state container handed to the router. Handlers extract
 * only the part they need through `FromRef`, following Axum's recommended
 * pattern.
 *
 * ```rust,ignore
 * use axum::extract::State;
 * use sqlx::SqlitePool;
 *
 * async fn handler(State(pool): State<SqlitePool>) {
 *     // query the record store
 * }
 * ```
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

/// Shared state for all request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Submissions record store
    pub db_pool: SqlitePool,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}
