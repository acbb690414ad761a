/**
 * Server Initialization
 *
 * Builds the Axum application from an open database pool. Opening the pool
 * is left to the caller so tests can hand in an in-memory database.
 */

use axum::Router;
use sqlx::SqlitePool;

use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub fn create_app(db_pool: SqlitePool) -> Router<()> {
    tracing::info!("Initializing price survey backend server");
    let app = create_router(AppState::new(db_pool));
    tracing::info!("Router configured");
    app
}
