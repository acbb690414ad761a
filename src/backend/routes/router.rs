/**
 * Router Configuration
 *
 * Combines the route configurations into a single Axum router, adds request
 * tracing and a JSON 404 fallback.
 */

use axum::http::StatusCode;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new());

    // Fallback handler for 404
    let router = router.fallback(|| async {
        BackendError::handler(StatusCode::NOT_FOUND, "Not Found")
    });

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
