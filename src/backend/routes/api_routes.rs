/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Submissions
 * - `POST /api/submissions` - Create (201 / 409 DUPLICATE / 400 VALIDATION_ERROR)
 * - `GET /api/submissions` - List, newest first, filtered by query string
 * - `POST /api/submissions/verify` - `{outletName, day}` -> `{ok, exists, id?}`
 *
 * ## Products
 * - `GET /api/products` - The survey's product catalogue
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::server::state::AppState;
use crate::backend::submissions::handlers::{
    create_submission, list_products, list_submissions, verify_submission,
};

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/submissions",
            post(create_submission).get(list_submissions),
        )
        .route("/api/submissions/verify", post(verify_submission))
        .route("/api/products", get(list_products))
}
