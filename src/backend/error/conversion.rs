/**
 * Error Conversion
 *
 * Renders backend errors as JSON so clients can read them with the same
 * decoder they use for successful answers:
 *
 * ```json
 * {
 *   "ok": false,
 *   "error": "Error message",
 *   "status": 500
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[HTTP] {} {}", status.as_u16(), message);
        } else {
            tracing::debug!("[HTTP] {} {}", status.as_u16(), message);
        }

        let body = serde_json::json!({
            "ok": false,
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
