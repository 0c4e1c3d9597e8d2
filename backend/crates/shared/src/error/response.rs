//! Axum response rendering for [`AppError`]

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::app_error::AppError;

/// Render as `{"error": "<message>"}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({ "error": self.message() });

        (status, Json(body)).into_response()
    }
}
