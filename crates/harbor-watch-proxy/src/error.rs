//! Proxy error type mapping to HTTP status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use harbor_watch_core::BackendError;

#[derive(Debug)]
pub enum AppError {
    /// The request body was unusable.
    Validation(String),
    /// The inference provider failed.
    Upstream(BackendError),
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Upstream(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(e) => {
                // Upstream details can include provider account info; keep them in the log
                tracing::error!(error = %e, "upstream inference request failed");
                (StatusCode::BAD_GATEWAY, "Upstream inference request failed".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
