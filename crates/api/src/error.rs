//! HTTP error mapping
//!
//! Every error body is a JSON object carrying a human-readable `error`, the
//! stable `code` and the variant's own fields, so a client can rebuild the
//! exact [`Error`]:
//!
//! ```json
//! {"error": "Conflict, please retry", "code": "conflict", "name": "plan", ...}
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docsync_core::Error;
use serde_json::{json, Value};
use tracing::error;

/// Message sent with every 409
pub const CONFLICT_MESSAGE: &str = "Conflict, please retry";

/// Error returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound { .. } | Error::ItemNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidPath { .. } | Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } | Error::RetriesExhausted { .. } => StatusCode::CONFLICT,
            Error::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let message = match &self.0 {
            Error::Conflict { .. } => CONFLICT_MESSAGE.to_string(),
            other => other.to_string(),
        };
        let mut body = serde_json::to_value(&self.0).unwrap_or_else(|_| json!({}));
        if let Value::Object(map) = &mut body {
            map.insert("error".to_string(), Value::String(message));
            map.insert("code".to_string(), Value::from(self.0.code()));
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
