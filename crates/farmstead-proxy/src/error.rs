//! Error types for the proxy.
//!
//! [`ProxyError`] converts into an Axum response with a
//! `{"error", "status"}` JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use farmstead_ledger::StoreError;

/// Errors that can occur while serving a proxy request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The requested record or operation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required query parameter is missing or malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The ledger rejected or failed the request.
    #[error("ledger error: {0}")]
    Ledger(#[from] StoreError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) | Self::Ledger(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::InvalidQuery(_)
            | Self::Ledger(StoreError::Unsupported { .. } | StoreError::WrongChain { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
