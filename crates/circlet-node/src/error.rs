//! HTTP error mapping for the storage node.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use circlet_store::StoreError;

/// Errors returned by node handlers.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Nothing is stored at the requested path.
    #[error("no such path: {0}")]
    NoSuchPath(String),

    /// An error from the content store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl NodeError {
    /// Map to an HTTP status code.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoSuchPath(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::CapacityExceeded { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            Self::Store(StoreError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
