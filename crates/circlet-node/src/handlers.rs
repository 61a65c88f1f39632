//! Request handlers.

use axum::Json;
use axum::extract::{Path, State};
use bytes::Bytes;
use circlet_types::PutReceipt;
use tracing::{debug, info};

use crate::AppState;
use crate::error::NodeError;

/// `GET /`: liveness probe.
pub(crate) async fn health() -> &'static str {
    "ok"
}

/// `GET /{*path}`: return the stored bytes.
pub(crate) async fn get_content(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Bytes, NodeError> {
    match state.store.get(&path).await? {
        Some(data) => {
            debug!(%path, size = data.len(), "served content");
            Ok(data)
        }
        None => Err(NodeError::NoSuchPath(path)),
    }
}

/// `POST|PUT /{*path}`: store the body, replacing any previous content.
pub(crate) async fn put_content(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Json<PutReceipt>, NodeError> {
    let receipt = state.store.put(&path, body).await?;
    info!(path = %receipt.path, size = receipt.size, "stored content");
    Ok(Json(receipt))
}
