//! HTTP storage node for Circlet.
//!
//! Provides a [`NodeServer`] exposing a [`ContentStore`] over HTTP, the wire
//! contract the router's HTTP transport speaks:
//!
//! - `GET /`: health probe
//! - `GET /{*path}`: fetch content (404 if absent)
//! - `POST /{*path}`: store the request body, answer with a JSON `PutReceipt`
//! - `PUT /{*path}`: same as `POST`
//!
//! [`ContentStore`]: circlet_store::ContentStore

mod error;
mod handlers;


use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use circlet_store::ContentStore;
use tokio::net::TcpListener;

pub use error::NodeError;

/// Default cap on a single upload body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024 * 1024;

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Where content lives.
    pub store: Arc<dyn ContentStore>,
}

/// Configuration for creating a [`NodeServer`].
pub struct NodeServerConfig {
    /// The store to serve.
    pub store: Arc<dyn ContentStore>,
    /// Largest accepted upload, in bytes.
    pub max_body_bytes: usize,
}

impl NodeServerConfig {
    /// Serve `store` with the default body limit.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// HTTP server backed by a [`ContentStore`].
pub struct NodeServer {
    router: Router,
}

impl NodeServer {
    /// Create a new server with the given configuration.
    pub fn new(config: NodeServerConfig) -> Self {
        let state = AppState {
            store: config.store,
        };

        let router = Router::new()
            .route("/", get(handlers::health))
            .route(
                "/{*path}",
                get(handlers::get_content)
                    .post(handlers::put_content)
                    .put(handlers::put_content),
            )
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .with_state(state);

        Self { router }
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on the given TCP address.
    pub async fn serve(self, addr: &str) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        tracing::info!(addr = %listener.local_addr()?, "storage node listening");
        axum::serve(listener, self.router).await
    }

    /// Serve with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "storage node listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
