//! HTTP API for Eddy.
//!
//! Provides a [`RingServer`] that exposes the ring over an axum-based JSON
//! API:
//!
//! - `GET /hash-ring/node?key=K` — owner of `K` (404 on an empty ring)
//! - `POST /hash-ring/node?identifier=ID` — add a node
//! - `DELETE /hash-ring/node?identifier=ID` — remove a node (no-op if unknown)
//! - `GET /hash-ring/nodes` — current members
//! - `GET /hash-ring/stats` — replica, node and virtual node counts

mod error;
mod handlers;


use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use eddy_cluster::Membership;

pub use error::ApiError;
pub use handlers::RingStats;

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The ring membership being served.
    pub membership: Arc<Membership>,
}

/// Configuration for creating a [`RingServer`].
pub struct RingServerConfig {
    /// The membership to serve.
    pub membership: Arc<Membership>,
}

/// HTTP server backed by a [`Membership`].
pub struct RingServer {
    router: Router,
}

impl RingServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RingServerConfig) -> Self {
        let state = AppState {
            membership: config.membership,
        };
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the axum [`Router`] for the API.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(
                "/hash-ring/node",
                get(handlers::get_node_for_key)
                    .post(handlers::add_node)
                    .delete(handlers::remove_node),
            )
            .route("/hash-ring/nodes", get(handlers::list_nodes))
            .route("/hash-ring/stats", get(handlers::ring_stats))
            .with_state(state)
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve the API with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "ring API listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
