//! Story sync inbound surface.
//!
//! Binds an HTTP server that receives Pivotal Tracker activity webhooks and
//! hands each delivery to the [`pipeline`] batch driver.
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/tracker_activity` | `POST` | Tracker activity webhook |
//! | `/` | `GET` | Health check (load balancer default) |
//!
//! Any other method on a known route is answered with `405`, any other path
//! with `404`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Credential matching, content negotiation and status
//! mapping all live here. The [`pipeline`] crate sees only a parsed
//! [`pipeline::ChangeEvent`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use pipeline::{IssueTracker, LinkedIssueResolver, OwnerMapping};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

pub mod credentials;
mod handlers;

pub use credentials::BasicAuthCredentials;

/// Path of the Tracker activity webhook.
pub const ACTIVITY_PATH: &str = "/tracker_activity";

/// Errors that stop the listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything a request handler needs. Read-only once the server starts.
pub struct AppState {
    pub resolver: Arc<dyn LinkedIssueResolver>,
    pub issues: Arc<dyn IssueTracker>,
    /// `None` disables owner to assignee propagation.
    pub owners: Option<OwnerMapping>,
    pub credentials: BasicAuthCredentials,
}

/// Builds the HTTP routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route(ACTIVITY_PATH, post(handlers::tracker_activity))
        .with_state(Arc::new(state))
}

/// Serves [`router`] on `addr` until Ctrl-C is received.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ListenerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;
    info!(%addr, "Listening for Tracker activity");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ListenerError::Serve)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
