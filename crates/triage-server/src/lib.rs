//! Triage API server.
//!
//! HTTP surface for the admin back-end's request gate. Every protected
//! route passes through the same pipeline: bearer-token authentication,
//! per-key rate limiting, then policy evaluation, with denials recorded as
//! security events through the audit capture channel.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
    drain: JoinHandle<()>,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let (state, drain) = AppState::new(config.clone());
        Self {
            config,
            state,
            drain,
        }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// Run the server, binding to the configured address.
    ///
    /// Returns once a shutdown signal has been handled and the audit drain
    /// has flushed.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Server listening on {}", addr);

        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Dropping the state drops the last capture handle, which lets the
        // drain task finish flushing buffered events.
        drop(self.state);
        self.drain.await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
