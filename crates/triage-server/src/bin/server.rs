//! Triage Server Binary

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use triage_server::{config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_config = config::load_config()?;
    if let Err(errors) = config::validate_config(&server_config) {
        for error in &errors {
            tracing::error!(%error, "configuration error");
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }

    info!("Starting Triage Server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(server_config);
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
