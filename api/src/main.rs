//! docrelay API server binary.

use anyhow::Context;
use docrelay_api::{AppState, Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,docrelay_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).context("failed to initialize state")?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        send_timeout = ?config.realtime.send_timeout,
        "Starting docrelay API server"
    );

    Server::new(config, state)
        .run()
        .await
        .context("server error")?;

    Ok(())
}
