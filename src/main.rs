use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spindle::config::{Args, Config};
use spindle::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args)?.into_server()?;
    tracing::info!(
        root = %cfg.root.display(),
        mode = ?cfg.mode,
        mime_types = cfg.mime_types.len(),
        "Configuration loaded"
    );

    tokio::select! {
        res = server::listener::run(Arc::new(cfg)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
