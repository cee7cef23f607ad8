//! Ultimate Tracker API server.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracker_server::{config::Config, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::parse();
    start_server(config).await
}
