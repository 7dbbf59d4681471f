use std::sync::Arc;

use clap::Parser;
use common::signal::shutdown_signal;
use storage::Engine;
use storage::cli::Args;
use storage::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_args(&args).await?;
    info!(root = %config.root.display(), chunk_size = config.chunk_size, "starting storage engine");

    let engine = Arc::new(Engine::new(&config.root).with_chunk_size(config.chunk_size));
    storage::serve(config.listen, engine, shutdown_signal()).await
}
