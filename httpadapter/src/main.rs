use std::sync::Arc;

use clap::Parser;
use common::signal::shutdown_signal;
use httpadapter::cli::Args;
use httpadapter::config::Config;
use httpadapter::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_args(&args)?;
    info!(storage = %config.storage.uri(), "using storage engine");

    let state = Arc::new(AppState::connect_lazy(&config.storage));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("httpadapter listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
