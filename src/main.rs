use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use lifeos::config::AppConfig;
use lifeos::server::{build_app, build_state, init_tracing, shutdown_signal};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("LifeOS exited with error: {:#}", error);
        eprintln!("LifeOS exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server)?;
    config.validate()?;
    info!(environment = ?config.server.environment, "Configuration loaded");

    let state = build_state(&config).await?;
    let app = build_app(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "LifeOS API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
