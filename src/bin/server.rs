use anyhow::Context;
use clap::Parser;
use signpost::config::{get_config, CliArgs};
use signpost::logging::init_logging;
use signpost::{create_app, AppState};
use tracing::info;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let config = get_config(args);
    let _guard = init_logging(&config.log_level, config.log_format);

    let app = create_app(AppState::seeded(), &config).context("Failed to build route table")?;

    let addr = config
        .bind_address()
        .map_err(anyhow::Error::msg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
