use portfolio_tracker_server::{api::app_router, build_state, config::Config, init_tracing};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.debug);

    let state = build_state(&config)?;
    let router = app_router(state, &config);

    info!("Listening on {}", config.listen_addr);
    info!("Debug mode: {}", if config.debug { "ON" } else { "OFF" });
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
