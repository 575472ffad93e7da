use std::sync::Arc;

use film_picker::{
    cache::{create_redis_client, Cache},
    config::Config,
    routes::{create_router, AppState},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Redis is optional; without it every request walks the watchlist
    let (cache, cache_handle) = match config.redis_url.as_deref() {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (cache, handle) = Cache::new(client);
            tracing::info!("Watchlist cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let state = AppState::build(&config, cache)?;
    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, site = %config.site_url(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
