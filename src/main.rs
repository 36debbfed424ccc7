use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use crypto_price_feed::config::{AppConfig, StoreKind};
use crypto_price_feed::db::Database;
use crypto_price_feed::generator::spawn_generator;
use crypto_price_feed::routes::api_router;
use crypto_price_feed::state::AppState;
use crypto_price_feed::store::{MemoryStore, PriceStore};
use crypto_price_feed::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let store: Arc<dyn PriceStore> = match config.database.store {
        StoreKind::Postgres => Arc::new(Database::connect_lazy(&config.database)?),
        StoreKind::Memory => {
            info!("Using in-memory price store");
            Arc::new(MemoryStore::new())
        }
    };

    // Startup keeps going without a database; requests fail until it is reachable.
    match store.init_schema().await {
        Ok(()) => info!("Price store connected"),
        Err(e) => error!("Price store unavailable: {}", e),
    }

    let generator = spawn_generator(Arc::clone(&store), &config.generator);
    let app = api_router(AppState::new(store));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    generator.stop().await;
    info!("Price generator stopped, bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, gracefully stopping…");
}
