use anyhow::{Context, Result};
use std::env;
use tracing::info;

use crypto_price_feed::config::AppConfig;
use crypto_price_feed::dashboard::Dashboard;
use crypto_price_feed::data::Symbol;
use crypto_price_feed::rest_client::PriceApiClient;
use crypto_price_feed::telemetry::init_tracing;

/// Terminal dashboard: `dashboard [symbol] [start] [end]`.
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let args: Vec<String> = env::args().skip(1).collect();
    let symbol: Symbol = args
        .first()
        .map(|s| s.parse::<Symbol>())
        .transpose()?
        .unwrap_or(Symbol::Bitcoin);
    let start = args.get(1).cloned().unwrap_or_default();
    let end = args.get(2).cloned().unwrap_or_default();

    let client = PriceApiClient::new(&config.dashboard.api_url)?;
    let mut dashboard = Dashboard::new(client, &config.dashboard);
    let mut redraws = dashboard.subscribe();

    info!("Dashboard reading from {}", config.dashboard.api_url);
    dashboard.set_symbol(symbol).await;
    dashboard.fetch(&start, &end).await;

    loop {
        tokio::select! {
            changed = redraws.changed() => {
                if changed.is_err() {
                    break;
                }
                let chart = redraws.borrow_and_update().clone();
                println!("{}", chart.render());
                if let Some(lines) = chart.len().checked_sub(1).and_then(|last| chart.tooltip(last)) {
                    println!("  {}", lines.join(" | "));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.shutdown().await;
    Ok(())
}
