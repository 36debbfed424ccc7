use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error};
use crate::config::GeneratorConfig;
use crate::data::{NewPrice, Symbol};
use crate::scheduler::ScheduledTask;
use crate::store::PriceStore;

/// Produces one synthetic USD price per tracked symbol.
#[derive(Debug, Clone)]
pub struct PriceGenerator {
    pub symbols: Vec<Symbol>,
    min_cents: i64,
    max_cents: i64,
}

impl PriceGenerator {
    pub fn new(symbols: Vec<Symbol>, min_price: u32, max_price: u32) -> Self {
        Self {
            symbols,
            min_cents: i64::from(min_price) * 100,
            max_cents: i64::from(max_price) * 100,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(Symbol::ALL.to_vec(), config.min_price, config.max_price)
    }

    pub fn min_price(&self) -> Decimal {
        Decimal::new(self.min_cents, 2)
    }

    pub fn max_price(&self) -> Decimal {
        Decimal::new(self.max_cents, 2)
    }

    // Drawing whole cents keeps every price at exactly two decimal places.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<NewPrice> {
        self.symbols
            .iter()
            .map(|symbol| NewPrice {
                name: symbol.as_str().to_string(),
                price: Decimal::new(rng.gen_range(self.min_cents..=self.max_cents), 2),
            })
            .collect()
    }
}

/// One tick: generate a batch and write it. Failures are logged and the tick is skipped.
pub async fn run_tick(store: &dyn PriceStore, generator: &PriceGenerator) -> Option<usize> {
    let batch = generator.generate(&mut rand::thread_rng());

    match store.insert_batch(&batch).await {
        Ok(written) => {
            debug!("Stored {} generated prices", written);
            Some(written)
        }
        Err(e) => {
            error!("Failed to store generated prices: {}", e);
            None
        }
    }
}

/// Starts the recurring generator; the first batch is written one interval after start.
pub fn spawn_generator(store: Arc<dyn PriceStore>, config: &GeneratorConfig) -> ScheduledTask {
    let generator = Arc::new(PriceGenerator::from_config(config));

    ScheduledTask::spawn_delayed("price-generator", config.interval(), move || {
        let store = Arc::clone(&store);
        let generator = Arc::clone(&generator);
        async move {
            run_tick(store.as_ref(), &generator).await;
        }
    })
}
