use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use crate::data::{DateRange, NewPrice, PriceRecord};
use crate::error::AppResult;

/// Append-only persistence for generated prices.
///
/// Names passed to `latest` and `history` are expected to be normalized already.
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn init_schema(&self) -> AppResult<()>;

    /// Writes every price in one batch, stamped with the current time.
    async fn insert_batch(&self, prices: &[NewPrice]) -> AppResult<usize>;

    async fn latest(&self, name: &str) -> AppResult<Option<PriceRecord>>;

    /// Records with `range.start <= timestamp < range.end`, oldest first.
    async fn history(&self, name: &str, range: &DateRange) -> AppResult<Vec<PriceRecord>>;
}

/// Process-local store, used with `PRICE_STORE=memory` and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<PriceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record with an explicit timestamp.
    #[cfg(test)]
    pub(crate) async fn insert_record(&self, name: &str, price: rust_decimal::Decimal, timestamp: chrono::DateTime<Utc>) -> PriceRecord {
        let mut records = self.records.write().await;
        let record = PriceRecord {
            id: records.len() as i64 + 1,
            name: name.to_string(),
            price,
            timestamp,
        };
        records.push(record.clone());
        record
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn init_schema(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_batch(&self, prices: &[NewPrice]) -> AppResult<usize> {
        let now = Utc::now();
        let mut records = self.records.write().await;

        for price in prices {
            let id = records.len() as i64 + 1;
            records.push(PriceRecord {
                id,
                name: price.name.clone(),
                price: price.price,
                timestamp: now,
            });
        }

        Ok(prices.len())
    }

    async fn latest(&self, name: &str) -> AppResult<Option<PriceRecord>> {
        let records = self.records.read().await;
        let latest = records
            .iter()
            .filter(|r| r.name == name)
            .max_by_key(|r| (r.timestamp, r.id))
            .cloned();

        Ok(latest)
    }

    async fn history(&self, name: &str, range: &DateRange) -> AppResult<Vec<PriceRecord>> {
        let records = self.records.read().await;
        let mut found: Vec<PriceRecord> = records
            .iter()
            .filter(|r| r.name == name && range.contains(&r.timestamp))
            .cloned()
            .collect();

        found.sort_by_key(|r| (r.timestamp, r.id));
        Ok(found)
    }
}
