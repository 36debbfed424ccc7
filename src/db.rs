use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use crate::config::DatabaseConfig;
use crate::data::{DateRange, NewPrice, PriceRecord};
use crate::error::{AppError, AppResult};
use crate::store::PriceStore;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS prices (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(32) NOT NULL,
        price NUMERIC(12, 2) NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_prices_name_timestamp ON prices(name, timestamp)",
];

type PriceRow = (i64, String, Decimal, DateTime<Utc>);

fn into_record(row: PriceRow) -> PriceRecord {
    PriceRecord {
        id: row.0,
        name: row.1,
        price: row.2,
        timestamp: row.3,
    }
}

pub struct Database {
    pub pool: PgPool
}

impl Database {
    /// Builds the pool without touching the server; connections are opened on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.url)
            .map_err(|e| AppError::Configuration(format!("Invalid database url: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PriceStore for Database {
    async fn init_schema(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database schema initialized!");
        Ok(())
    }

    async fn insert_batch(&self, prices: &[NewPrice]) -> AppResult<usize> {
        if prices.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO prices (name, price, timestamp) ");
        builder.push_values(prices, |mut row, price| {
            row.push_bind(price.name.clone())
                .push_bind(price.price)
                .push_bind(now);
        });

        let result = builder.build().execute(&self.pool).await?;
        debug!("Inserted {} price rows", result.rows_affected());

        Ok(result.rows_affected() as usize)
    }

    async fn latest(&self, name: &str) -> AppResult<Option<PriceRecord>> {
        let row = sqlx::query_as::<_, PriceRow>(
            r#"
            SELECT id, name, price, timestamp
            FROM prices WHERE name = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_record))
    }

    async fn history(&self, name: &str, range: &DateRange) -> AppResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRow>(
            r#"
            SELECT id, name, price, timestamp
            FROM prices
            WHERE name = $1 AND timestamp >= $2 AND timestamp < $3
            ORDER BY timestamp ASC, id ASC
            "#
        )
        .bind(name)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_record).collect())
    }
}
