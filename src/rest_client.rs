use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use crate::data::{PriceRecord, Symbol, DATE_FORMAT};
use crate::error::{AppError, AppResult};

/// Read side of the price API as seen by the dashboard.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest(&self, symbol: Symbol) -> AppResult<Option<PriceRecord>>;

    async fn history(&self, symbol: Symbol, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<PriceRecord>>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct PriceApiClient {
    pub client: Client,
    pub base_url: String,
}

impl PriceApiClient {
    /// `base_url` points at the prices collection, e.g. `http://localhost:5000/api/prices`.
    pub fn new(base_url: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Invalid response received from price API ({}): {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl PriceSource for PriceApiClient {
    async fn latest(&self, symbol: Symbol) -> AppResult<Option<PriceRecord>> {
        debug!("Fetching latest price for {}", symbol);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("crypto", symbol.as_str().to_lowercase())])
            .send()
            .await?;

        let body = Self::check(response).await?
            .json::<Envelope<Option<PriceRecord>>>()
            .await?;
        Ok(body.data)
    }

    async fn history(&self, symbol: Symbol, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<PriceRecord>> {
        debug!("Fetching {} history {} to {}", symbol, start, end);
        let url = format!("{}/{}", self.base_url, symbol.as_str().to_lowercase());
        let response = self
            .client
            .get(url)
            .query(&[
                ("start", start.format(DATE_FORMAT).to_string()),
                ("end", end.format(DATE_FORMAT).to_string()),
            ])
            .send()
            .await?;

        let body = Self::check(response).await?
            .json::<Envelope<Vec<PriceRecord>>>()
            .await?;
        Ok(body.data)
    }
}
