use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::data::{normalize_symbol, DateRange};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    crypto: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    start: Option<String>,
    end: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/prices", get(api_latest_price))
        .route("/api/prices/{crypto}", get(api_price_history))
}

async fn api_latest_price(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LatestQuery>,
) -> Result<Json<Value>, AppError> {
    let crypto = q
        .crypto
        .ok_or_else(|| AppError::InvalidRequest("crypto query parameter is required".to_string()))?;
    let name = normalize_symbol(&crypto)?;

    let latest = state.store.latest(&name).await?;
    Ok(Json(json!({ "data": latest })))
}

async fn api_price_history(
    State(state): State<Arc<AppState>>,
    Path(crypto): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let name = normalize_symbol(&crypto)?;
    let range = DateRange::parse(q.start.as_deref(), q.end.as_deref())?;

    let history = state.store.history(&name, &range).await?;
    tracing::debug!("History for {} returned {} records", name, history.len());

    Ok(Json(json!({ "data": history })))
}
