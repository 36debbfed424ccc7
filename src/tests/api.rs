use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::api_router;
use crate::state::AppState;
use crate::store::MemoryStore;

fn app(store: Arc<MemoryStore>) -> Router {
    api_router(AppState::new(store))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn latest_price_is_case_insensitive() {
    let store = Arc::new(MemoryStore::new());
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    store.insert_record("Bitcoin", Decimal::new(10000, 2), t0).await;
    store.insert_record("Bitcoin", Decimal::new(11000, 2), t0 + Duration::seconds(10)).await;
    let app = app(store);

    for uri in ["/api/prices?crypto=bitcoin", "/api/prices?crypto=BITCOIN", "/api/prices?crypto=Bitcoin"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Bitcoin");
        assert_eq!(body["data"]["price"].as_f64(), Some(110.0));
    }
}

#[tokio::test]
async fn latest_price_is_null_without_records() {
    let app = app(Arc::new(MemoryStore::new()));
    let (status, body) = get(&app, "/api/prices?crypto=litecoin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn missing_or_empty_symbol_is_bad_request() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = get(&app, "/api/prices").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("crypto"));

    let (status, _) = get(&app, "/api/prices?crypto=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_includes_whole_end_day_only() {
    let store = Arc::new(MemoryStore::new());
    store.insert_record("Ripple", Decimal::new(50000, 2), Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()).await;
    store.insert_record("Ripple", Decimal::new(60000, 2), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 1).unwrap()).await;
    let app = app(store);

    let (status, body) = get(&app, "/api/prices/ripple?start=2024-01-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["price"].as_f64(), Some(500.0));
    assert_eq!(data[0]["timestamp"], "2024-01-01T12:00:00Z");
}

#[tokio::test]
async fn history_is_ascending_across_days() {
    let store = Arc::new(MemoryStore::new());
    let base = Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap();
    for (offset, cents) in [(2, 30000), (0, 10000), (1, 20000)] {
        store.insert_record("Ethereum", Decimal::new(cents, 2), base + Duration::days(offset)).await;
    }
    let app = app(store);

    let (_, body) = get(&app, "/api/prices/ETHEREUM?start=2024-02-10&end=2024-02-12").await;
    let prices: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![100.0, 200.0, 300.0]);
}

#[tokio::test]
async fn empty_range_returns_empty_list() {
    let store = Arc::new(MemoryStore::new());
    store.insert_record("Bitcoin", Decimal::new(10000, 2), Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()).await;
    let app = app(store);

    let (status, body) = get(&app, "/api/prices/bitcoin?start=2023-01-01&end=2023-01-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));

    let (status, body) = get(&app, "/api/prices/bitcoin?start=2024-01-06&end=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn malformed_dates_are_bad_request() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, _) = get(&app, "/api/prices/bitcoin?start=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/prices/bitcoin?start=yesterday&end=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(Arc::new(MemoryStore::new()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/prices?crypto=bitcoin")
                .header("origin", "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow = response.headers().get("access-control-allow-origin").unwrap();
    assert_eq!(allow, "*");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(Arc::new(MemoryStore::new()));
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
