use std::sync::Arc;
use crate::store::PriceStore;

/// Shared application state, passed to route handlers via `axum::extract::State`.
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}
