//! HTTP server adapter.
//!
//! Serves fee-adjusted quotes in the routing API's own shape, so a client
//! pointed at this server instead of the routing API keeps working.

mod error;
mod handlers;

pub use error::{QUOTE_FAILED, VALIDATION_ERROR, WebError};
pub use handlers::QuoteParams;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::routing::QuoteService;

pub struct AppState {
    pub quotes: Arc<QuoteService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/quote", get(handlers::quote))
        .route("/funds", get(handlers::funds))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
