//! # Zuba House Shipping API
//!
//! Thin axum layer over [`zuba_shipping::RateResolver`].
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/shipping/rates                        live or fallback quotes│
//! │  POST /api/shipping/estimate                     formula only           │
//! │  GET  /api/shipping/delivery-estimate/{country}  delivery window        │
//! │  GET  /api/shipping/regions                      active region table    │
//! │  GET  /health                                    liveness               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use zuba_shipping::RateResolver;

pub use error::{ApiError, ErrorCode};

/// Shared state for all handlers.
pub struct AppState {
    pub resolver: RateResolver,
}

impl AppState {
    pub fn new(resolver: RateResolver) -> Self {
        AppState { resolver }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/shipping/rates", post(routes::rates))
        .route("/api/shipping/estimate", post(routes::estimate))
        .route(
            "/api/shipping/delivery-estimate/{country}",
            get(routes::delivery_estimate),
        )
        .route("/api/shipping/regions", get(routes::regions))
        .route("/health", get(routes::health))
        .fallback(routes::not_found)
        .with_state(state)
}
