//! HTTP handlers for the checkout shipping endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zuba_core::{Address, CartLine, DeliveryEstimate, RateQuote, Region};
use zuba_shipping::Resolution;

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Body of both quote endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesRequest {
    #[serde(default, alias = "cartLines", alias = "items")]
    pub cart_items: Vec<CartLine>,
    #[serde(default, alias = "destination", alias = "shippingAddress")]
    pub address: Option<Address>,
}

impl RatesRequest {
    fn into_parts(self) -> Result<(Vec<CartLine>, Address), ApiError> {
        let address = self
            .address
            .ok_or_else(|| ApiError::validation("address is required"))?;
        Ok((self.cart_items, address))
    }
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub success: bool,
    #[serde(flatten)]
    pub resolution: Resolution,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub success: bool,
    pub quote: RateQuote,
}

#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub success: bool,
    pub currency: String,
    pub regions: Vec<Region>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/shipping/rates`
pub async fn rates(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RatesRequest>, JsonRejection>,
) -> Result<Json<RatesResponse>, ApiError> {
    let Json(request) = payload?;
    let (lines, address) = request.into_parts()?;

    let resolution = state.resolver.resolve_detailed(&lines, &address).await?;
    debug!(
        request_id = %resolution.request_id,
        quotes = resolution.quotes.len(),
        is_fallback = resolution.is_fallback,
        "Rates resolved"
    );

    Ok(Json(RatesResponse {
        success: true,
        resolution,
    }))
}

/// `POST /api/shipping/estimate`
///
/// Formula only; never waits on the carrier.
pub async fn estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RatesRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Json(request) = payload?;
    let (lines, address) = request.into_parts()?;

    let quote = state.resolver.estimate(&lines, &address)?;
    Ok(Json(EstimateResponse {
        success: true,
        quote,
    }))
}

/// `GET /api/shipping/delivery-estimate/{country}`
pub async fn delivery_estimate(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> Json<DeliveryEstimate> {
    Json(state.resolver.delivery_estimate(&country))
}

/// `GET /api/shipping/regions`
pub async fn regions(State(state): State<Arc<AppState>>) -> Json<RegionsResponse> {
    Json(RegionsResponse {
        success: true,
        currency: state.resolver.currency().to_string(),
        regions: state.resolver.regions().regions().to_vec(),
    })
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    "OK"
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Unknown route")
}
