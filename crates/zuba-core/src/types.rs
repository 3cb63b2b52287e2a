//! # Domain Types
//!
//! Quote and address types shared by the resolver and the HTTP layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Address      │   │   RateQuote     │   │DeliveryEstimate │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  city           │   │  carrier_name   │   │  min_days       │       │
//! │  │  country(_code) │──►│  service_name   │◄──│  max_days       │       │
//! │  │  postal_code?   │   │  cost (Money)   │   │  text           │       │
//! │  │  coordinates?   │   │  is_live_quote  │   │  region_name    │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │ validate                                                    │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │NormalizedAddress│  what the carrier API receives                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::geo::Coordinates;
use crate::money::Money;

// =============================================================================
// Delivery Estimate
// =============================================================================

/// Delivery window shown next to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeliveryEstimate {
    pub min_days: u32,
    pub max_days: u32,
    /// e.g. "3-7 business days"
    pub text: String,
    pub region_name: String,
}

impl DeliveryEstimate {
    /// Estimate reported by a carrier as a single day count.
    pub fn from_carrier_days(days: u32, region_name: impl Into<String>) -> Self {
        let text = if days == 1 {
            "1 business day".to_string()
        } else {
            format!("{days} business days")
        };
        DeliveryEstimate {
            min_days: days,
            max_days: days,
            text,
            region_name: region_name.into(),
        }
    }
}

// =============================================================================
// Rate Quote
// =============================================================================

/// A priced shipping option.
///
/// ## Invariants
/// - `cost` is strictly positive (enforced by the constructors)
/// - never mutated after construction; fields are read through accessors
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RateQuote {
    carrier_name: String,
    service_name: String,
    #[ts(type = "number")]
    cost: Money,
    currency_code: String,
    delivery_estimate: DeliveryEstimate,
    is_live_quote: bool,
    region_name: String,
}

/// Carrier name used for formula-based quotes.
pub const FALLBACK_CARRIER: &str = "Zuba House Shipping";
/// Service name used for formula-based quotes.
pub const FALLBACK_SERVICE: &str = "Standard";

impl RateQuote {
    /// A quote returned by the live carrier API.
    pub fn live(
        carrier_name: impl Into<String>,
        service_name: impl Into<String>,
        cost: f64,
        currency_code: impl Into<String>,
        delivery_estimate: DeliveryEstimate,
        region_name: impl Into<String>,
    ) -> CoreResult<Self> {
        Self::build(
            carrier_name.into(),
            service_name.into(),
            cost,
            currency_code.into(),
            delivery_estimate,
            true,
            region_name.into(),
        )
    }

    /// A quote computed by the fallback formula.
    pub fn fallback(
        cost: f64,
        currency_code: impl Into<String>,
        delivery_estimate: DeliveryEstimate,
    ) -> CoreResult<Self> {
        let region_name = delivery_estimate.region_name.clone();
        Self::build(
            FALLBACK_CARRIER.to_string(),
            FALLBACK_SERVICE.to_string(),
            cost,
            currency_code.into(),
            delivery_estimate,
            false,
            region_name,
        )
    }

    fn build(
        carrier_name: String,
        service_name: String,
        cost: f64,
        currency_code: String,
        delivery_estimate: DeliveryEstimate,
        is_live_quote: bool,
        region_name: String,
    ) -> CoreResult<Self> {
        let rounded = Money::from_major_f64(cost);
        if !cost.is_finite() || !rounded.is_positive() {
            return Err(CoreError::InvalidQuote {
                carrier: carrier_name,
                service: service_name,
                cost,
            });
        }

        Ok(RateQuote {
            carrier_name,
            service_name,
            cost: rounded,
            currency_code,
            delivery_estimate,
            is_live_quote,
            region_name,
        })
    }

    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn delivery_estimate(&self) -> &DeliveryEstimate {
        &self.delivery_estimate
    }

    pub fn is_live_quote(&self) -> bool {
        self.is_live_quote
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }
}

/// Sorts quotes ascending by cost. Stable: equal costs keep carrier order.
pub fn sort_quotes(quotes: &mut [RateQuote]) {
    quotes.sort_by_key(|q| q.cost);
}

// =============================================================================
// Addresses
// =============================================================================

/// Destination address as submitted by the storefront checkout.
///
/// Only `city` and a country (code or name) are required; everything else
/// is passed through to the carrier when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "street", alias = "addressLine1")]
    pub street1: Option<String>,
    #[serde(default, alias = "addressLine2")]
    pub street2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "postal", alias = "zip", alias = "zipCode")]
    pub postal_code: Option<String>,
    #[serde(default, alias = "state")]
    pub province: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::coordinates_opt")]
    pub coordinates: Option<Coordinates>,
}

impl Address {
    /// A minimal destination.
    pub fn new(city: impl Into<String>, country_code: impl Into<String>) -> Self {
        Address {
            city: Some(city.into()),
            country_code: Some(country_code.into()),
            ..Default::default()
        }
    }

    /// `country_code` if set, otherwise `country`.
    pub fn raw_country(&self) -> Option<&str> {
        self.country_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.country.as_deref())
    }
}

/// A validated address in the shape the carrier API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// ISO 3166 alpha-2, upper case.
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Only kept when valid; never sent to the carrier.
    #[serde(skip)]
    pub coordinates: Option<Coordinates>,
}

// =============================================================================
// Unit Tests
// =============================================================================
