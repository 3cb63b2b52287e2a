//! # zuba-core: Pure Shipping Logic for Zuba House
//!
//! Everything needed to price a parcel without touching the network:
//! region classification, package aggregation, the fallback rate formula,
//! and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Zuba House Shipping Engine                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront checkout (React)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shipping-api (axum)                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           zuba-shipping (RateResolver, carrier client)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ zuba-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  region  │ │ package  │ │ fallback │ │validation│          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  money   │ │  types   │ │   geo    │ │ catalog  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`region`] - Country → shipping region classification
//! - [`package`] - Cart lines → one parcel
//! - [`fallback`] - Deterministic rate formula
//! - [`geo`] - Haversine distance from the warehouse
//! - [`validation`] - Cart and destination checks
//! - [`catalog`] - Legacy / v2 product document adapter
//! - [`money`] - Integer-cent money type
//! - [`types`] - Quotes, estimates, addresses
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use zuba_core::fallback::{fallback_cost, FallbackInput};
//! use zuba_core::package::{aggregate, total_quantity, CartLine, ShippingProfile};
//! use zuba_core::region::classify;
//!
//! let lines = vec![CartLine::new(Some(ShippingProfile::metric(2.0, 30.0, 20.0, 10.0)), 1)];
//! let package = aggregate(&lines);
//! let region = classify(Some("CA"));
//!
//! let input = FallbackInput::from_warehouse(region, &package, total_quantity(&lines), None);
//! assert_eq!(fallback_cost(&input), 13.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod geo;
pub mod lenient;
pub mod money;
pub mod package;
pub mod region;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use package::{CartLine, Package, ShippingProfile};
pub use region::{Region, RegionCode, RegionTable};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum cart lines accepted in a single rate request.
pub const MAX_CART_LINES: usize = 100;

/// Store currency used when neither the carrier nor configuration says
/// otherwise.
pub const DEFAULT_CURRENCY: &str = "CAD";
