//! # zuba-shipping: Rate Resolution for Zuba House
//!
//! Wraps the pure logic of `zuba-core` with the one piece of I/O the engine
//! performs: asking a live carrier API for rates, and falling back to the
//! deterministic formula when that fails.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shipping Layer                                  │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                      RateResolver                                 │ │
//! │  │   validate ──► aggregate ──► classify ──► live? ──► fallback      │ │
//! │  └───────┬──────────────────────────┬─────────────────────┬──────────┘ │
//! │          │                          │                     │            │
//! │          ▼                          ▼                     ▼            │
//! │  ┌───────────────┐        ┌──────────────────┐   ┌─────────────────┐  │
//! │  │ RegionTable   │        │ CarrierRateClient│   │  FallbackHook   │  │
//! │  │ (Arc, frozen) │        │ Http / Disabled  │   │  tracing / Fn   │  │
//! │  └───────────────┘        └──────────────────┘   └─────────────────┘  │
//! │                                                                         │
//! │  ShippingConfig: TOML file + ZUBA_* environment                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`resolver`] - RateResolver orchestration
//! - [`carrier`] - Carrier client trait and reqwest implementation
//! - [`hook`] - Fallback events
//! - [`config`] - Configuration loading
//! - [`error`] - Error types

pub mod carrier;
pub mod config;
pub mod error;
pub mod hook;
pub mod resolver;

pub use carrier::{
    carrier_from_settings, CarrierError, CarrierRate, CarrierRateClient, DisabledCarrier,
    HttpCarrierClient, RateRequest,
};
pub use config::ShippingConfig;
pub use error::{ShippingError, ShippingResult};
pub use hook::{FallbackEvent, FallbackHook, FallbackReason, TracingFallbackHook};
pub use resolver::{RateResolver, Resolution};
