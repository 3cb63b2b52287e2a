//! # Shipping Error Types
//!
//! Errors that can escape the rate resolver.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Shipping Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │  Configuration  │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  InvalidConfig  │  │  Unexpected             │ │
//! │  │  (400 to the    │  │  InvalidUrl     │  │  (500 to the caller)    │ │
//! │  │   caller)       │  │  ConfigLoad...  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Carrier failures are NOT here: they are absorbed by the fallback      │
//! │  path and only show up as a FallbackReason.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use zuba_core::{CoreError, ValidationError};

/// Result type alias for shipping operations.
pub type ShippingResult<T> = Result<T, ShippingError>;

/// Errors surfaced by rate resolution and configuration loading.
#[derive(Debug, Error)]
pub enum ShippingError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Cart or destination failed validation. No network call was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid shipping configuration.
    #[error("Invalid shipping configuration: {0}")]
    InvalidConfig(String),

    /// Carrier base URL does not parse or is not http(s).
    #[error("Invalid carrier URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Something that should not happen, e.g. a region configured so that
    /// the fallback formula yields a non-positive cost.
    #[error("Unexpected shipping error: {0}")]
    Unexpected(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ShippingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ShippingError::Validation(v),
            CoreError::InvalidRegionConfig { .. } => ShippingError::InvalidConfig(err.to_string()),
            CoreError::InvalidQuote { .. } => ShippingError::Unexpected(err.to_string()),
        }
    }
}

impl From<url::ParseError> for ShippingError {
    fn from(err: url::ParseError) -> Self {
        ShippingError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ShippingError {
    fn from(err: std::io::Error) -> Self {
        ShippingError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ShippingError {
    fn from(err: toml::de::Error) -> Self {
        ShippingError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ShippingError {
    /// Returns true if the caller sent bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ShippingError::Validation(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ShippingError::InvalidConfig(_)
                | ShippingError::InvalidUrl(_)
                | ShippingError::ConfigLoadFailed(_)
        )
    }
}
