//! # Error Types
//!
//! Domain-specific error types for zuba-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zuba-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  zuba-shipping errors (separate crate)                                 │
//! │  ├── CarrierError     - Live rate lookup failures (never surfaced)     │
//! │  └── ShippingError    - What the resolver returns                      │
//! │                                                                         │
//! │  shipping-api errors (in app)                                          │
//! │  └── ApiError         - What the storefront sees (JSON)                │
//! │                                                                         │
//! │  Flow: ValidationError → ShippingError → ApiError → Storefront         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A quote would have been built with a non-positive or non-finite cost.
    ///
    /// ## When This Occurs
    /// - A region override configured a zero or negative base rate
    /// - A carrier returned a rate that slipped past filtering
    ///
    /// Quotes are never constructed in this state.
    #[error("Invalid quote cost {cost} for {carrier} / {service}")]
    InvalidQuote {
        carrier: String,
        service: String,
        cost: f64,
    },

    /// Region table override is inconsistent.
    #[error("Invalid configuration for region {region}: {reason}")]
    InvalidRegionConfig { region: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when the caller's cart or destination doesn't meet
/// requirements. They are raised before any network call is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed postal code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
