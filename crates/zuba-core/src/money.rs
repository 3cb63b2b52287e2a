//! # Money Module
//!
//! Provides the `Money` type used for every presented shipping cost.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RATE ARITHMETIC vs. PRESENTED PRICE                                    │
//! │                                                                         │
//! │  Fallback formula (f64):                                                │
//! │    base + extra items → + weight surcharge → × distance → × bulk       │
//! │                                                                         │
//! │  Rounding each step to cents compounds error across the two            │
//! │  multiplicative adjustments, so the formula stays in f64 and the       │
//! │  result is converted ONCE, here, into integer cents.                   │
//! │                                                                         │
//! │    46.0 × 0.85 = 39.099999999999994  ──► Money(3910) ──► "$39.10"      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zuba_core::money::Money;
//!
//! let cost = Money::from_major_f64(46.0 * 0.85);
//! assert_eq!(cost.cents(), 3910);
//! assert_eq!(cost.to_string(), "$39.10");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Wire Format
/// The storefront reads shipping costs as plain decimal numbers
/// (`"cost": 39.1`), so `Money` serializes as major units rather than as
/// the raw cent count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use zuba_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a floating point amount in major units to cents.
    ///
    /// Rounds half away from zero. Non-finite input maps to zero so a
    /// broken computation can never produce a garbage price; callers
    /// that care check `is_positive()`.
    ///
    /// ## Example
    /// ```rust
    /// use zuba_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(12.5).cents(), 1250);
    /// assert_eq!(Money::from_major_f64(9.994).cents(), 999);
    /// assert_eq!(Money::from_major_f64(9.995).cents(), 1000);
    /// assert_eq!(Money::from_major_f64(f64::NAN).cents(), 0);
    /// ```
    pub fn from_major_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // Nudge by a tiny epsilon so 9.995 (stored as 9.99499999...) rounds up
        let scaled = amount * 100.0;
        let nudged = scaled + scaled.signum() * 1e-7;
        Money(nudged.round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in major units (for JSON and arithmetic display).
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs. The storefront formats with the quote's currency code.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Ok(Money::from_major_f64(major))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
