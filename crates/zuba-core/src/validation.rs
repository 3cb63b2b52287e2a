//! # Validation Module
//!
//! Input checks run before any rate is computed or any network call is made.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rate Request Validation                            │
//! │                                                                         │
//! │  cart lines ──► validate_cart_lines                                     │
//! │                 ├── empty?        → Required("cartItems")               │
//! │                 └── > 100 lines?  → OutOfRange("cartItems")             │
//! │                                                                         │
//! │  address ────► validate_destination                                     │
//! │                ├── city blank?    → Required("city")                    │
//! │                ├── country blank? → Required("country")                 │
//! │                ├── CA postal?     → validate_ca_postal_code             │
//! │                └── OK             → NormalizedAddress                   │
//! │                                                                         │
//! │  Any error here means the carrier API is never called.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::package::CartLine;
use crate::types::{Address, NormalizedAddress};
use crate::MAX_CART_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cart
// =============================================================================

/// Checks the cart is non-empty and within the line limit.
///
/// ## Example
/// ```rust
/// use zuba_core::package::CartLine;
/// use zuba_core::validation::validate_cart_lines;
///
/// assert!(validate_cart_lines(&[CartLine::new(None, 1)]).is_ok());
/// assert!(validate_cart_lines(&[]).is_err());
/// ```
pub fn validate_cart_lines(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "cartItems".to_string(),
        });
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cartItems".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Country
// =============================================================================

/// Country names the storefront is known to send instead of codes.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("CANADA", "CA"),
    ("UNITED STATES", "US"),
    ("UNITED STATES OF AMERICA", "US"),
    ("USA", "US"),
    ("U.S.A.", "US"),
    ("U.S.", "US"),
    ("UNITED KINGDOM", "GB"),
    ("GREAT BRITAIN", "GB"),
    ("ENGLAND", "GB"),
    ("FRANCE", "FR"),
    ("GERMANY", "DE"),
    ("ITALY", "IT"),
    ("SPAIN", "ES"),
    ("BELGIUM", "BE"),
    ("NETHERLANDS", "NL"),
    ("AUSTRALIA", "AU"),
    ("NEW ZEALAND", "NZ"),
    ("CHINA", "CN"),
    ("JAPAN", "JP"),
    ("INDIA", "IN"),
    ("BRAZIL", "BR"),
    ("MEXICO", "MX"),
    ("NIGERIA", "NG"),
    ("GHANA", "GH"),
    ("KENYA", "KE"),
    ("SOUTH AFRICA", "ZA"),
    ("CAMEROON", "CM"),
    ("COTE D'IVOIRE", "CI"),
    ("IVORY COAST", "CI"),
    ("SENEGAL", "SN"),
    ("UNITED ARAB EMIRATES", "AE"),
    ("UAE", "AE"),
    ("SAUDI ARABIA", "SA"),
];

/// Normalizes a country code or name to an upper-case code.
///
/// Known names map through the alias table; anything else is trimmed and
/// upper-cased. Blank input yields `None`.
///
/// ```rust
/// use zuba_core::validation::normalize_country;
///
/// assert_eq!(normalize_country(" ca ").as_deref(), Some("CA"));
/// assert_eq!(normalize_country("United States").as_deref(), Some("US"));
/// assert_eq!(normalize_country("   "), None);
/// ```
pub fn normalize_country(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    let code = COUNTRY_ALIASES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or(upper);

    Some(code)
}

// =============================================================================
// Postal Codes
// =============================================================================

/// Validates a Canadian postal code and returns it as `A1A 1A1`.
///
/// ## Rules
/// - letter, digit, letter, optional space or hyphen, digit, letter, digit
/// - case insensitive
///
/// ## Example
/// ```rust
/// use zuba_core::validation::validate_ca_postal_code;
///
/// assert_eq!(validate_ca_postal_code("k1a0b1").unwrap(), "K1A 0B1");
/// assert_eq!(validate_ca_postal_code("J8Y-6T3").unwrap(), "J8Y 6T3");
/// assert!(validate_ca_postal_code("12345").is_err());
/// ```
pub fn validate_ca_postal_code(code: &str) -> ValidationResult<String> {
    let invalid = || ValidationError::InvalidFormat {
        field: "postalCode".to_string(),
        reason: "must look like A1A 1A1".to_string(),
    };

    let upper = code.trim().to_uppercase();
    let chars: Vec<char> = upper.chars().collect();
    let compact: Vec<char> = match chars.len() {
        6 => chars,
        7 if chars[3] == ' ' || chars[3] == '-' => chars
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .map(|(_, c)| *c)
            .collect(),
        _ => return Err(invalid()),
    };

    let shape_ok = compact.iter().enumerate().all(|(i, c)| {
        if i % 2 == 0 {
            c.is_ascii_alphabetic()
        } else {
            c.is_ascii_digit()
        }
    });
    if !shape_ok {
        return Err(invalid());
    }

    let head: String = compact[..3].iter().collect();
    let tail: String = compact[3..].iter().collect();
    Ok(format!("{head} {tail}"))
}

// =============================================================================
// Destination
// =============================================================================

fn clean(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validates a destination and produces the carrier-facing address.
///
/// ## Rules
/// - `city` must be present and non-blank
/// - `countryCode` or `country` must be present; names are normalized
/// - for CA destinations a present postal code must be a valid `A1A 1A1`
/// - other postal codes pass through trimmed
/// - out-of-range coordinates are dropped, not rejected
pub fn validate_destination(address: &Address) -> ValidationResult<NormalizedAddress> {
    let city = clean(address.city.as_ref()).ok_or_else(|| ValidationError::Required {
        field: "city".to_string(),
    })?;

    let country = address
        .raw_country()
        .and_then(normalize_country)
        .ok_or_else(|| ValidationError::Required {
            field: "country".to_string(),
        })?;

    let postal_code = match clean(address.postal_code.as_ref()) {
        Some(code) if country == "CA" => Some(validate_ca_postal_code(&code)?),
        other => other,
    };

    Ok(NormalizedAddress {
        name: clean(address.name.as_ref()),
        street1: clean(address.street1.as_ref()),
        street2: clean(address.street2.as_ref()),
        city,
        province: clean(address.province.as_ref()),
        postal_code,
        country,
        phone: clean(address.phone.as_ref()),
        email: clean(address.email.as_ref()),
        coordinates: address.coordinates.filter(|c| c.is_valid()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
