//! Lenient numeric parsing for storefront payloads.
//!
//! Product shipping profiles are edited through admin forms, so weights and
//! dimensions reach us as numbers, numeric strings (`"2.5"`), strings with
//! a unit suffix (`"12kg"`), empty strings, or `null`. Anything that does
//! not yield a finite number becomes `None` and the caller applies its
//! default.

use serde::{Deserialize, Deserializer};

use crate::geo::Coordinates;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawNumber {
    fn into_f64(self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(n).filter(|n| n.is_finite()),
            RawNumber::Text(s) => parse_leading_f64(&s),
            RawNumber::Other(_) => None,
        }
    }
}

/// Serde adapter for `Option<f64>` fields that must never fail to parse.
///
/// Use with `#[serde(default, deserialize_with = "lenient::f64_opt")]`.
pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(RawNumber::into_f64))
}

#[derive(Deserialize)]
struct RawCoordinates {
    #[serde(default, alias = "lat", deserialize_with = "f64_opt")]
    latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon", deserialize_with = "f64_opt")]
    longitude: Option<f64>,
}

/// Serde adapter for optional destination coordinates.
///
/// Each component is read like [`f64_opt`]. A pair with a missing or
/// out-of-range component, or a value that is not an object at all, becomes
/// `None` so the distance adjustment is skipped instead of rejecting the
/// address.
pub fn coordinates_opt<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| serde_json::from_value::<RawCoordinates>(value).ok())
        .and_then(|raw| match (raw.latitude, raw.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        })
        .filter(Coordinates::is_valid))
}

/// Parses the longest numeric prefix of `input`.
///
/// ```rust
/// use zuba_core::lenient::parse_leading_f64;
///
/// assert_eq!(parse_leading_f64(" 2.5 "), Some(2.5));
/// assert_eq!(parse_leading_f64("12kg"), Some(12.0));
/// assert_eq!(parse_leading_f64("kg"), None);
/// assert_eq!(parse_leading_f64(""), None);
/// ```
pub fn parse_leading_f64(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
