//! # Region Classification
//!
//! Maps a destination country to the shipping region whose economics price
//! the fallback quote and whose delivery window is shown at checkout.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     classify(country_code)                              │
//! │                                                                         │
//! │   " gb " ──► trim + uppercase ──► "GB"                                 │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │   ┌────────┬────────┬────────┬────────┬─────────┬────────┬────────┐    │
//! │   │   CA   │   US   │   EU   │  ASIA  │ OCEANIA │   SA   │ AFRICA │ …  │
//! │   │  [CA]  │ [US…]  │ [GB…]  │ [CN…]  │ [AU…]   │ [BR…]  │ [NG…]  │    │
//! │   └────────┴────────┴───▲────┴────────┴─────────┴────────┴────────┘    │
//! │                         │ exact match                                   │
//! │                                                                         │
//! │   no match / empty / None ──────────────────────────► DEFAULT          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Region keys are not country codes: country `SA` (Saudi Arabia) belongs to
//! the Middle East region, country `ME` (Montenegro) to Europe.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::DeliveryEstimate;

// =============================================================================
// Region Code
// =============================================================================

/// Key of a shipping region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RegionCode {
    Ca,
    Us,
    Eu,
    Asia,
    Oceania,
    Sa,
    Africa,
    Me,
    Default,
}

impl RegionCode {
    /// Every region, in table order.
    pub const ALL: [RegionCode; 9] = [
        RegionCode::Ca,
        RegionCode::Us,
        RegionCode::Eu,
        RegionCode::Asia,
        RegionCode::Oceania,
        RegionCode::Sa,
        RegionCode::Africa,
        RegionCode::Me,
        RegionCode::Default,
    ];

    /// Returns the configuration key for this region.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegionCode::Ca => "CA",
            RegionCode::Us => "US",
            RegionCode::Eu => "EU",
            RegionCode::Asia => "ASIA",
            RegionCode::Oceania => "OCEANIA",
            RegionCode::Sa => "SA",
            RegionCode::Africa => "AFRICA",
            RegionCode::Me => "ME",
            RegionCode::Default => "DEFAULT",
        }
    }

    const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        RegionCode::ALL
            .into_iter()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidRegionConfig {
                region: s.to_string(),
                reason: "unknown region code".to_string(),
            })
    }
}

// =============================================================================
// Country Lists
// =============================================================================

const CANADA: &[&str] = &["CA"];

const USA: &[&str] = &["US", "PR", "VI", "GU", "AS", "MP"];

const EUROPE: &[&str] = &[
    "GB", "UK", "IE", "FR", "DE", "IT", "ES", "PT", "NL", "BE", "LU", "AT", "CH", "LI", "DK",
    "SE", "NO", "FI", "IS", "PL", "CZ", "SK", "HU", "SI", "HR", "RO", "BG", "GR", "CY", "MT",
    "EE", "LV", "LT", "MC", "SM", "VA", "AD", "AL", "BA", "ME", "MK", "RS", "XK", "MD", "UA",
    "BY",
];

const ASIA: &[&str] = &[
    "CN", "JP", "KR", "KP", "TW", "HK", "MO", "MN", "IN", "PK", "BD", "LK", "NP", "BT", "MV",
    "AF", "SG", "MY", "TH", "VN", "PH", "ID", "KH", "LA", "MM", "BN", "TL", "KZ", "UZ", "TM",
    "KG", "TJ",
];

const OCEANIA: &[&str] = &[
    "AU", "NZ", "FJ", "PG", "SB", "VU", "NC", "PF", "WS", "TO", "KI", "FM", "MH", "PW", "NR",
    "TV",
];

const SOUTH_AMERICA: &[&str] = &[
    "BR", "AR", "CL", "CO", "PE", "VE", "EC", "BO", "PY", "UY", "GY", "SR", "GF",
];

const AFRICA: &[&str] = &[
    "DZ", "AO", "BJ", "BW", "BF", "BI", "CM", "CV", "CF", "TD", "KM", "CG", "CD", "CI", "DJ",
    "EG", "GQ", "ER", "SZ", "ET", "GA", "GM", "GH", "GN", "GW", "KE", "LS", "LR", "LY", "MG",
    "MW", "ML", "MR", "MU", "MA", "MZ", "NA", "NE", "NG", "RW", "ST", "SN", "SC", "SL", "SO",
    "ZA", "SS", "SD", "TZ", "TG", "TN", "UG", "ZM", "ZW",
];

const MIDDLE_EAST: &[&str] = &[
    "AE", "SA", "QA", "KW", "BH", "OM", "YE", "IL", "PS", "JO", "LB", "SY", "IQ", "IR", "TR",
];

const COUNTRY_LISTS: [(RegionCode, &[&str]); 8] = [
    (RegionCode::Ca, CANADA),
    (RegionCode::Us, USA),
    (RegionCode::Eu, EUROPE),
    (RegionCode::Asia, ASIA),
    (RegionCode::Oceania, OCEANIA),
    (RegionCode::Sa, SOUTH_AMERICA),
    (RegionCode::Africa, AFRICA),
    (RegionCode::Me, MIDDLE_EAST),
];

/// Resolves a country code to its region key.
///
/// Case-insensitive and whitespace tolerant. `None`, empty and unknown
/// codes resolve to [`RegionCode::Default`].
pub fn region_code_for(country_code: Option<&str>) -> RegionCode {
    let Some(code) = country_code.map(str::trim).filter(|c| !c.is_empty()) else {
        return RegionCode::Default;
    };
    let code = code.to_ascii_uppercase();

    COUNTRY_LISTS
        .iter()
        .find(|(_, countries)| countries.contains(&code.as_str()))
        .map(|(region, _)| *region)
        .unwrap_or(RegionCode::Default)
}

// =============================================================================
// Region
// =============================================================================

/// A named bucket of shipping economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Region {
    pub code: RegionCode,
    pub display_name: String,
    /// Cost of the first item, in store currency.
    pub base_rate: f64,
    /// Cost of each additional item.
    pub extra_item_rate: f64,
    /// Scales the per-kg surcharge above 5 kg. Always ≥ 1.
    pub weight_multiplier: f64,
    /// Scales the long-distance surcharge. Always ≥ 1.
    pub distance_multiplier: f64,
    pub min_delivery_days: u32,
    pub max_delivery_days: u32,
}

impl Region {
    /// Projects this region into the estimate shown at checkout.
    pub fn delivery_estimate(&self) -> DeliveryEstimate {
        DeliveryEstimate {
            min_days: self.min_delivery_days,
            max_days: self.max_delivery_days,
            text: format!(
                "{}-{} business days",
                self.min_delivery_days, self.max_delivery_days
            ),
            region_name: self.display_name.clone(),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        let fail = |reason: &str| CoreError::InvalidRegionConfig {
            region: self.code.to_string(),
            reason: reason.to_string(),
        };

        if !self.base_rate.is_finite() || self.base_rate <= 0.0 {
            return Err(fail("base_rate must be greater than 0"));
        }
        if !self.extra_item_rate.is_finite() || self.extra_item_rate < 0.0 {
            return Err(fail("extra_item_rate must not be negative"));
        }
        if !(self.weight_multiplier.is_finite() && self.weight_multiplier >= 1.0) {
            return Err(fail("weight_multiplier must be at least 1"));
        }
        if !(self.distance_multiplier.is_finite() && self.distance_multiplier >= 1.0) {
            return Err(fail("distance_multiplier must be at least 1"));
        }
        if self.min_delivery_days > self.max_delivery_days {
            return Err(fail("min_delivery_days must not exceed max_delivery_days"));
        }
        Ok(())
    }
}

/// Built-in values: code, name, base, extra item, weight mult, distance mult, days.
struct Seed(RegionCode, &'static str, f64, f64, f64, f64, u32, u32);

const BUILTIN_REGIONS: [Seed; 9] = [
    Seed(RegionCode::Ca, "Canada", 13.0, 3.0, 1.0, 1.0, 3, 7),
    Seed(RegionCode::Us, "United States", 20.0, 5.0, 1.2, 1.1, 5, 10),
    Seed(RegionCode::Eu, "Europe", 35.0, 8.0, 1.5, 1.3, 7, 14),
    Seed(RegionCode::Asia, "Asia", 40.0, 10.0, 1.8, 1.5, 10, 20),
    Seed(RegionCode::Oceania, "Oceania", 45.0, 12.0, 2.0, 1.6, 12, 21),
    Seed(RegionCode::Sa, "South America", 40.0, 10.0, 1.8, 1.5, 10, 21),
    Seed(RegionCode::Africa, "Africa", 50.0, 12.0, 2.2, 1.8, 14, 28),
    Seed(RegionCode::Me, "Middle East", 45.0, 10.0, 1.8, 1.5, 10, 18),
    Seed(RegionCode::Default, "International", 50.0, 15.0, 2.0, 1.5, 14, 30),
];

// =============================================================================
// Region Overrides
// =============================================================================

/// Per-region values supplied by deployment configuration.
///
/// Every field is optional; unset fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_item_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_delivery_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delivery_days: Option<u32>,
}

// =============================================================================
// Region Table
// =============================================================================

/// Immutable lookup table of all regions.
///
/// Built once at process start and shared read-only (`Arc<RegionTable>`)
/// across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// The built-in table.
    pub fn builtin() -> &'static RegionTable {
        static TABLE: OnceLock<RegionTable> = OnceLock::new();
        TABLE.get_or_init(RegionTable::new_builtin)
    }

    fn new_builtin() -> Self {
        let regions = BUILTIN_REGIONS
            .iter()
            .map(|seed| Region {
                code: seed.0,
                display_name: seed.1.to_string(),
                base_rate: seed.2,
                extra_item_rate: seed.3,
                weight_multiplier: seed.4,
                distance_multiplier: seed.5,
                min_delivery_days: seed.6,
                max_delivery_days: seed.7,
            })
            .collect();
        RegionTable { regions }
    }

    /// Builds a table from the built-in values plus configured overrides.
    ///
    /// Keys are region codes (`"CA"`, `"EU"`, `"DEFAULT"`...), case
    /// insensitive. Unknown keys and values breaking the region invariants
    /// are rejected.
    pub fn with_overrides(overrides: &BTreeMap<String, RegionOverride>) -> CoreResult<Self> {
        let mut table = Self::new_builtin();

        for (key, patch) in overrides {
            let code: RegionCode = key.parse()?;
            let region = &mut table.regions[code.index()];

            if let Some(name) = &patch.display_name {
                region.display_name = name.clone();
            }
            if let Some(v) = patch.base_rate {
                region.base_rate = v;
            }
            if let Some(v) = patch.extra_item_rate {
                region.extra_item_rate = v;
            }
            if let Some(v) = patch.weight_multiplier {
                region.weight_multiplier = v;
            }
            if let Some(v) = patch.distance_multiplier {
                region.distance_multiplier = v;
            }
            if let Some(v) = patch.min_delivery_days {
                region.min_delivery_days = v;
            }
            if let Some(v) = patch.max_delivery_days {
                region.max_delivery_days = v;
            }

            region.validate()?;
        }

        Ok(table)
    }

    /// Looks up a region by key.
    pub fn get(&self, code: RegionCode) -> &Region {
        &self.regions[code.index()]
    }

    /// Classifies a destination country. Never fails.
    pub fn classify(&self, country_code: Option<&str>) -> &Region {
        self.get(region_code_for(country_code))
    }

    /// Delivery window for a destination country.
    pub fn delivery_estimate(&self, country_code: Option<&str>) -> DeliveryEstimate {
        self.classify(country_code).delivery_estimate()
    }

    /// All regions, in table order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new_builtin()
    }
}

/// Classifies against the built-in table.
///
/// ## Example
/// ```rust
/// use zuba_core::region::{classify, RegionCode};
///
/// assert_eq!(classify(Some("gb")).code, RegionCode::Eu);
/// assert_eq!(classify(Some("ca")).base_rate, 13.0);
/// assert_eq!(classify(None).code, RegionCode::Default);
/// ```
pub fn classify(country_code: Option<&str>) -> &'static Region {
    RegionTable::builtin().classify(country_code)
}

/// Delivery window against the built-in table.
pub fn delivery_estimate(country_code: Option<&str>) -> DeliveryEstimate {
    RegionTable::builtin().delivery_estimate(country_code)
}

// =============================================================================
// Unit Tests
// =============================================================================
