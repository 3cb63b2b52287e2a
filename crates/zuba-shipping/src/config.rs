//! # Shipping Configuration
//!
//! Configuration for the rate resolver and the HTTP service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ZUBA_CARRIER_API_KEY=sk_live_...                                   │
//! │     ZUBA_PORT=8080                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/zuba-shipping/shipping.toml (Linux)                      │
//! │     ~/Library/Application Support/com.zubahouse.shipping/...  (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     built-in regions, Gatineau warehouse, carrier disabled             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # shipping.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [carrier]
//! base_url = "https://api.carrier.example/v1"
//! api_key = "sk_live_..."
//! timeout_secs = 15
//!
//! [fallback]
//! currency = "CAD"
//!
//! [warehouse]
//! city = "Gatineau"
//! province = "QC"
//! postal_code = "J8Y 6T3"
//! country = "CA"
//! latitude = 45.4765
//! longitude = -75.7013
//!
//! [regions.CA]
//! base_rate = 13.0
//! extra_item_rate = 3.0
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;
use zuba_core::geo::{Coordinates, WAREHOUSE_COORDINATES};
use zuba_core::region::{RegionOverride, RegionTable};
use zuba_core::types::NormalizedAddress;
use zuba_core::DEFAULT_CURRENCY;

use crate::error::{ShippingError, ShippingResult};

// =============================================================================
// Server Settings
// =============================================================================

/// Where the HTTP service listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Carrier Settings
// =============================================================================

/// Live carrier API credentials.
///
/// The carrier is only called when both `base_url` and `api_key` are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for one rate lookup (seconds).
    #[serde(default = "default_carrier_timeout")]
    pub timeout_secs: u64,
}

fn default_carrier_timeout() -> u64 {
    15
}

impl Default for CarrierSettings {
    fn default() -> Self {
        CarrierSettings {
            base_url: None,
            api_key: None,
            timeout_secs: default_carrier_timeout(),
        }
    }
}

impl CarrierSettings {
    /// True when a live lookup can be attempted.
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.base_url) && present(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Fallback Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Currency of formula-based quotes, and of carrier rates that do not
    /// name one.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for FallbackSettings {
    fn default() -> Self {
        FallbackSettings {
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Warehouse Settings
// =============================================================================

/// The single shipping origin. Process-wide, never taken from a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSettings {
    #[serde(default = "default_warehouse_name")]
    pub name: String,
    #[serde(default)]
    pub street1: Option<String>,
    #[serde(default = "default_warehouse_city")]
    pub city: String,
    #[serde(default = "default_warehouse_province")]
    pub province: String,
    #[serde(default = "default_warehouse_postal_code")]
    pub postal_code: String,
    #[serde(default = "default_warehouse_country")]
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_warehouse_latitude")]
    pub latitude: f64,
    #[serde(default = "default_warehouse_longitude")]
    pub longitude: f64,
}

fn default_warehouse_name() -> String {
    "Zuba House".to_string()
}
fn default_warehouse_city() -> String {
    "Gatineau".to_string()
}
fn default_warehouse_province() -> String {
    "QC".to_string()
}
fn default_warehouse_postal_code() -> String {
    "J8Y 6T3".to_string()
}
fn default_warehouse_country() -> String {
    "CA".to_string()
}
fn default_warehouse_latitude() -> f64 {
    WAREHOUSE_COORDINATES.latitude
}
fn default_warehouse_longitude() -> f64 {
    WAREHOUSE_COORDINATES.longitude
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        WarehouseSettings {
            name: default_warehouse_name(),
            street1: None,
            city: default_warehouse_city(),
            province: default_warehouse_province(),
            postal_code: default_warehouse_postal_code(),
            country: default_warehouse_country(),
            phone: None,
            latitude: default_warehouse_latitude(),
            longitude: default_warehouse_longitude(),
        }
    }
}

impl WarehouseSettings {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// The `from` address sent to the carrier.
    pub fn origin_address(&self) -> NormalizedAddress {
        NormalizedAddress {
            name: Some(self.name.clone()),
            street1: self.street1.clone(),
            street2: None,
            city: self.city.clone(),
            province: Some(self.province.clone()),
            postal_code: Some(self.postal_code.clone()),
            country: self.country.clone(),
            phone: self.phone.clone(),
            email: None,
            coordinates: Some(self.coordinates()),
        }
    }
}

// =============================================================================
// Main Shipping Configuration
// =============================================================================

/// Complete shipping configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub carrier: CarrierSettings,

    #[serde(default)]
    pub fallback: FallbackSettings,

    #[serde(default)]
    pub warehouse: WarehouseSettings,

    /// Per-region overrides keyed by region code (`CA`, `EU`, `DEFAULT`...).
    #[serde(default)]
    pub regions: BTreeMap<String, RegionOverride>,
}

impl ShippingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shipping.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ShippingResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading shipping config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load shipping config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ShippingResult<()> {
        let base_url = self
            .carrier
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if let Some(base_url) = base_url {
            let parsed = Url::parse(base_url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ShippingError::InvalidUrl(format!(
                    "Carrier URL must start with http:// or https://, got: {}",
                    base_url
                )));
            }
        }

        if self.carrier.timeout_secs == 0 {
            return Err(ShippingError::InvalidConfig(
                "carrier.timeout_secs must be greater than 0".into(),
            ));
        }

        let currency = self.fallback.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ShippingError::InvalidConfig(format!(
                "fallback.currency must be a 3-letter code, got: '{}'",
                self.fallback.currency
            )));
        }

        if !self.warehouse.coordinates().is_valid() {
            return Err(ShippingError::InvalidConfig(
                "warehouse latitude/longitude out of range".into(),
            ));
        }

        self.region_table()?;

        Ok(())
    }

    /// Builds the region table with this config's overrides applied.
    pub fn region_table(&self) -> ShippingResult<RegionTable> {
        Ok(RegionTable::with_overrides(&self.regions)?)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ZUBA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("ZUBA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid ZUBA_PORT"),
            }
        }

        if let Some(url) = lookup("ZUBA_CARRIER_BASE_URL") {
            debug!(url = %url, "Overriding carrier URL from environment");
            self.carrier.base_url = Some(url);
        }

        if let Some(key) = lookup("ZUBA_CARRIER_API_KEY") {
            self.carrier.api_key = Some(key);
        }

        if let Some(timeout) = lookup("ZUBA_CARRIER_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(t) => {
                    debug!(timeout_secs = t, "Overriding carrier timeout from environment");
                    self.carrier.timeout_secs = t;
                }
                Err(_) => warn!(timeout = %timeout, "Ignoring invalid ZUBA_CARRIER_TIMEOUT_SECS"),
            }
        }

        if let Some(currency) = lookup("ZUBA_CURRENCY") {
            self.fallback.currency = currency.trim().to_uppercase();
        }

        let base_rate = lookup("ZUBA_FALLBACK_BASE_RATE")
            .and_then(|v| parse_rate_override("ZUBA_FALLBACK_BASE_RATE", &v));
        let extra_rate = lookup("ZUBA_FALLBACK_EXTRA_ITEM_RATE")
            .and_then(|v| parse_rate_override("ZUBA_FALLBACK_EXTRA_ITEM_RATE", &v));
        if base_rate.is_some() || extra_rate.is_some() {
            let default_region = self.default_region_override();
            if base_rate.is_some() {
                default_region.base_rate = base_rate;
            }
            if extra_rate.is_some() {
                default_region.extra_item_rate = extra_rate;
            }
        }
    }

    /// The override entry for the DEFAULT region, whatever case its key
    /// was written in.
    fn default_region_override(&mut self) -> &mut RegionOverride {
        let key = self
            .regions
            .keys()
            .find(|k| k.eq_ignore_ascii_case("DEFAULT"))
            .cloned()
            .unwrap_or_else(|| "DEFAULT".to_string());
        self.regions.entry(key).or_default()
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "zubahouse", "shipping")
            .map(|dirs| dirs.config_dir().join("shipping.toml"))
    }
}

fn parse_rate_override(var: &str, value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(rate) => Some(rate),
        Err(_) => {
            warn!(var, value = %value, "Ignoring invalid fallback rate override");
            None
        }
    }
}
