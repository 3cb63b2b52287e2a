//! # Carrier Rate Client
//!
//! The only outbound network call in the engine: one POST asking a
//! multi-carrier rate API for quotes.
//!
//! ## Request / Response
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST {base_url}/rates                                                  │
//! │  Authorization: Bearer {api_key}                                        │
//! │                                                                         │
//! │  { "from":   { warehouse address },                                     │
//! │    "to":     { normalized destination },                                │
//! │    "parcel": { weightKg, lengthCm, widthCm, heightCm } }                │
//! │                                                                         │
//! │  200 OK                                                                 │
//! │  { "rates": [ { "carrier": "UPS", "service_name": "Ground",             │
//! │                 "total": "12.50", "currency": "CAD",                    │
//! │                 "delivery_days": 4 }, ... ] }                           │
//! │                                                                         │
//! │  A bare JSON array of rates is accepted too.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures never reach the storefront. They are reported as a
//! [`CarrierError`] and turned into a fallback quote by the resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;
use zuba_core::lenient;
use zuba_core::package::Package;
use zuba_core::types::NormalizedAddress;

use crate::config::CarrierSettings;
use crate::error::{ShippingError, ShippingResult};
use crate::hook::FallbackReason;

const USER_AGENT: &str = concat!("zuba-shipping/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Wire Types
// =============================================================================

/// Body of the rate lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRequest {
    pub from: NormalizedAddress,
    pub to: NormalizedAddress,
    pub parcel: Package,
}

/// One rate as returned by the carrier API.
///
/// Every field is optional and numeric fields accept numbers or numeric
/// strings. Rates without a usable amount are discarded by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarrierRate {
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default, alias = "service", alias = "serviceName")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub cost: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "deliveryDays", deserialize_with = "lenient::f64_opt")]
    pub delivery_days: Option<f64>,
}

impl CarrierRate {
    /// `total`, else `cost`, when finite and strictly positive.
    pub fn amount(&self) -> Option<f64> {
        self.total
            .or(self.cost)
            .filter(|v| v.is_finite() && *v > 0.0)
    }

    /// Transit days, when the carrier gave a positive whole-ish number.
    pub fn transit_days(&self) -> Option<u32> {
        self.delivery_days
            .filter(|d| d.is_finite() && *d >= 1.0)
            .map(|d| d.round().min(f64::from(u32::MAX)) as u32)
    }
}

/// Rate list envelope. Entries stay untyped so one malformed rate does not
/// discard its siblings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RatesResponse {
    Wrapped { rates: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

impl RatesResponse {
    fn into_rates(self) -> Vec<CarrierRate> {
        let entries = match self {
            RatesResponse::Wrapped { rates } | RatesResponse::Bare(rates) => rates,
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<CarrierRate>(entry) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    debug!(index, error = %e, "Skipping malformed carrier rate");
                    None
                }
            })
            .collect()
    }
}

// =============================================================================
// Carrier Error
// =============================================================================

/// Why a live rate lookup failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CarrierError {
    /// No base URL or API key configured.
    #[error("Carrier API not configured")]
    NotConfigured,

    /// No answer within the configured timeout.
    #[error("Carrier API timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or TLS failure.
    #[error("Carrier API unreachable: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("Carrier API returned HTTP {0}")]
    HttpStatus(u16),

    /// Body was not a rate list.
    #[error("Carrier API returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl CarrierError {
    pub fn reason(&self) -> FallbackReason {
        match self {
            CarrierError::NotConfigured => FallbackReason::NotConfigured,
            CarrierError::Timeout(_) => FallbackReason::Timeout,
            CarrierError::Transport(_) => FallbackReason::Transport,
            CarrierError::HttpStatus(code) => FallbackReason::HttpStatus(*code),
            CarrierError::InvalidPayload(_) => FallbackReason::InvalidPayload,
        }
    }
}

// =============================================================================
// Client Trait
// =============================================================================

/// A source of live shipping rates.
#[async_trait]
pub trait CarrierRateClient: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch_rates(&self, request: &RateRequest) -> Result<Vec<CarrierRate>, CarrierError>;
}

/// Used when no carrier is configured. Always fails fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCarrier;

#[async_trait]
impl CarrierRateClient for DisabledCarrier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn fetch_rates(
        &self,
        _request: &RateRequest,
    ) -> Result<Vec<CarrierRate>, CarrierError> {
        Err(CarrierError::NotConfigured)
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// reqwest-backed client for the carrier rate API.
#[derive(Debug, Clone)]
pub struct HttpCarrierClient {
    http: Client,
    rates_url: Url,
    api_key: String,
    timeout: Duration,
}

impl HttpCarrierClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ShippingResult<Self> {
        let rates_url = rates_url(base_url)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ShippingError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpCarrierClient {
            http,
            rates_url,
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn rates_url(&self) -> &Url {
        &self.rates_url
    }

    fn transport_error(&self, err: reqwest::Error) -> CarrierError {
        if err.is_timeout() {
            CarrierError::Timeout(self.timeout)
        } else {
            CarrierError::Transport(err.to_string())
        }
    }
}

/// `{base}/rates`, keeping any path prefix on the base URL.
fn rates_url(base_url: &str) -> ShippingResult<Url> {
    let mut base = Url::parse(base_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("rates")?)
}

#[async_trait]
impl CarrierRateClient for HttpCarrierClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rates(&self, request: &RateRequest) -> Result<Vec<CarrierRate>, CarrierError> {
        debug!(url = %self.rates_url, to = %request.to.country, "Requesting carrier rates");

        let response = self
            .http
            .post(self.rates_url.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarrierError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let parsed: RatesResponse = serde_json::from_slice(&body)
            .map_err(|e| CarrierError::InvalidPayload(e.to_string()))?;

        Ok(parsed.into_rates())
    }
}

/// Picks the live client for the given settings, or [`DisabledCarrier`].
pub fn carrier_from_settings(
    settings: &CarrierSettings,
) -> ShippingResult<Arc<dyn CarrierRateClient>> {
    match (&settings.base_url, &settings.api_key) {
        (Some(base_url), Some(api_key)) if settings.is_configured() => Ok(Arc::new(
            HttpCarrierClient::new(base_url, api_key.clone(), settings.timeout())?,
        )),
        _ => Ok(Arc::new(DisabledCarrier)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zuba_core::types::Address;
    use zuba_core::validation::validate_destination;

    use crate::config::WarehouseSettings;

    fn request() -> RateRequest {
        RateRequest {
            from: WarehouseSettings::default().origin_address(),
            to: validate_destination(&Address::new("Toronto", "CA")).unwrap(),
            parcel: Package::default(),
        }
    }

    fn client(server: &MockServer, timeout: Duration) -> HttpCarrierClient {
        HttpCarrierClient::new(&server.uri(), "test-key", timeout).unwrap()
    }

    #[test]
    fn test_rates_url_keeps_prefix() {
        assert_eq!(
            rates_url("https://api.example.com/v1").unwrap().as_str(),
            "https://api.example.com/v1/rates"
        );
        assert_eq!(
            rates_url("https://api.example.com/v1/").unwrap().as_str(),
            "https://api.example.com/v1/rates"
        );
        assert!(rates_url("::nope").is_err());
    }

    #[test]
    fn test_rate_parsing_is_lenient() {
        let rates: Vec<CarrierRate> = serde_json::from_value(json!([
            {"carrier": "UPS", "service": "Ground", "total": "12.50", "delivery_days": 4},
            {"carrier": "FedEx", "service_name": "Express", "cost": 30},
            {"total": "free"},
            {"total": -4, "cost": 9}
        ]))
        .unwrap();

        assert_eq!(rates[0].service_name.as_deref(), Some("Ground"));
        assert_eq!(rates[0].amount(), Some(12.5));
        assert_eq!(rates[0].transit_days(), Some(4));
        assert_eq!(rates[1].amount(), Some(30.0));
        assert_eq!(rates[2].amount(), None);
        // total present but negative: not replaced by cost
        assert_eq!(rates[3].amount(), None);
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(CarrierError::NotConfigured.reason(), FallbackReason::NotConfigured);
        assert_eq!(
            CarrierError::HttpStatus(502).reason(),
            FallbackReason::HttpStatus(502)
        );
        assert_eq!(
            CarrierError::Timeout(Duration::from_secs(15)).reason(),
            FallbackReason::Timeout
        );
    }

    #[test]
    fn test_carrier_from_settings() {
        let disabled = carrier_from_settings(&CarrierSettings::default()).unwrap();
        assert_eq!(disabled.name(), "disabled");

        let settings = CarrierSettings {
            base_url: Some("https://api.example.com".into()),
            api_key: Some("k".into()),
            timeout_secs: 15,
        };
        assert_eq!(carrier_from_settings(&settings).unwrap().name(), "http");

        let blank_key = CarrierSettings {
            api_key: Some("  ".into()),
            ..settings
        };
        assert_eq!(carrier_from_settings(&blank_key).unwrap().name(), "disabled");
    }

    #[tokio::test]
    async fn test_disabled_carrier() {
        let err = DisabledCarrier.fetch_rates(&request()).await.unwrap_err();
        assert_eq!(err, CarrierError::NotConfigured);
    }

    #[tokio::test]
    async fn test_fetch_rates_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rates"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": [
                    {"carrier": "UPS", "service_name": "Ground", "total": 12.5},
                    {"carrier": "Canada Post", "service_name": "Expedited", "total": "9.99"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rates = client(&server, Duration::from_secs(5))
            .fetch_rates(&request())
            .await
            .unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1].amount(), Some(9.99));
    }

    #[tokio::test]
    async fn test_fetch_rates_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"total": 7}])))
            .mount(&server)
            .await;

        let rates = client(&server, Duration::from_secs(5))
            .fetch_rates(&request())
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rates_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(5))
            .fetch_rates(&request())
            .await
            .unwrap_err();
        assert_eq!(err, CarrierError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_fetch_rates_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(5))
            .fetch_rates(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, CarrierError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_fetch_rates_skips_malformed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": [
                    {"carrier": "Canada Post", "total": 9.99},
                    {"carrier": 42, "total": 12.5},
                    "not a rate"
                ]
            })))
            .mount(&server)
            .await;

        let rates = client(&server, Duration::from_secs(5))
            .fetch_rates(&request())
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].carrier.as_deref(), Some("Canada Post"));
        assert_eq!(rates[0].amount(), Some(9.99));
    }

    #[tokio::test]
    async fn test_fetch_rates_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"rates": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_millis(200))
            .fetch_rates(&request())
            .await
            .unwrap_err();
        assert_eq!(err, CarrierError::Timeout(Duration::from_millis(200)));
    }

    #[tokio::test]
    async fn test_fetch_rates_connection_refused() {
        // Pooled mock servers keep listening after drop; use a released port.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let uri = format!("http://127.0.0.1:{port}");
        let client = HttpCarrierClient::new(&uri, "k", Duration::from_secs(2)).unwrap();
        let err = client.fetch_rates(&request()).await.unwrap_err();
        assert!(matches!(err, CarrierError::Transport(_) | CarrierError::Timeout(_)));
    }
}
