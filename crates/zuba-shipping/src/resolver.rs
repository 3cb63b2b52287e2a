//! # Rate Resolver
//!
//! Turns a cart and a destination into an ordered list of shipping quotes.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         resolve(lines, address)                         │
//! │                                                                         │
//! │  1. VALIDATE ── cart empty / city or country missing? ──► Err(400)     │
//! │        │        (no network call)                                       │
//! │        ▼                                                                │
//! │  2. AGGREGATE ── lines ──► one Package                                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. CLASSIFY ── country ──► Region                                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. LIVE ATTEMPT ── carrier.fetch_rates, bounded by timeout             │
//! │        │                                                                │
//! │        ├── ≥ 1 valid rate ──► live quotes, cheapest first ──► Ok        │
//! │        │                                                                │
//! │        └── timeout / error / non-2xx / bad body / no valid rate         │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  5. FALLBACK ── hook.on_fallback(event)                                 │
//! │                 formula ──► [one fallback quote] ──► Ok                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver holds no mutable state: the region table, carrier client
//! and hook are shared read-only, so one instance serves all requests
//! concurrently. There are no retries; one failed attempt means fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;
use zuba_core::fallback::{fallback_breakdown, FallbackInput};
use zuba_core::geo::Coordinates;
use zuba_core::package::{aggregate, total_quantity, CartLine, Package};
use zuba_core::region::{Region, RegionCode, RegionTable};
use zuba_core::types::{sort_quotes, Address, DeliveryEstimate, NormalizedAddress, RateQuote};
use zuba_core::validation::{normalize_country, validate_cart_lines, validate_destination};
use zuba_core::DEFAULT_CURRENCY;

use crate::carrier::{carrier_from_settings, CarrierRate, CarrierRateClient, RateRequest};
use crate::config::{ShippingConfig, WarehouseSettings};
use crate::error::ShippingResult;
use crate::hook::{FallbackEvent, FallbackHook, FallbackReason, TracingFallbackHook};

/// Carrier name used when a live rate does not name one.
pub const UNKNOWN_CARRIER: &str = "Carrier";
/// Service name used when a live rate does not name one.
pub const DEFAULT_SERVICE: &str = "Standard";

/// Default upper bound for the live attempt.
pub const DEFAULT_CARRIER_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Resolution
// =============================================================================

/// Full outcome of one resolution, for callers that need more than the
/// quotes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub request_id: Uuid,
    /// Cheapest first. Never empty.
    pub quotes: Vec<RateQuote>,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub region: RegionCode,
    pub region_name: String,
    pub package: Package,
}

// =============================================================================
// Rate Resolver
// =============================================================================

/// Orchestrates validation, aggregation, the live attempt and the fallback.
#[derive(Clone)]
pub struct RateResolver {
    regions: Arc<RegionTable>,
    carrier: Arc<dyn CarrierRateClient>,
    hook: Arc<dyn FallbackHook>,
    origin: NormalizedAddress,
    origin_coordinates: Coordinates,
    currency: String,
    timeout: Duration,
}

impl RateResolver {
    /// A resolver with the default warehouse, currency, timeout and a
    /// tracing hook.
    pub fn new(regions: Arc<RegionTable>, carrier: Arc<dyn CarrierRateClient>) -> Self {
        let warehouse = WarehouseSettings::default();
        RateResolver {
            regions,
            carrier,
            hook: Arc::new(TracingFallbackHook),
            origin: warehouse.origin_address(),
            origin_coordinates: warehouse.coordinates(),
            currency: DEFAULT_CURRENCY.to_string(),
            timeout: DEFAULT_CARRIER_TIMEOUT,
        }
    }

    /// Builds the resolver described by a loaded configuration.
    pub fn from_config(config: &ShippingConfig) -> ShippingResult<Self> {
        let regions = Arc::new(config.region_table()?);
        let carrier = carrier_from_settings(&config.carrier)?;

        info!(
            carrier = carrier.name(),
            currency = %config.fallback.currency,
            timeout_secs = config.carrier.timeout_secs,
            "Rate resolver configured"
        );

        Ok(Self::new(regions, carrier)
            .with_warehouse(&config.warehouse)
            .with_currency(config.fallback.currency.clone())
            .with_timeout(config.carrier.timeout()))
    }

    pub fn with_hook(mut self, hook: Arc<dyn FallbackHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_warehouse(mut self, warehouse: &WarehouseSettings) -> Self {
        self.origin = warehouse.origin_address();
        self.origin_coordinates = warehouse.coordinates();
        self
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Quotes for a cart, cheapest first.
    ///
    /// Only validation failures and internal errors are returned as `Err`;
    /// any carrier problem yields a single fallback quote.
    pub async fn resolve(
        &self,
        lines: &[CartLine],
        destination: &Address,
    ) -> ShippingResult<Vec<RateQuote>> {
        Ok(self.resolve_detailed(lines, destination).await?.quotes)
    }

    /// Same as [`RateResolver::resolve`], with the package, region and
    /// fallback status attached.
    pub async fn resolve_detailed(
        &self,
        lines: &[CartLine],
        destination: &Address,
    ) -> ShippingResult<Resolution> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "resolve_rates",
            %request_id,
            lines = lines.len(),
            country = tracing::field::Empty,
            region = tracing::field::Empty,
        );

        self.resolve_in_span(request_id, lines, destination)
            .instrument(span)
            .await
    }

    async fn resolve_in_span(
        &self,
        request_id: Uuid,
        lines: &[CartLine],
        destination: &Address,
    ) -> ShippingResult<Resolution> {
        validate_cart_lines(lines)?;
        let to = validate_destination(destination)?;

        let package = aggregate(lines);
        let quantity = total_quantity(lines);
        let region = self.regions.classify(Some(&to.country));

        let current = tracing::Span::current();
        current.record("country", to.country.as_str());
        current.record("region", region.code.as_str());
        debug!(?package, quantity, "Cart aggregated");

        let started = Instant::now();
        let live = self.live_quotes(&to, &package, region).await;

        let (quotes, fallback_reason) = match live {
            Ok(quotes) => {
                info!(
                    count = quotes.len(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Live carrier rates returned"
                );
                (quotes, None)
            }
            Err(reason) => {
                self.hook.on_fallback(&FallbackEvent {
                    request_id,
                    reason,
                    latency: started.elapsed(),
                    country: to.country.clone(),
                    region: region.code,
                    occurred_at: Utc::now(),
                });
                let quote =
                    self.fallback_quote(region, &package, quantity, to.coordinates.as_ref())?;
                (vec![quote], Some(reason))
            }
        };

        Ok(Resolution {
            request_id,
            quotes,
            is_fallback: fallback_reason.is_some(),
            fallback_reason,
            region: region.code,
            region_name: region.display_name.clone(),
            package,
        })
    }

    /// Formula-only quote for a cart. Never calls the carrier.
    pub fn estimate(
        &self,
        lines: &[CartLine],
        destination: &Address,
    ) -> ShippingResult<RateQuote> {
        validate_cart_lines(lines)?;
        let to = validate_destination(destination)?;

        let package = aggregate(lines);
        let region = self.regions.classify(Some(&to.country));
        self.fallback_quote(region, &package, total_quantity(lines), to.coordinates.as_ref())
    }

    /// Delivery window for a country code or name.
    pub fn delivery_estimate(&self, country: &str) -> DeliveryEstimate {
        let code = normalize_country(country);
        self.regions.delivery_estimate(code.as_deref())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn live_quotes(
        &self,
        to: &NormalizedAddress,
        package: &Package,
        region: &Region,
    ) -> Result<Vec<RateQuote>, FallbackReason> {
        let request = RateRequest {
            from: self.origin.clone(),
            to: to.clone(),
            parcel: *package,
        };

        let rates = match tokio::time::timeout(self.timeout, self.carrier.fetch_rates(&request))
            .await
        {
            Ok(Ok(rates)) => rates,
            Ok(Err(e)) => {
                debug!(carrier = self.carrier.name(), error = %e, "Carrier lookup failed");
                return Err(e.reason());
            }
            Err(_) => {
                debug!(carrier = self.carrier.name(), "Carrier lookup timed out");
                return Err(FallbackReason::Timeout);
            }
        };

        let received = rates.len();
        let mut quotes: Vec<RateQuote> = rates
            .iter()
            .filter_map(|rate| self.live_quote(rate, region))
            .collect();

        if quotes.is_empty() {
            debug!(received, "Carrier returned no usable rate");
            return Err(FallbackReason::NoValidRates);
        }

        sort_quotes(&mut quotes);
        Ok(quotes)
    }

    fn live_quote(&self, rate: &CarrierRate, region: &Region) -> Option<RateQuote> {
        let amount = rate.amount()?;

        let estimate = rate
            .transit_days()
            .map(|days| DeliveryEstimate::from_carrier_days(days, region.display_name.as_str()))
            .unwrap_or_else(|| region.delivery_estimate());

        RateQuote::live(
            named_or(rate.carrier.as_deref(), UNKNOWN_CARRIER),
            named_or(rate.service_name.as_deref(), DEFAULT_SERVICE),
            amount,
            named_or(rate.currency.as_deref(), &self.currency),
            estimate,
            region.display_name.as_str(),
        )
        .ok()
    }

    fn fallback_quote(
        &self,
        region: &Region,
        package: &Package,
        quantity: u32,
        destination: Option<&Coordinates>,
    ) -> ShippingResult<RateQuote> {
        let input =
            FallbackInput::new(region, package, quantity, &self.origin_coordinates, destination);
        let breakdown = fallback_breakdown(&input);
        debug!(?breakdown, region = %region.code, "Fallback cost computed");

        Ok(RateQuote::fallback(
            breakdown.cost,
            self.currency.as_str(),
            region.delivery_estimate(),
        )?)
    }
}

/// Trimmed `value`, or `default` when absent or blank.
fn named_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zuba_core::money::Money;
    use zuba_core::package::ShippingProfile;
    use zuba_core::types::FALLBACK_CARRIER;
    use zuba_core::ValidationError;

    use crate::carrier::{CarrierError, DisabledCarrier, HttpCarrierClient};
    use crate::error::ShippingError;

    // -------------------------------------------------------------------------
    // Test carriers
    // -------------------------------------------------------------------------

    /// Returns a fixed outcome and counts calls.
    struct ScriptedCarrier {
        outcome: Result<Vec<CarrierRate>, CarrierError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<RateRequest>>,
    }

    impl ScriptedCarrier {
        fn new(outcome: Result<Vec<CarrierRate>, CarrierError>) -> Arc<Self> {
            Arc::new(ScriptedCarrier {
                outcome,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CarrierRateClient for ScriptedCarrier {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_rates(
            &self,
            request: &RateRequest,
        ) -> Result<Vec<CarrierRate>, CarrierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.outcome.clone()
        }
    }

    /// Never answers in time.
    struct SlowCarrier;

    #[async_trait]
    impl CarrierRateClient for SlowCarrier {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_rates(
            &self,
            _request: &RateRequest,
        ) -> Result<Vec<CarrierRate>, CarrierError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![rate("Late", 1.0)])
        }
    }

    fn rate(service: &str, total: f64) -> CarrierRate {
        CarrierRate {
            carrier: Some("UPS".into()),
            service_name: Some(service.into()),
            total: Some(total),
            ..Default::default()
        }
    }

    fn resolver(carrier: Arc<dyn CarrierRateClient>) -> RateResolver {
        RateResolver::new(Arc::new(RegionTable::default()), carrier)
    }

    fn counting_hook() -> (Arc<dyn FallbackHook>, Arc<Mutex<Vec<FallbackReason>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hook: Arc<dyn FallbackHook> = Arc::new(move |event: &FallbackEvent| {
            sink.lock().unwrap().push(event.reason);
        });
        (hook, seen)
    }

    fn lines(weight_kg: f64, qty: u32) -> Vec<CartLine> {
        vec![CartLine::new(
            Some(ShippingProfile::metric(weight_kg, 20.0, 15.0, 10.0)),
            qty,
        )]
    }

    // -------------------------------------------------------------------------
    // Fallback path
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_unconfigured_carrier_falls_back() {
        let (hook, seen) = counting_hook();
        let resolver = resolver(Arc::new(DisabledCarrier)).with_hook(hook);

        let quotes = resolver
            .resolve(&lines(2.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].cost(), Money::from_cents(1300));
        assert!(!quotes[0].is_live_quote());
        assert_eq!(quotes[0].carrier_name(), FALLBACK_CARRIER);
        assert_eq!(quotes[0].delivery_estimate().text, "3-7 business days");
        assert_eq!(*seen.lock().unwrap(), vec![FallbackReason::NotConfigured]);
    }

    #[tokio::test]
    async fn test_fallback_scenarios() {
        let resolver = resolver(Arc::new(DisabledCarrier));
        let cost = |quotes: Vec<RateQuote>| quotes[0].cost();

        let ca = Address::new("Ottawa", "CA");
        assert_eq!(
            cost(resolver.resolve(&lines(1.0, 3), &ca).await.unwrap()),
            Money::from_cents(1900)
        );
        assert_eq!(
            cost(resolver.resolve(&lines(0.4, 12), &ca).await.unwrap()),
            Money::from_cents(3910)
        );

        let gb = Address::new("London", "GB");
        assert_eq!(
            cost(resolver.resolve(&lines(1.0, 1), &gb).await.unwrap()),
            Money::from_cents(3500)
        );
    }

    #[tokio::test]
    async fn test_failing_carrier_is_idempotent() {
        let carrier = ScriptedCarrier::new(Err(CarrierError::HttpStatus(500)));
        let (hook, seen) = counting_hook();
        let resolver = resolver(carrier.clone()).with_hook(hook);
        let destination = Address::new("Lagos", "NG");

        let first = resolver.resolve(&lines(3.0, 2), &destination).await.unwrap();
        let second = resolver.resolve(&lines(3.0, 2), &destination).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert!(!first[0].is_live_quote());
        assert_eq!(first[0].region_name(), "Africa");
        assert_eq!(carrier.calls(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![FallbackReason::HttpStatus(500), FallbackReason::HttpStatus(500)]
        );
    }

    #[tokio::test]
    async fn test_all_invalid_rates_fall_back() {
        let carrier = ScriptedCarrier::new(Ok(vec![
            rate("Free", 0.0),
            rate("Negative", -3.0),
            CarrierRate::default(),
        ]));
        let (hook, seen) = counting_hook();
        let resolution = resolver(carrier)
            .with_hook(hook)
            .resolve_detailed(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert!(resolution.is_fallback);
        assert_eq!(resolution.fallback_reason, Some(FallbackReason::NoValidRates));
        assert_eq!(*seen.lock().unwrap(), vec![FallbackReason::NoValidRates]);
    }

    #[tokio::test]
    async fn test_empty_rate_list_falls_back() {
        let carrier = ScriptedCarrier::new(Ok(vec![]));
        let quotes = resolver(carrier)
            .resolve(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();
        assert!(!quotes[0].is_live_quote());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let (hook, seen) = counting_hook();
        let resolver = resolver(Arc::new(SlowCarrier))
            .with_hook(hook)
            .with_timeout(Duration::from_secs(15));

        let quotes = resolver
            .resolve(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 1);
        assert!(!quotes[0].is_live_quote());
        assert_eq!(*seen.lock().unwrap(), vec![FallbackReason::Timeout]);
    }

    #[tokio::test]
    async fn test_destination_coordinates_add_distance_surcharge() {
        let resolver = resolver(Arc::new(DisabledCarrier));
        let mut vancouver = Address::new("Vancouver", "CA");
        vancouver.coordinates = Some(Coordinates::new(49.2827, -123.1207));

        let quotes = resolver.resolve(&lines(1.0, 1), &vancouver).await.unwrap();
        // ~3550 km long haul: 13 × (1 + 0.355)
        let cost = quotes[0].cost().as_major_f64();
        assert!((17.5..17.8).contains(&cost), "got {cost}");
    }

    // -------------------------------------------------------------------------
    // Live path
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_live_rates_sorted_and_filtered() {
        let carrier = ScriptedCarrier::new(Ok(vec![
            rate("Express", 12.50),
            rate("Broken", -1.0),
            rate("Ground", 9.99),
        ]));
        let (hook, seen) = counting_hook();
        let resolution = resolver(carrier)
            .with_hook(hook)
            .resolve_detailed(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        let costs: Vec<i64> = resolution.quotes.iter().map(|q| q.cost().cents()).collect();
        assert_eq!(costs, vec![999, 1250]);
        assert!(resolution.quotes.iter().all(|q| q.is_live_quote()));
        assert!(!resolution.is_fallback);
        assert_eq!(resolution.region, RegionCode::Ca);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_rate_defaults() {
        let carrier = ScriptedCarrier::new(Ok(vec![CarrierRate {
            cost: Some(8.0),
            delivery_days: Some(2.0),
            ..Default::default()
        }]));
        let quotes = resolver(carrier)
            .with_currency("USD")
            .resolve(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        let quote = &quotes[0];
        assert_eq!(quote.carrier_name(), UNKNOWN_CARRIER);
        assert_eq!(quote.service_name(), DEFAULT_SERVICE);
        assert_eq!(quote.currency_code(), "USD");
        assert_eq!(quote.delivery_estimate().min_days, 2);
        assert_eq!(quote.delivery_estimate().text, "2 business days");
    }

    #[tokio::test]
    async fn test_carrier_receives_normalized_request() {
        let carrier = ScriptedCarrier::new(Ok(vec![rate("Ground", 10.0)]));
        let mut destination = Address::new(" Toronto ", "ca");
        destination.postal_code = Some("m5v2t6".into());

        resolver(carrier.clone())
            .resolve(&lines(2.0, 2), &destination)
            .await
            .unwrap();

        let request = carrier.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.to.city, "Toronto");
        assert_eq!(request.to.country, "CA");
        assert_eq!(request.to.postal_code.as_deref(), Some("M5V 2T6"));
        assert_eq!(request.from.city, "Gatineau");
        assert_eq!(request.parcel.weight_kg, 4.0);
    }

    #[tokio::test]
    async fn test_http_carrier_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": [
                    {"carrier": "Purolator", "service_name": "Express", "total": "12.50"},
                    {"carrier": "Canada Post", "service_name": "Regular", "total": 9.99}
                ]
            })))
            .mount(&server)
            .await;

        let carrier =
            HttpCarrierClient::new(&server.uri(), "key", Duration::from_secs(5)).unwrap();
        let quotes = resolver(Arc::new(carrier))
            .resolve(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].carrier_name(), "Canada Post");
        assert_eq!(quotes[0].cost(), Money::from_cents(999));
        assert_eq!(quotes[1].cost(), Money::from_cents(1250));
    }

    #[tokio::test]
    async fn test_malformed_rate_does_not_hide_valid_sibling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": [
                    {"carrier": "Canada Post", "total": 9.99},
                    {"carrier": 42, "total": 12.5}
                ]
            })))
            .mount(&server)
            .await;

        let carrier =
            HttpCarrierClient::new(&server.uri(), "key", Duration::from_secs(5)).unwrap();
        let resolution = resolver(Arc::new(carrier))
            .resolve_detailed(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert!(!resolution.is_fallback);
        assert_eq!(resolution.fallback_reason, None);
        assert_eq!(resolution.quotes.len(), 1);
        assert_eq!(resolution.quotes[0].carrier_name(), "Canada Post");
        assert_eq!(resolution.quotes[0].cost(), Money::from_cents(999));
    }

    #[tokio::test]
    async fn test_only_malformed_rates_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"rates": [{"carrier": 42}, [1, 2]]})),
            )
            .mount(&server)
            .await;

        let carrier =
            HttpCarrierClient::new(&server.uri(), "key", Duration::from_secs(5)).unwrap();
        let resolution = resolver(Arc::new(carrier))
            .resolve_detailed(&lines(1.0, 1), &Address::new("Ottawa", "CA"))
            .await
            .unwrap();

        assert!(resolution.is_fallback);
        assert_eq!(resolution.fallback_reason, Some(FallbackReason::NoValidRates));
        assert_eq!(resolution.quotes[0].cost(), Money::from_cents(1300));
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_validation_errors_skip_carrier() {
        let carrier = ScriptedCarrier::new(Ok(vec![rate("Ground", 10.0)]));
        let resolver = resolver(carrier.clone());

        let err = resolver
            .resolve(&[], &Address::new("Ottawa", "CA"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShippingError::Validation(ValidationError::Required { .. })
        ));

        let err = resolver
            .resolve(&lines(1.0, 1), &Address::default())
            .await
            .unwrap_err();
        assert!(err.is_client_error());

        let mut bad_postal = Address::new("Ottawa", "CA");
        bad_postal.postal_code = Some("12345".into());
        assert!(resolver.resolve(&lines(1.0, 1), &bad_postal).await.is_err());

        assert_eq!(carrier.calls(), 0);
    }

    // -------------------------------------------------------------------------
    // Estimate / delivery
    // -------------------------------------------------------------------------

    #[test]
    fn test_estimate_never_calls_carrier() {
        let carrier = ScriptedCarrier::new(Ok(vec![rate("Ground", 1.0)]));
        let quote = resolver(carrier.clone())
            .estimate(&lines(1.0, 3), &Address::new("Ottawa", "CA"))
            .unwrap();

        assert_eq!(quote.cost(), Money::from_cents(1900));
        assert!(!quote.is_live_quote());
        assert_eq!(carrier.calls(), 0);
    }

    #[test]
    fn test_delivery_estimate() {
        let resolver = resolver(Arc::new(DisabledCarrier));
        assert_eq!(resolver.delivery_estimate("us").text, "5-10 business days");
        assert_eq!(resolver.delivery_estimate("United Kingdom").region_name, "Europe");
        assert_eq!(resolver.delivery_estimate("").region_name, "International");
    }

    #[test]
    fn test_from_config() {
        let mut config = ShippingConfig::default();
        config.fallback.currency = "USD".into();
        let resolver = RateResolver::from_config(&config).unwrap();
        assert_eq!(resolver.currency(), "USD");
        assert_eq!(resolver.carrier.name(), "disabled");
        assert_eq!(resolver.regions().regions().len(), 9);
    }
}
