//! # Fallback Observability
//!
//! Every time the resolver answers with the formula instead of live carrier
//! rates, it reports a [`FallbackEvent`] to the installed [`FallbackHook`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RateResolver ── live attempt fails ──► FallbackEvent                   │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                   Arc<dyn FallbackHook>                 │
//! │                                   ├── TracingFallbackHook (default)     │
//! │                                   └── any Fn(&FallbackEvent)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;
use zuba_core::RegionCode;

/// Why live rates were not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    /// No carrier credentials configured.
    NotConfigured,
    /// The carrier did not answer within the timeout.
    Timeout,
    /// Connection, DNS or TLS failure.
    Transport,
    /// The carrier answered with a non-2xx status.
    HttpStatus(u16),
    /// The response body could not be decoded.
    InvalidPayload,
    /// The carrier answered, but no rate had a usable positive cost.
    NoValidRates,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConfigured => write!(f, "not_configured"),
            FallbackReason::Timeout => write!(f, "timeout"),
            FallbackReason::Transport => write!(f, "transport"),
            FallbackReason::HttpStatus(code) => write!(f, "http_{}", code),
            FallbackReason::InvalidPayload => write!(f, "invalid_payload"),
            FallbackReason::NoValidRates => write!(f, "no_valid_rates"),
        }
    }
}

/// One fallback occurrence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEvent {
    pub request_id: Uuid,
    pub reason: FallbackReason,
    /// Time spent on the live attempt before giving up.
    pub latency: Duration,
    /// Normalized destination country.
    pub country: String,
    pub region: RegionCode,
    pub occurred_at: DateTime<Utc>,
}

/// Receives fallback events. Must not block.
pub trait FallbackHook: Send + Sync {
    fn on_fallback(&self, event: &FallbackEvent);
}

impl<F> FallbackHook for F
where
    F: Fn(&FallbackEvent) + Send + Sync,
{
    fn on_fallback(&self, event: &FallbackEvent) {
        self(event)
    }
}

/// Default hook: one structured warning per fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFallbackHook;

impl FallbackHook for TracingFallbackHook {
    fn on_fallback(&self, event: &FallbackEvent) {
        warn!(
            request_id = %event.request_id,
            reason = %event.reason,
            latency_ms = event.latency.as_millis() as u64,
            country = %event.country,
            region = %event.region,
            "Live carrier rates unavailable, using fallback formula"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn event(reason: FallbackReason) -> FallbackEvent {
        FallbackEvent {
            request_id: Uuid::new_v4(),
            reason,
            latency: Duration::from_millis(12),
            country: "CA".into(),
            region: RegionCode::Ca,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_closure_hook() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let hook: Arc<dyn FallbackHook> = Arc::new(move |_: &FallbackEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        hook.on_fallback(&event(FallbackReason::Timeout));
        hook.on_fallback(&event(FallbackReason::NoValidRates));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tracing_hook_does_not_panic() {
        TracingFallbackHook.on_fallback(&event(FallbackReason::HttpStatus(502)));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(FallbackReason::HttpStatus(503).to_string(), "http_503");
        assert_eq!(FallbackReason::NotConfigured.to_string(), "not_configured");
    }

    #[test]
    fn test_reason_json() {
        let json = serde_json::to_value(FallbackReason::HttpStatus(500)).unwrap();
        assert_eq!(json["kind"], "HTTP_STATUS");
        assert_eq!(json["status"], 500);
    }
}
