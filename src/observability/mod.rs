//! Logging and metrics setup
//!
//! Logging goes through `tracing`; when no subscriber is installed every
//! macro is a no-op. Metrics go through OpenTelemetry and fall back to the
//! global noop provider unless [`AppObservability::new`] installed one.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter, MeterProvider, UpDownCounter},
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::{AppError, AppResult};

const METER_NAME: &str = "feedback-widget";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str, json: bool) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feedback_widget={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| AppError::internal(format!("Failed to initialise tracing: {e}")))
}

/// Metric instruments shared by the favicon pipeline and the broadcasters
#[derive(Clone)]
pub struct AppObservability {
    pub favicon_lookups: Counter<u64>,
    pub favicon_cache_hits: Counter<u64>,
    pub favicon_fetches: Counter<u64>,
    pub favicon_fetch_failures: Counter<u64>,

    pub events_published: Counter<u64>,
    pub events_dropped: Counter<u64>,
    pub event_subscribers: UpDownCounter<i64>,
}

impl AppObservability {
    /// Install an SDK meter provider globally and build instruments on it
    pub fn new(service_name: &str) -> Self {
        let provider = SdkMeterProvider::builder().build();
        global::set_meter_provider(provider.clone());

        let meter = provider.meter(METER_NAME);
        info!("Metrics initialised for {}", service_name);
        Self::build_with_instruments(meter)
    }

    /// Build instruments on whatever global provider is installed
    pub fn from_global() -> Self {
        Self::build_with_instruments(global::meter(METER_NAME))
    }

    fn build_with_instruments(meter: Meter) -> Self {
        let favicon_lookups = meter
            .u64_counter("favicon_lookups_total")
            .with_description("Favicon resolve calls")
            .build();
        let favicon_cache_hits = meter
            .u64_counter("favicon_cache_hits_total")
            .with_description("Favicon resolve calls answered from cache")
            .build();
        let favicon_fetches = meter
            .u64_counter("favicon_fetches_total")
            .with_description("Scheduled favicon fetches that persisted an asset")
            .build();
        let favicon_fetch_failures = meter
            .u64_counter("favicon_fetch_failures_total")
            .with_description("Scheduled favicon fetches that produced nothing")
            .build();
        let events_published = meter
            .u64_counter("events_published_total")
            .with_description("Events handed to a broadcaster")
            .build();
        let events_dropped = meter
            .u64_counter("events_dropped_total")
            .with_description("Per-subscriber deliveries dropped on a full buffer")
            .build();
        let event_subscribers = meter
            .i64_up_down_counter("event_subscribers")
            .with_description("Currently registered event subscribers")
            .build();

        Self {
            favicon_lookups,
            favicon_cache_hits,
            favicon_fetches,
            favicon_fetch_failures,
            events_published,
            events_dropped,
            event_subscribers,
        }
    }

    pub fn record_lookup(&self, cache_hit: bool) {
        self.favicon_lookups.add(1, &[]);
        if cache_hit {
            self.favicon_cache_hits.add(1, &[]);
        }
    }

    pub fn record_fetch(&self, success: bool) {
        if success {
            self.favicon_fetches.add(1, &[]);
        } else {
            self.favicon_fetch_failures.add(1, &[]);
        }
    }

    pub fn record_broadcast(&self, stream: &'static str, dropped: u64) {
        let attrs = [KeyValue::new("stream", stream)];
        self.events_published.add(1, &attrs);
        if dropped > 0 {
            self.events_dropped.add(dropped, &attrs);
        }
    }
}

impl Default for AppObservability {
    fn default() -> Self {
        Self::from_global()
    }
}
