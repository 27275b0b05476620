//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Image deletion labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeletionLabels {
    pub outcome: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Image deletion requests by outcome.
    pub image_deletions: Family<DeletionLabels, Counter>,

    /// Storage delete call duration.
    pub storage_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let image_deletions = Family::<DeletionLabels, Counter>::default();
        registry.register(
            "image_deletions",
            "Image deletion requests by outcome",
            image_deletions.clone(),
        );

        let storage_duration_seconds = Histogram::new(exponential_buckets(0.005, 2.0, 12));
        registry.register(
            "storage_request_duration_seconds",
            "Storage delete request duration in seconds",
            storage_duration_seconds.clone(),
        );

        Self {
            registry,
            image_deletions,
            storage_duration_seconds,
        }
    }

    /// Record the outcome of a deletion request.
    pub fn record_deletion(&self, outcome: &str) {
        self.image_deletions
            .get_or_create(&DeletionLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Record a storage call.
    pub fn record_storage_call(&self, duration_secs: f64) {
        self.storage_duration_seconds.observe(duration_secs);
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
