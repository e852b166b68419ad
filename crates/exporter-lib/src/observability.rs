//! Exporter self-observability
//!
//! Prometheus metrics about the exporter process itself (scrape latency,
//! cache size, watch errors), kept separate from the generated
//! `kube_hpa_*` families.

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for scrape latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ExporterMetricsInner> = OnceLock::new();

struct ExporterMetricsInner {
    scrape_duration_seconds: Histogram,
    autoscalers_cached: IntGauge,
    watch_errors_total: IntCounter,
    build_info: GaugeVec,
}

impl ExporterMetricsInner {
    fn new() -> Self {
        Self {
            scrape_duration_seconds: register_histogram!(
                "hpa_exporter_scrape_duration_seconds",
                "Time spent rendering autoscaler metric families per scrape",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scrape_duration_seconds"),

            autoscalers_cached: register_int_gauge!(
                "hpa_exporter_autoscalers_cached",
                "Number of autoscaler objects in the watch cache"
            )
            .expect("Failed to register autoscalers_cached"),

            watch_errors_total: register_int_counter!(
                "hpa_exporter_watch_errors_total",
                "Total number of autoscaler watch stream errors"
            )
            .expect("Failed to register watch_errors_total"),

            build_info: register_gauge_vec!(
                "hpa_exporter_build_info",
                "Information about the running exporter build",
                &["version"]
            )
            .expect("Failed to register build_info"),
        }
    }
}

/// Lightweight handle to the global metrics instance. Multiple clones
/// share the same underlying metrics.
#[derive(Clone)]
pub struct ExporterMetrics {
    _private: (),
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ExporterMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ExporterMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_scrape_duration(&self, duration_secs: f64) {
        self.inner().scrape_duration_seconds.observe(duration_secs);
    }

    pub fn set_autoscalers_cached(&self, count: i64) {
        self.inner().autoscalers_cached.set(count);
    }

    pub fn inc_watch_errors(&self) {
        self.inner().watch_errors_total.inc();
    }

    pub fn set_build_info(&self, version: &str) {
        self.inner()
            .build_info
            .with_label_values(&[version])
            .set(1.0);
    }
}
