//! Scrape-time collection
//!
//! On each scrape the collector snapshots the reflector store, runs every
//! registered family generator over every object, and renders the result
//! as Prometheus exposition text. Generators are pure and independent, so
//! no synchronization is needed beyond the store's own snapshotting.

use std::time::Instant;

use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::runtime::reflector::Store;
use tracing::debug;

use crate::family::render_family;
use crate::model::Autoscaler;
use crate::observability::ExporterMetrics;
use crate::store::{hpa_metric_families, FamilyGenerator};

pub struct MetricsCollector {
    store: Store<HorizontalPodAutoscaler>,
    generators: Vec<FamilyGenerator>,
    metrics: ExporterMetrics,
}

impl MetricsCollector {
    pub fn new(store: Store<HorizontalPodAutoscaler>, metrics: ExporterMetrics) -> Self {
        Self {
            store,
            generators: hpa_metric_families(),
            metrics,
        }
    }

    /// Render all families for the objects currently in the store.
    pub fn collect(&self) -> String {
        let started = Instant::now();

        let mut snapshots: Vec<Autoscaler> = self
            .store
            .state()
            .iter()
            .map(|hpa| Autoscaler::from(hpa.as_ref()))
            .collect();
        // Stable output order across scrapes.
        snapshots.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));

        let out = self.render(&snapshots);

        self.metrics.set_autoscalers_cached(snapshots.len() as i64);
        self.metrics
            .observe_scrape_duration(started.elapsed().as_secs_f64());
        debug!(objects = snapshots.len(), "rendered autoscaler metrics");

        out
    }

    /// Families in registry order, each holding the records of every
    /// object in input order.
    fn render(&self, snapshots: &[Autoscaler]) -> String {
        let mut out = String::new();
        for generator in &self.generators {
            let mut records = Vec::new();
            for autoscaler in snapshots {
                records.extend(generator.generate(autoscaler).metrics);
            }
            render_family(
                &mut out,
                generator.name,
                generator.help,
                generator.metric_type,
                &records,
            );
        }
        out
    }
}
