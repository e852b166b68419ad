//! Metric family generators
//!
//! A [`FamilyGenerator`] pairs one exported family name with the pure
//! function that derives its records from an autoscaler snapshot. The
//! registry built by [`hpa::hpa_metric_families`] is constructed once and
//! consumed by iteration only.

pub mod hpa;
mod utils;

pub use hpa::{hpa_metric_families, MetricTargetType};
pub use utils::{condition_metrics, kube_labels_to_metric_labels};

use crate::family::{Family, MetricType};
use crate::model::Autoscaler;

/// Label keys prepended to every record: the object's namespace and name.
pub const DEFAULT_LABELS: [&str; 2] = ["namespace", "hpa"];

type GenerateFn = Box<dyn Fn(&Autoscaler) -> Family + Send + Sync>;

/// Descriptor for one exported metric family.
pub struct FamilyGenerator {
    pub name: &'static str,
    pub help: &'static str,
    pub metric_type: MetricType,
    generate: GenerateFn,
}

impl FamilyGenerator {
    /// Build a gauge generator whose records are automatically prefixed
    /// with the object's namespace and name labels.
    pub fn gauge<F>(name: &'static str, help: &'static str, f: F) -> Self
    where
        F: Fn(&Autoscaler) -> Family + Send + Sync + 'static,
    {
        Self {
            name,
            help,
            metric_type: MetricType::Gauge,
            generate: wrap_autoscaler_fn(f),
        }
    }

    /// Run the generator against one object snapshot.
    pub fn generate(&self, autoscaler: &Autoscaler) -> Family {
        (self.generate)(autoscaler)
    }
}

/// Wrap a generator function so every emitted record carries the default
/// `namespace`/`hpa` labels first. Prepend-only: the wrapped generator's
/// own labels keep their order.
fn wrap_autoscaler_fn<F>(f: F) -> GenerateFn
where
    F: Fn(&Autoscaler) -> Family + Send + Sync + 'static,
{
    Box::new(move |autoscaler: &Autoscaler| {
        let mut family = f(autoscaler);
        for metric in &mut family.metrics {
            metric
                .label_keys
                .splice(0..0, DEFAULT_LABELS.iter().map(|k| k.to_string()));
            metric.label_values.splice(
                0..0,
                [autoscaler.namespace.clone(), autoscaler.name.clone()],
            );
        }
        family
    })
}
