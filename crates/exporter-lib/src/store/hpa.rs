//! Metric family generators for HorizontalPodAutoscaler objects
//!
//! Every generator is a pure function of one object snapshot. Entries
//! whose values cannot be derived (unsupported kind, quantity not exactly
//! representable) are skipped silently; no sentinel values are emitted.

use crate::family::{Family, Metric};
use crate::model::{Autoscaler, CurrentMetric, MetricSpec};
use crate::quantity::Quantity;
use crate::store::{condition_metrics, kube_labels_to_metric_labels, FamilyGenerator};

const TARGET_METRIC_LABELS: [&str; 2] = ["metric_name", "metric_target_type"];

/// Which semantic flavor a derived target number represents. Also used as
/// an index into the per-entry slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum MetricTargetType {
    Value,
    Utilization,
    Average,
}

impl MetricTargetType {
    const ALL: [MetricTargetType; 3] = [
        MetricTargetType::Value,
        MetricTargetType::Utilization,
        MetricTargetType::Average,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricTargetType::Value => "value",
            MetricTargetType::Utilization => "utilization",
            MetricTargetType::Average => "average",
        }
    }
}

fn as_int64(q: &Option<Quantity>) -> Option<i64> {
    q.as_ref().and_then(Quantity::as_int64)
}

fn single_value(value: f64) -> Family {
    Family::new(vec![Metric {
        value,
        ..Default::default()
    }])
}

/// One record per spec metric entry per target type the entry defines,
/// labeled with the metric identifier and the lower-case target type.
fn target_metrics(a: &Autoscaler) -> Family {
    let mut metrics = Vec::with_capacity(a.spec.metrics.len());
    for m in &a.spec.metrics {
        // Slots indexed by MetricTargetType; absent slot means no record.
        let mut slots: [Option<i64>; 3] = [None; 3];

        let metric_name = match m {
            MetricSpec::Object {
                metric_name,
                target_value,
                average_value,
            } => {
                slots[MetricTargetType::Value as usize] = as_int64(target_value);
                slots[MetricTargetType::Average as usize] = as_int64(average_value);
                metric_name
            }
            MetricSpec::Pods {
                metric_name,
                target_average_value,
            } => {
                slots[MetricTargetType::Average as usize] = as_int64(target_average_value);
                metric_name
            }
            MetricSpec::Resource {
                name,
                target_average_utilization,
                target_average_value,
            } => {
                slots[MetricTargetType::Utilization as usize] = *target_average_utilization;
                slots[MetricTargetType::Average as usize] = as_int64(target_average_value);
                name
            }
            MetricSpec::External {
                metric_name,
                target_value,
                target_average_value,
            } => {
                // Value and average value are mutually exclusive at the
                // source; whichever are present get emitted.
                slots[MetricTargetType::Value as usize] = as_int64(target_value);
                slots[MetricTargetType::Average as usize] = as_int64(target_average_value);
                metric_name
            }
            MetricSpec::Unsupported => continue,
        };

        for target_type in MetricTargetType::ALL {
            if let Some(v) = slots[target_type as usize] {
                metrics.push(Metric {
                    label_keys: TARGET_METRIC_LABELS.iter().map(|k| k.to_string()).collect(),
                    label_values: vec![metric_name.clone(), target_type.as_str().to_string()],
                    value: v as f64,
                });
            }
        }
    }
    Family::new(metrics)
}

/// One record per status metric entry that reports a usable average value.
/// CPU resource quantities arrive in milli-units and are converted to
/// cores; everything else needs an exact whole-unit conversion. Entries
/// without a usable value contribute no record.
fn current_metrics_average_value(a: &Autoscaler) -> Family {
    let mut metrics = Vec::with_capacity(a.status.current_metrics.len());
    for c in &a.status.current_metrics {
        let value = match c {
            CurrentMetric::Resource {
                name,
                current_average_value,
                ..
            } => {
                if name == "cpu" {
                    current_average_value
                        .as_ref()
                        .map(|q| q.milli_value() as f64 / 1000.0)
                } else {
                    as_int64(current_average_value).map(|v| v as f64)
                }
            }
            CurrentMetric::Pods {
                current_average_value,
            } => as_int64(current_average_value).map(|v| v as f64),
            CurrentMetric::Object { average_value } => as_int64(average_value).map(|v| v as f64),
            CurrentMetric::External {
                current_average_value,
            } => as_int64(current_average_value).map(|v| v as f64),
            CurrentMetric::Unsupported => None,
        };

        if let Some(value) = value {
            metrics.push(Metric {
                value,
                ..Default::default()
            });
        }
    }
    Family::new(metrics)
}

/// One record per resource-kind status entry that reports an average
/// utilization percentage. Other kinds carry no utilization semantic.
fn current_metrics_average_utilization(a: &Autoscaler) -> Family {
    let mut metrics = Vec::with_capacity(a.status.current_metrics.len());
    for c in &a.status.current_metrics {
        if let CurrentMetric::Resource {
            current_average_utilization: Some(utilization),
            ..
        } = c
        {
            metrics.push(Metric {
                value: *utilization as f64,
                ..Default::default()
            });
        }
    }
    Family::new(metrics)
}

fn conditions(a: &Autoscaler) -> Family {
    let mut metrics = Vec::with_capacity(a.status.conditions.len() * 3);
    for condition in &a.status.conditions {
        for mut metric in condition_metrics(condition.status) {
            metric.label_keys.insert(0, "condition".to_string());
            metric.label_values.insert(0, condition.type_.clone());
            metrics.push(metric);
        }
    }
    Family::new(metrics)
}

fn labels_info(a: &Autoscaler) -> Family {
    let (label_keys, label_values) = kube_labels_to_metric_labels(&a.labels);
    Family::new(vec![Metric {
        label_keys,
        label_values,
        value: 1.0,
    }])
}

/// The immutable, ordered generator registry for HPA objects. Built once
/// at startup; the collector consumes it by iteration only.
pub fn hpa_metric_families() -> Vec<FamilyGenerator> {
    vec![
        FamilyGenerator::gauge(
            "kube_hpa_metadata_generation",
            "The generation observed by the HorizontalPodAutoscaler controller.",
            |a| single_value(a.generation as f64),
        ),
        FamilyGenerator::gauge(
            "kube_hpa_spec_max_replicas",
            "Upper limit for the number of pods that can be set by the autoscaler; cannot be smaller than MinReplicas.",
            |a| single_value(a.spec.max_replicas as f64),
        ),
        FamilyGenerator::gauge(
            "kube_hpa_spec_min_replicas",
            "Lower limit for the number of pods that can be set by the autoscaler, default 1.",
            |a| single_value(a.spec.min_replicas as f64),
        ),
        FamilyGenerator::gauge(
            "kube_hpa_spec_target_metric",
            "The metric specifications used by this autoscaler when calculating the desired replica count.",
            target_metrics,
        ),
        FamilyGenerator::gauge(
            "kube_hpa_status_current_replicas",
            "Current number of replicas of pods managed by this autoscaler.",
            |a| single_value(a.status.current_replicas as f64),
        ),
        FamilyGenerator::gauge(
            "kube_hpa_status_desired_replicas",
            "Desired number of replicas of pods managed by this autoscaler.",
            |a| single_value(a.status.desired_replicas as f64),
        ),
        FamilyGenerator::gauge(
            "kube_hpa_labels",
            "Kubernetes labels converted to Prometheus labels.",
            labels_info,
        ),
        FamilyGenerator::gauge(
            "kube_hpa_status_condition",
            "The condition of this autoscaler.",
            conditions,
        ),
        FamilyGenerator::gauge(
            "kube_hpa_status_current_metrics_average_value",
            "Average metric value observed by the autoscaler.",
            current_metrics_average_value,
        ),
        FamilyGenerator::gauge(
            "kube_hpa_status_current_metrics_average_utilization",
            "Average metric utilization observed by the autoscaler.",
            current_metrics_average_utilization,
        ),
    ]
}
