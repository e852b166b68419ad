//! Shared helpers for label conversion and condition expansion

use std::collections::BTreeMap;

use crate::family::Metric;
use crate::model::ConditionStatus;

/// The three states a condition can report, in emission order.
const CONDITION_STATUSES: [ConditionStatus; 3] = [
    ConditionStatus::True,
    ConditionStatus::False,
    ConditionStatus::Unknown,
];

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "true",
            ConditionStatus::False => "false",
            ConditionStatus::Unknown => "unknown",
        }
    }
}

/// Expand one tri-state condition into three boolean-valued records, one
/// per possible state, with a `status` label and value 1 for the state
/// that is set.
pub fn condition_metrics(status: ConditionStatus) -> Vec<Metric> {
    CONDITION_STATUSES
        .iter()
        .map(|s| Metric {
            label_keys: vec!["status".to_string()],
            label_values: vec![s.as_str().to_string()],
            value: if *s == status { 1.0 } else { 0.0 },
        })
        .collect()
}

/// Convert Kubernetes object labels to metric labels: keys are sanitized
/// to the exposition charset and prefixed with `label_`. BTreeMap input
/// keeps the output order deterministic.
pub fn kube_labels_to_metric_labels(
    labels: &BTreeMap<String, String>,
) -> (Vec<String>, Vec<String>) {
    let mut keys = Vec::with_capacity(labels.len());
    let mut values = Vec::with_capacity(labels.len());
    for (k, v) in labels {
        keys.push(format!("label_{}", sanitize_label_name(k)));
        values.push(v.clone());
    }
    (keys, values)
}

fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
