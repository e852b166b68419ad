//! Read-only snapshot model of one HorizontalPodAutoscaler
//!
//! The generators operate on this snapshot rather than on the raw API
//! object. The four metric source kinds are a closed sum type with a
//! mandatory `Unsupported` arm: every match over them is exhaustive, so
//! the silent-skip policy stays auditable and a new kind is a
//! compile-time-checked change.
//!
//! Conversion from the autoscaling/v2 API object is total. Fields the
//! schema declares mandatory but that arrive absent fall back to their
//! API defaults instead of panicking; kinds this exporter does not handle
//! (for example `ContainerResource`) convert to `Unsupported` and
//! contribute no records.

use std::collections::BTreeMap;

use k8s_openapi::api::autoscaling::v2::{
    HorizontalPodAutoscaler, MetricSpec as V2MetricSpec, MetricStatus as V2MetricStatus,
};

use crate::quantity::Quantity;

/// One autoscaler object, snapshotted at conversion time.
#[derive(Debug, Clone, PartialEq)]
pub struct Autoscaler {
    pub namespace: String,
    pub name: String,
    pub generation: i64,
    pub labels: BTreeMap<String, String>,
    pub spec: AutoscalerSpec,
    pub status: AutoscalerStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoscalerSpec {
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub metrics: Vec<MetricSpec>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoscalerStatus {
    pub current_replicas: i32,
    pub desired_replicas: i32,
    pub conditions: Vec<Condition>,
    pub current_metrics: Vec<CurrentMetric>,
}

/// A spec-level metric source. Exactly one kind is active per entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSpec {
    Resource {
        /// Resource name, e.g. `cpu` or `memory`; doubles as the metric
        /// identifier in emitted records.
        name: String,
        target_average_utilization: Option<i64>,
        target_average_value: Option<Quantity>,
    },
    Pods {
        metric_name: String,
        target_average_value: Option<Quantity>,
    },
    Object {
        metric_name: String,
        target_value: Option<Quantity>,
        average_value: Option<Quantity>,
    },
    External {
        metric_name: String,
        // Value and average value are mutually exclusive at the source,
        // but that is not enforced here.
        target_value: Option<Quantity>,
        target_average_value: Option<Quantity>,
    },
    Unsupported,
}

/// A status-level observed metric, mirroring the spec kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentMetric {
    Resource {
        name: String,
        current_average_utilization: Option<i64>,
        current_average_value: Option<Quantity>,
    },
    Pods {
        current_average_value: Option<Quantity>,
    },
    Object {
        average_value: Option<Quantity>,
    },
    External {
        current_average_value: Option<Quantity>,
    },
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub type_: String,
    pub status: ConditionStatus,
}

fn parse_quantity(
    q: Option<&k8s_openapi::apimachinery::pkg::api::resource::Quantity>,
) -> Option<Quantity> {
    // A quantity the apiserver admitted but we cannot represent is treated
    // the same as an absent field: the corresponding slot is skipped.
    q.and_then(|q| Quantity::try_from(q).ok())
}

fn convert_metric_spec(m: &V2MetricSpec) -> MetricSpec {
    match m.type_.as_str() {
        "Resource" => match &m.resource {
            Some(r) => MetricSpec::Resource {
                name: r.name.clone(),
                target_average_utilization: r.target.average_utilization.map(i64::from),
                target_average_value: parse_quantity(r.target.average_value.as_ref()),
            },
            None => MetricSpec::Unsupported,
        },
        "Pods" => match &m.pods {
            Some(p) => MetricSpec::Pods {
                metric_name: p.metric.name.clone(),
                target_average_value: parse_quantity(p.target.average_value.as_ref()),
            },
            None => MetricSpec::Unsupported,
        },
        "Object" => match &m.object {
            Some(o) => MetricSpec::Object {
                metric_name: o.metric.name.clone(),
                target_value: parse_quantity(o.target.value.as_ref()),
                average_value: parse_quantity(o.target.average_value.as_ref()),
            },
            None => MetricSpec::Unsupported,
        },
        "External" => match &m.external {
            Some(e) => MetricSpec::External {
                metric_name: e.metric.name.clone(),
                target_value: parse_quantity(e.target.value.as_ref()),
                target_average_value: parse_quantity(e.target.average_value.as_ref()),
            },
            None => MetricSpec::Unsupported,
        },
        _ => MetricSpec::Unsupported,
    }
}

fn convert_metric_status(m: &V2MetricStatus) -> CurrentMetric {
    match m.type_.as_str() {
        "Resource" => match &m.resource {
            Some(r) => CurrentMetric::Resource {
                name: r.name.clone(),
                current_average_utilization: r.current.average_utilization.map(i64::from),
                current_average_value: parse_quantity(r.current.average_value.as_ref()),
            },
            None => CurrentMetric::Unsupported,
        },
        "Pods" => match &m.pods {
            Some(p) => CurrentMetric::Pods {
                current_average_value: parse_quantity(p.current.average_value.as_ref()),
            },
            None => CurrentMetric::Unsupported,
        },
        "Object" => match &m.object {
            Some(o) => CurrentMetric::Object {
                average_value: parse_quantity(o.current.average_value.as_ref()),
            },
            None => CurrentMetric::Unsupported,
        },
        "External" => match &m.external {
            Some(e) => CurrentMetric::External {
                current_average_value: parse_quantity(e.current.average_value.as_ref()),
            },
            None => CurrentMetric::Unsupported,
        },
        _ => CurrentMetric::Unsupported,
    }
}

fn convert_condition_status(s: &str) -> ConditionStatus {
    match s {
        "True" => ConditionStatus::True,
        "False" => ConditionStatus::False,
        _ => ConditionStatus::Unknown,
    }
}

impl From<&HorizontalPodAutoscaler> for Autoscaler {
    fn from(hpa: &HorizontalPodAutoscaler) -> Self {
        let meta = &hpa.metadata;

        let spec = match &hpa.spec {
            Some(s) => AutoscalerSpec {
                // The apiserver defaults minReplicas to 1 when unset.
                min_replicas: s.min_replicas.unwrap_or(1),
                max_replicas: s.max_replicas,
                metrics: s
                    .metrics
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(convert_metric_spec)
                    .collect(),
            },
            None => AutoscalerSpec::default(),
        };

        let status = match &hpa.status {
            Some(s) => AutoscalerStatus {
                current_replicas: s.current_replicas.unwrap_or(0),
                desired_replicas: s.desired_replicas,
                conditions: s
                    .conditions
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|c| Condition {
                        type_: c.type_.clone(),
                        status: convert_condition_status(&c.status),
                    })
                    .collect(),
                current_metrics: s
                    .current_metrics
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(convert_metric_status)
                    .collect(),
            },
            None => AutoscalerStatus::default(),
        };

        Self {
            namespace: meta.namespace.clone().unwrap_or_default(),
            name: meta.name.clone().unwrap_or_default(),
            generation: meta.generation.unwrap_or(0),
            labels: meta.labels.clone().unwrap_or_default(),
            spec,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::autoscaling::v2::{
        HorizontalPodAutoscalerSpec, MetricIdentifier, MetricTarget, PodsMetricSource,
        ResourceMetricSource,
    };
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity as K8sQuantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn hpa_with_spec(spec: HorizontalPodAutoscalerSpec) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: ObjectMeta {
                namespace: Some("default".to_string()),
                name: Some("my-hpa".to_string()),
                generation: Some(3),
                ..Default::default()
            },
            spec: Some(spec),
            status: None,
        }
    }

    #[test]
    fn test_convert_resource_metric_spec() {
        let hpa = hpa_with_spec(HorizontalPodAutoscalerSpec {
            max_replicas: 10,
            min_replicas: Some(2),
            metrics: Some(vec![V2MetricSpec {
                type_: "Resource".to_string(),
                resource: Some(ResourceMetricSource {
                    name: "cpu".to_string(),
                    target: MetricTarget {
                        type_: "Utilization".to_string(),
                        average_utilization: Some(80),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            ..Default::default()
        });

        let a = Autoscaler::from(&hpa);
        assert_eq!(a.namespace, "default");
        assert_eq!(a.name, "my-hpa");
        assert_eq!(a.generation, 3);
        assert_eq!(a.spec.min_replicas, 2);
        assert_eq!(a.spec.max_replicas, 10);
        assert_eq!(
            a.spec.metrics,
            vec![MetricSpec::Resource {
                name: "cpu".to_string(),
                target_average_utilization: Some(80),
                target_average_value: None,
            }]
        );
    }

    #[test]
    fn test_convert_defaults_min_replicas() {
        let hpa = hpa_with_spec(HorizontalPodAutoscalerSpec {
            max_replicas: 4,
            min_replicas: None,
            ..Default::default()
        });
        assert_eq!(Autoscaler::from(&hpa).spec.min_replicas, 1);
    }

    #[test]
    fn test_convert_unknown_kind_is_unsupported() {
        let hpa = hpa_with_spec(HorizontalPodAutoscalerSpec {
            max_replicas: 4,
            metrics: Some(vec![V2MetricSpec {
                type_: "ContainerResource".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        });
        assert_eq!(
            Autoscaler::from(&hpa).spec.metrics,
            vec![MetricSpec::Unsupported]
        );
    }

    #[test]
    fn test_convert_unparseable_quantity_is_absent() {
        let hpa = hpa_with_spec(HorizontalPodAutoscalerSpec {
            max_replicas: 4,
            metrics: Some(vec![V2MetricSpec {
                type_: "Pods".to_string(),
                pods: Some(PodsMetricSource {
                    metric: MetricIdentifier {
                        name: "packets-per-second".to_string(),
                        selector: None,
                    },
                    target: MetricTarget {
                        type_: "AverageValue".to_string(),
                        average_value: Some(K8sQuantity("not-a-number".to_string())),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            ..Default::default()
        });
        assert_eq!(
            Autoscaler::from(&hpa).spec.metrics,
            vec![MetricSpec::Pods {
                metric_name: "packets-per-second".to_string(),
                target_average_value: None,
            }]
        );
    }

    #[test]
    fn test_convert_condition_statuses() {
        assert_eq!(convert_condition_status("True"), ConditionStatus::True);
        assert_eq!(convert_condition_status("False"), ConditionStatus::False);
        assert_eq!(convert_condition_status("Unknown"), ConditionStatus::Unknown);
        assert_eq!(convert_condition_status("bogus"), ConditionStatus::Unknown);
    }
}
