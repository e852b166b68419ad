//! Flat metric record model and Prometheus text exposition
//!
//! Generators produce [`Family`] values fresh on every call; nothing here
//! carries identity across scrapes. Label keys and values are kept as two
//! parallel ordered sequences so wrappers can prepend labels cheaply.

use std::fmt::Write;

/// Exposition type of a metric family. Everything this exporter emits is a
/// gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
        }
    }
}

/// One labeled numeric observation.
///
/// Invariant: `label_keys.len() == label_values.len()`, and keys are unique
/// within a record. After wrapping, the first two labels are always the
/// object's `namespace` and `hpa` name, in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metric {
    pub label_keys: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
}

/// An ordered collection of records sharing one name, type, and help text.
/// Record order follows the input list order of the object they were
/// derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Family {
    pub metrics: Vec<Metric>,
}

impl Family {
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }
}

/// Append one family to `out` in the Prometheus text exposition format.
pub fn render_family(
    out: &mut String,
    name: &str,
    help: &str,
    metric_type: MetricType,
    metrics: &[Metric],
) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, metric_type.as_str());

    for m in metrics {
        out.push_str(name);
        if !m.label_keys.is_empty() {
            out.push('{');
            for (i, (k, v)) in m.label_keys.iter().zip(m.label_values.iter()).enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}=\"{}\"", k, escape_label_value(v));
            }
            out.push('}');
        }
        let _ = writeln!(out, " {}", m.value);
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
