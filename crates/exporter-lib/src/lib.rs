//! Core library for the HPA exporter
//!
//! This crate provides the building blocks for exporting
//! HorizontalPodAutoscaler state as Prometheus gauge time-series:
//! - A read-only snapshot model of one autoscaler object
//! - Kubernetes quantity parsing and conversion
//! - Per-family metric generators and the generator registry
//! - A list/watch backed object store
//! - The scrape-time collector and exposition rendering
//! - Health checks and exporter self-observability

pub mod collector;
pub mod family;
pub mod health;
pub mod model;
pub mod observability;
pub mod quantity;
pub mod source;
pub mod store;

pub use collector::MetricsCollector;
pub use family::{Family, Metric, MetricType};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use model::Autoscaler;
pub use observability::ExporterMetrics;
pub use quantity::Quantity;
