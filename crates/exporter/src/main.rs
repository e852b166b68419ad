//! HPA exporter - Kubernetes autoscaler state as Prometheus metrics
//!
//! Watches HorizontalPodAutoscaler resources and serves their spec and
//! status as flat gauge time-series on a scrape endpoint.

use anyhow::Result;
use exporter_lib::{
    health::{components, HealthRegistry},
    observability::ExporterMetrics,
    source, MetricsCollector,
};
use kube::Client;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = EXPORTER_VERSION, "Starting hpa-exporter");

    // Load configuration
    let config = config::ExporterConfig::load()?;
    info!(
        namespace = config.namespace.as_deref().unwrap_or("<all>"),
        port = config.api_port,
        "Exporter configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::WATCHER).await;
    health_registry.register(components::COLLECTOR).await;

    // Initialize metrics
    let metrics = ExporterMetrics::new();
    metrics.set_build_info(EXPORTER_VERSION);

    // Start the autoscaler watch and wait for the initial list
    let client = Client::try_default().await?;
    let autoscalers = source::autoscaler_api(client, config.namespace.as_deref());
    let store = source::start_autoscaler_store(
        autoscalers,
        health_registry.clone(),
        metrics.clone(),
    )
    .await?;
    info!("Autoscaler watch cache synced");

    let collector = Arc::new(MetricsCollector::new(store, metrics));
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), collector));

    // Mark exporter as ready once the cache is synced
    health_registry.set_ready(true).await;

    // Start health and metrics server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    api_handle.abort();

    Ok(())
}
