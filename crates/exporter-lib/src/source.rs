//! List/watch backed store of HorizontalPodAutoscaler objects
//!
//! A reflector keeps an in-memory view of the autoscalers in scope; the
//! collector reads the current snapshot from it on every scrape. The watch
//! stream restarts with the default backoff on errors.

use anyhow::{Context, Result};
use futures::StreamExt;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client};
use tracing::{error, trace};

use crate::health::{components, HealthRegistry};
use crate::observability::ExporterMetrics;

/// Scope of the watch: one namespace or the whole cluster.
pub fn autoscaler_api(client: Client, namespace: Option<&str>) -> Api<HorizontalPodAutoscaler> {
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Start watching autoscalers and return the reflector store once the
/// initial list has been received.
pub async fn start_autoscaler_store(
    api: Api<HorizontalPodAutoscaler>,
    health: HealthRegistry,
    metrics: ExporterMetrics,
) -> Result<Store<HorizontalPodAutoscaler>> {
    let (reader, writer) = reflector::store();

    let stream = reflector::reflector(writer, watcher(api, watcher::Config::default()))
        .default_backoff()
        .touched_objects();

    tokio::spawn(async move {
        stream
            .for_each(|res| {
                let health = health.clone();
                let metrics = metrics.clone();
                async move {
                    match res {
                        Ok(hpa) => {
                            trace!(
                                namespace = hpa.metadata.namespace.as_deref().unwrap_or(""),
                                name = hpa.metadata.name.as_deref().unwrap_or(""),
                                "autoscaler event"
                            );
                            health.set_healthy(components::WATCHER).await;
                        }
                        Err(e) => {
                            error!(error = %e, "autoscaler watch stream error");
                            metrics.inc_watch_errors();
                            health.set_degraded(components::WATCHER, e.to_string()).await;
                        }
                    }
                }
            })
            .await;
    });

    reader
        .wait_until_ready()
        .await
        .context("autoscaler reflector store never became ready")?;

    Ok(reader)
}
