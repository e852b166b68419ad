//! Exporter configuration

use anyhow::Result;
use serde::Deserialize;

/// Exporter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Namespace to watch; unset means all namespaces
    #[serde(default)]
    pub namespace: Option<String>,
}

fn default_api_port() -> u16 {
    8080
}

impl ExporterConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HPA_EXPORTER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ExporterConfig {
            api_port: default_api_port(),
            namespace: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::load().unwrap();
        assert_eq!(config.api_port, 8080);
    }
}
