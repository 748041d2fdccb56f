//! Application state for the time-series API.

use metrics_exporter_prometheus::PrometheusHandle;

use grid_processor::DatasetStore;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// The active dataset, shared by every client of this process.
    pub store: DatasetStore,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Prometheus recorder handle, absent when metrics are not installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServiceConfig, prometheus: Option<PrometheusHandle>) -> Self {
        Self {
            store: DatasetStore::new(),
            config,
            prometheus,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServiceConfig::default(), None)
    }
}
