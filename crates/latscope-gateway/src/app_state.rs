//! Shared application state for the latscope gateway.
//!
//! The telemetry store is loaded once, before any listener is bound, and is
//! then only read. Cloning `AppState` is an `Arc` bump.

use std::collections::BTreeMap;
use std::sync::Arc;

use latscope_core::error::Result;
use latscope_core::{metrics, MetricsRequest, RegionMetrics, TelemetryStore};

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    store: Arc<TelemetryStore>,
}

impl AppState {
    pub fn new(cfg: GatewayConfig, store: Arc<TelemetryStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, store }),
        }
    }

    /// Load the dataset named by `cfg` and build state.
    /// A missing or malformed dataset is returned as `DatasetLoad`; callers must not serve.
    pub fn from_config(cfg: GatewayConfig) -> Result<Self> {
        let store = TelemetryStore::load_from_file(cfg.dataset_path())?;
        if store.is_empty() {
            tracing::warn!("telemetry dataset is empty, every region will report null metrics");
        }
        Ok(Self::new(cfg, Arc::new(store)))
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<TelemetryStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self, req: &MetricsRequest) -> BTreeMap<String, RegionMetrics> {
        metrics::compute(&self.inner.store, &req.regions, req.threshold_ms)
    }
}
