//! Shared application state for the cockpit gateway.
//!
//! The metrics buffer is owned here and handed to handlers through axum
//! state, so its lifetime is the server's lifetime.

use std::sync::Arc;

use cockpit_core::metrics::MetricsBuffer;

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<MetricsBuffer>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build state with a fresh buffer sized from `cfg.metrics.capacity`.
    pub fn new(cfg: GatewayConfig) -> Self {
        let metrics = Arc::new(MetricsBuffer::with_capacity(cfg.metrics.capacity));
        Self::with_metrics(cfg, metrics)
    }

    /// Build state around an existing buffer (e.g. one shared with a
    /// generation loop that records into it).
    pub fn with_metrics(cfg: GatewayConfig, metrics: Arc<MetricsBuffer>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MetricsBuffer> {
        Arc::clone(&self.metrics)
    }
}
