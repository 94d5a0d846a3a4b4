use std::net::SocketAddr;

use serde::Deserialize;
use cockpit_core::error::{CockpitError, Result};
use cockpit_core::metrics::DEFAULT_CAPACITY;

const MAX_CAPACITY: usize = 100_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CockpitError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Label reported by `/health` (shown as the tab name on the dashboard).
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            model: None,
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            CockpitError::Config(format!(
                "gateway.listen must be a valid socket address, got {:?}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(CockpitError::Config(format!(
                "metrics.capacity must be between 1 and {MAX_CAPACITY}"
            )));
        }
        Ok(())
    }
}

// Inside the dashboard's 8080-8090 scan range.
fn default_listen() -> String {
    "127.0.0.1:8090".into()
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
