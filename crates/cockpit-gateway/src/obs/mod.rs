//! Tracing setup shared by the gateway and the patcher binaries.
//!
//! `RUST_LOG` wins when set; otherwise `info`.

use tracing_subscriber::{fmt, EnvFilter};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Timestamped output for the long-running server.
pub fn init_server() {
    fmt().with_env_filter(filter()).init();
}

/// Plain progress lines for the one-shot patchers.
pub fn init_cli() {
    fmt()
        .with_env_filter(filter())
        .with_target(false)
        .without_time()
        .init();
}
