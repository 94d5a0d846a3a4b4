//! In-process request metrics recorder.
//!
//! Same record and report shape as the blocks spliced into patched servers,
//! so Rust services and patched Python servers answer `/v1/metrics` alike
//! and one dashboard can poll both.

pub mod buffer;

pub use buffer::{MetricRecord, MetricsBuffer, MetricsReport, Summary, DEFAULT_CAPACITY};
