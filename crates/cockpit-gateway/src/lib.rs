//! cockpit gateway library entry.
//!
//! Wires config, state, and the HTTP surface (`/v1/metrics`, `/dashboard`,
//! `/health`) around a `MetricsBuffer`, and hosts the shared CLI plumbing
//! for the patcher binaries.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
