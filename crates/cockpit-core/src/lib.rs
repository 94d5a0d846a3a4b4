//! cockpit core: anchor-based patch engine, target recipes, and the request
//! metrics recorder.
//!
//! This crate carries no runtime or HTTP dependencies. The gateway crate and
//! the patcher binaries build on it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `CockpitError`/`Result`, and a failed patch never leaves a
//! partially modified target behind.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod dashboard;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod patch;
pub mod recipes;

/// Shared result type.
pub use error::{CockpitError, ErrorKind, Result};
