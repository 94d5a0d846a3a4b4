//! Shared error type across cockpit crates.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error categories (used for exit diagnostics and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Target package could not be located.
    Discovery,
    /// Supplied target is not a regular file.
    TargetMissing,
    /// An expected anchor is absent (target format drift).
    AnchorNotFound,
    /// Fewer or more insertions than the recipe expects.
    InsertionCount,
    /// Post-splice marker check failed.
    Validation,
    /// Filesystem failure.
    Io,
    /// Invalid configuration.
    Config,
    /// Gateway bind/serve failure.
    Server,
}

impl ErrorKind {
    /// String representation used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Discovery => "DISCOVERY",
            ErrorKind::TargetMissing => "TARGET_MISSING",
            ErrorKind::AnchorNotFound => "ANCHOR_NOT_FOUND",
            ErrorKind::InsertionCount => "INSERTION_COUNT",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Io => "IO",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Server => "SERVER",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CockpitError>;

/// Unified error type used by the patch engine, binaries and gateway.
#[derive(Debug, Error)]
pub enum CockpitError {
    #[error("discovery failed: {0}")]
    Discovery(String),
    #[error("file not found: {}", .0.display())]
    TargetMissing(PathBuf),
    #[error("step {step} ({label}): could not find anchor {}", format_anchors(.anchors))]
    AnchorNotFound {
        step: usize,
        label: &'static str,
        anchors: Vec<&'static str>,
    },
    #[error("expected {expected} insertions, got {actual}")]
    InsertionCount { expected: usize, actual: usize },
    #[error("validation failed: missing {marker}")]
    Validation { marker: &'static str },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config: {0}")]
    Config(String),
    #[error("server: {0}")]
    Server(String),
}

impl CockpitError {
    /// Map the error onto its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CockpitError::Discovery(_) => ErrorKind::Discovery,
            CockpitError::TargetMissing(_) => ErrorKind::TargetMissing,
            CockpitError::AnchorNotFound { .. } => ErrorKind::AnchorNotFound,
            CockpitError::InsertionCount { .. } => ErrorKind::InsertionCount,
            CockpitError::Validation { .. } => ErrorKind::Validation,
            CockpitError::Io { .. } => ErrorKind::Io,
            CockpitError::Config(_) => ErrorKind::Config,
            CockpitError::Server(_) => ErrorKind::Server,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CockpitError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_anchors(anchors: &[&str]) -> String {
    anchors
        .iter()
        .map(|a| format!("{a:?}"))
        .collect::<Vec<_>>()
        .join(" | ")
}
