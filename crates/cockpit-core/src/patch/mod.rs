//! Anchor-based text patch engine.
//!
//! The engine is format-agnostic: a [`Recipe`] supplies the sentinel, the
//! ordered insertion steps, and the markers checked after splicing. The
//! [`Patcher`] drives one [`PatchJob`] through backup, splice, validation,
//! and either an atomic commit or a rollback from the backup.

pub mod anchor;
pub mod job;
pub mod recipe;

pub use anchor::Locator;
pub use job::{backup_path, PatchJob, PatchOutcome, Patcher, BACKUP_SUFFIX};
pub use recipe::{Recipe, Step};
