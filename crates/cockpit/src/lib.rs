//! Top-level facade crate for cockpit.
//!
//! Re-exports the patch engine, recorder and gateway library so users can depend on a single crate.

pub mod core {
    pub use cockpit_core::*;
}

pub mod gateway {
    pub use cockpit_gateway::*;
}
