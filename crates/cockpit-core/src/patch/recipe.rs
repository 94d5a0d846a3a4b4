//! Recipe: everything the engine needs to patch one target format.

use super::anchor::Locator;

/// One ordered insertion step.
#[derive(Debug, Clone)]
pub struct Step {
    /// Human-readable description, used in progress lines.
    pub label: &'static str,
    /// Where the block goes.
    pub locator: Locator,
    /// Text spliced at the located offset.
    pub block: String,
    /// Counted steps take part in the `[n/N]` numbering and the final count check.
    pub counted: bool,
    /// When this substring is already present the step is skipped.
    /// A skipped counted step still counts.
    pub unless_present: Option<&'static str>,
}

impl Step {
    pub fn new(label: &'static str, locator: Locator, block: impl Into<String>) -> Self {
        Self {
            label,
            locator,
            block: block.into(),
            counted: true,
            unless_present: None,
        }
    }

    /// Mark the step as a prerequisite outside the counted sequence.
    pub fn uncounted(mut self) -> Self {
        self.counted = false;
        self
    }

    pub fn unless_present(mut self, probe: &'static str) -> Self {
        self.unless_present = Some(probe);
        self
    }
}

/// Patch recipe for one target format.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Short format name (e.g. `mlx_lm`).
    pub name: &'static str,
    /// Python package whose `server.py` this recipe targets.
    pub package: &'static str,
    /// Presence means the target is already patched.
    pub sentinel: &'static str,
    pub steps: Vec<Step>,
    /// `(needle, label)` pairs that must all be present after splicing.
    pub markers: &'static [(&'static str, &'static str)],
    /// Printed after a successful patch.
    pub followup: Option<&'static str>,
}

impl Recipe {
    /// Number of counted steps; the engine expects exactly this many insertions.
    pub fn expected_insertions(&self) -> usize {
        self.steps.iter().filter(|s| s.counted).count()
    }
}
