//! Patch job lifecycle: backup, splice, validate, commit or roll back.

use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{CockpitError, Result};

use super::anchor::splice;
use super::recipe::Recipe;

/// Suffix appended to the target path for the pre-patch copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// File rewritten; the pre-patch copy lives at `backup`.
    Patched { backup: PathBuf },
    /// Sentinel already present, nothing touched.
    AlreadyPatched,
}

/// In-memory state of one patch attempt.
#[derive(Debug)]
pub struct PatchJob {
    original_text: String,
    working_text: String,
    insertion_count: usize,
}

impl PatchJob {
    pub fn new(original_text: String) -> Self {
        Self {
            working_text: original_text.clone(),
            original_text,
            insertion_count: 0,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn working_text(&self) -> &str {
        &self.working_text
    }

    pub fn insertion_count(&self) -> usize {
        self.insertion_count
    }

    /// Run every step of `recipe` in order against the working text.
    ///
    /// Anchors are searched in the already-modified text, so step order matters.
    pub fn apply(&mut self, recipe: &Recipe) -> Result<()> {
        let total = recipe.expected_insertions();
        let mut counted = 0usize;

        for (i, step) in recipe.steps.iter().enumerate() {
            if step.counted {
                counted += 1;
            }
            let prefix = if step.counted {
                format!("[{counted}/{total}]")
            } else {
                "     ".to_string()
            };

            if let Some(probe) = step.unless_present {
                if self.working_text.contains(probe) {
                    if step.counted {
                        self.insertion_count += 1;
                    }
                    tracing::info!("  {prefix} {} already present", step.label);
                    continue;
                }
            }

            let at = step
                .locator
                .locate(&self.working_text)
                .ok_or_else(|| CockpitError::AnchorNotFound {
                    step: i + 1,
                    label: step.label,
                    anchors: step.locator.anchors(),
                })?;

            self.working_text = splice(&self.working_text, at, &step.block);
            if step.counted {
                self.insertion_count += 1;
            }
            tracing::info!("  {prefix} inserted {}", step.label);
        }
        Ok(())
    }

    /// Check the insertion count and every marker of `recipe`.
    pub fn validate(&self, recipe: &Recipe) -> Result<()> {
        let expected = recipe.expected_insertions();
        if self.insertion_count != expected {
            return Err(CockpitError::InsertionCount {
                expected,
                actual: self.insertion_count,
            });
        }
        for (needle, label) in recipe.markers {
            if !self.working_text.contains(needle) {
                return Err(CockpitError::Validation { marker: *label });
            }
        }
        Ok(())
    }

    pub fn into_text(self) -> String {
        self.working_text
    }
}

/// Applies one recipe to target files.
#[derive(Debug, Clone)]
pub struct Patcher {
    recipe: Recipe,
}

impl Patcher {
    pub fn new(recipe: Recipe) -> Self {
        Self { recipe }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Patch `target` end to end.
    ///
    /// On any failure after the backup is written, the target is restored
    /// from the backup and the backup is left on disk.
    pub fn run(&self, target: &Path) -> Result<PatchOutcome> {
        if !target.is_file() {
            return Err(CockpitError::TargetMissing(target.to_path_buf()));
        }
        tracing::info!("Patching: {}", target.display());

        let original = fs::read_to_string(target).map_err(|e| CockpitError::io(target, e))?;
        if original.contains(self.recipe.sentinel) {
            tracing::info!("Already patched: {}", target.display());
            return Ok(PatchOutcome::AlreadyPatched);
        }

        let backup = backup_path(target);
        copy_preserving(target, &backup)?;
        tracing::info!("Backup created: {}", backup.display());

        let mut job = PatchJob::new(original);
        let result = job
            .apply(&self.recipe)
            .and_then(|()| job.validate(&self.recipe))
            .and_then(|()| commit(target, job.working_text()));

        match result {
            Ok(()) => {
                tracing::info!("Patched successfully: {}", target.display());
                if let Some(note) = self.recipe.followup {
                    tracing::warn!("{note}");
                }
                Ok(PatchOutcome::Patched { backup })
            }
            Err(e) => {
                rollback(target, &backup);
                Err(e)
            }
        }
    }
}

/// `<target>.bak`
pub fn backup_path(target: &Path) -> PathBuf {
    let mut s = target.as_os_str().to_owned();
    s.push(BACKUP_SUFFIX);
    PathBuf::from(s)
}

fn rollback(target: &Path, backup: &Path) {
    if !backup.is_file() {
        return;
    }
    match copy_preserving(backup, target) {
        Ok(()) => tracing::warn!("Rolled back to backup: {}", backup.display()),
        Err(e) => tracing::error!(
            "rollback failed ({e}); restore manually from {}",
            backup.display()
        ),
    }
}

/// Copy contents and permissions, then carry over access/modification times.
fn copy_preserving(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|e| CockpitError::io(to, e))?;

    let meta = fs::metadata(from).map_err(|e| CockpitError::io(from, e))?;
    if let (Ok(accessed), Ok(modified)) = (meta.accessed(), meta.modified()) {
        let times = FileTimes::new()
            .set_accessed(accessed)
            .set_modified(modified);
        File::open(to)
            .and_then(|f| f.set_times(times))
            .map_err(|e| CockpitError::io(to, e))?;
    }
    Ok(())
}

/// Write through a sibling temp file and rename over `target`.
fn commit(target: &Path, text: &str) -> Result<()> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let perms = fs::metadata(target)
        .map_err(|e| CockpitError::io(target, e))?
        .permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CockpitError::io(dir, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CockpitError::io(tmp.path(), e))?;
    tmp.as_file()
        .set_permissions(perms)
        .map_err(|e| CockpitError::io(tmp.path(), e))?;
    tmp.persist(target)
        .map_err(|e| CockpitError::io(target, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Locator, Step};

    fn recipe() -> Recipe {
        Recipe {
            name: "toy",
            package: "toy",
            sentinel: "# patched",
            steps: vec![
                Step::new("header", Locator::LineEnd(&["import a"]), "# patched\n"),
                Step::new("footer", Locator::Before(&["main()"]), "hook()\n"),
            ],
            markers: &[("# patched", "sentinel"), ("hook()", "hook")],
            followup: None,
        }
    }

    #[test]
    fn apply_counts_and_validates() {
        let mut job = PatchJob::new("import a\nmain()\n".into());
        job.apply(&recipe()).unwrap();
        assert_eq!(job.insertion_count(), 2);
        job.validate(&recipe()).unwrap();
        assert_eq!(job.working_text(), "import a\n# patched\nhook()\nmain()\n");
        assert_eq!(job.original_text(), "import a\nmain()\n");
    }

    #[test]
    fn missing_anchor_names_step() {
        let mut job = PatchJob::new("import a\n".into());
        let err = job.apply(&recipe()).unwrap_err();
        match err {
            CockpitError::AnchorNotFound { step, anchors, .. } => {
                assert_eq!(step, 2);
                assert_eq!(anchors, vec!["main()"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skipped_counted_step_still_counts() {
        let mut r = recipe();
        r.steps[1] = Step::new("footer", Locator::Before(&["nowhere"]), "hook()\n")
            .unless_present("hook()");
        let mut job = PatchJob::new("import a\nhook()\n".into());
        job.apply(&r).unwrap();
        assert_eq!(job.insertion_count(), 2);
    }

    #[test]
    fn uncounted_step_is_not_expected() {
        let mut r = recipe();
        let pre = Step::new("pre", Locator::Before(&["import a"]), "import b\n").uncounted();
        r.steps.insert(0, pre);
        assert_eq!(r.expected_insertions(), 2);
        let mut job = PatchJob::new("import a\nmain()\n".into());
        job.apply(&r).unwrap();
        job.validate(&r).unwrap();
        assert!(job.into_text().starts_with("import b\nimport a\n"));
    }

    #[test]
    fn validation_reports_missing_marker() {
        let mut r = recipe();
        r.markers = &[("# patched", "sentinel"), ("never", "absent marker")];
        let mut job = PatchJob::new("import a\nmain()\n".into());
        job.apply(&r).unwrap();
        let err = job.validate(&r).unwrap_err();
        assert_eq!(err.kind().as_str(), "VALIDATION");
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/x/server.py")),
            PathBuf::from("/x/server.py.bak")
        );
    }
}
