//! Locate an installed target package through a Python interpreter.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{CockpitError, Result};

/// Default interpreter used for discovery.
pub const DEFAULT_PYTHON: &str = "python3";

/// Return `<package dir>/server.py` for `package` as seen by `python`.
///
/// Only checks that the package imports; the caller verifies the file.
pub fn find_server_py(package: &str, python: &str) -> Result<PathBuf> {
    let script = format!("import os, {package}; print(os.path.dirname({package}.__file__))");
    let out = Command::new(python)
        .args(["-c", &script])
        .output()
        .map_err(|e| CockpitError::Discovery(format!("could not run {python}: {e}")))?;

    if !out.status.success() {
        return Err(CockpitError::Discovery(format!(
            "could not find {package}/server.py with {python}; pass the path as an argument"
        )));
    }

    let dir = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if dir.is_empty() {
        return Err(CockpitError::Discovery(format!(
            "{python} reported no location for {package}"
        )));
    }
    tracing::debug!(%package, %dir, "discovered package");
    Ok(PathBuf::from(dir).join("server.py"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter_is_discovery_error() {
        let err = find_server_py("mlx_lm", "cockpit-no-such-python").unwrap_err();
        assert_eq!(err.kind().as_str(), "DISCOVERY");
    }
}
