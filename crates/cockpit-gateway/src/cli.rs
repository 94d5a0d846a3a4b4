//! Command-line definitions using clap.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use cockpit_core::discovery::{self, DEFAULT_PYTHON};
use cockpit_core::patch::{PatchOutcome, Patcher, Recipe};

/// Patch an installed server.py with /v1/metrics support.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct PatchArgs {
    /// Path to server.py; auto-discovered through Python when omitted
    pub path: Option<PathBuf>,

    /// Python interpreter used for auto-discovery
    #[arg(long, env = "COCKPIT_PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: String,
}

impl PatchArgs {
    /// Parse process args under the given binary name.
    pub fn parse_as(bin: &'static str) -> Self {
        let matches = Self::command().name(bin).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// cockpit metrics gateway
#[derive(Debug, Parser)]
#[command(name = "cockpit-gateway", version, about, long_about = None)]
pub struct GatewayArgs {
    /// Configuration file [default: cockpit.yaml, built-in defaults if absent]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "cockpit.yaml";

/// Run one patcher end to end and map the result to an exit code.
pub fn run_patcher(recipe: Recipe, args: PatchArgs) -> ExitCode {
    let target = match args.path {
        Some(path) => path,
        None => match discovery::find_server_py(recipe.package, &args.python) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(kind = e.kind().as_str(), "{e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match Patcher::new(recipe).run(&target) {
        Ok(PatchOutcome::Patched { .. } | PatchOutcome::AlreadyPatched) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), "{e}");
            ExitCode::FAILURE
        }
    }
}
