//! Patch mlx_lm/server.py with /v1/metrics and /dashboard endpoints.

use std::process::ExitCode;

use cockpit_core::recipes::mlx_lm;
use cockpit_gateway::{cli, obs};

fn main() -> ExitCode {
    let args = cli::PatchArgs::parse_as("patch-mlx-lm");
    obs::init_cli();
    cli::run_patcher(mlx_lm::recipe(), args)
}
