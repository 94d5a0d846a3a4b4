//! Patch mlx_vlm/server.py with a /v1/metrics endpoint.

use std::process::ExitCode;

use cockpit_core::recipes::mlx_vlm;
use cockpit_gateway::{cli, obs};

fn main() -> ExitCode {
    let args = cli::PatchArgs::parse_as("patch-mlx-vlm");
    obs::init_cli();
    cli::run_patcher(mlx_vlm::recipe(), args)
}
