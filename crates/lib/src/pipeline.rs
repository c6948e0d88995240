//! Per-target build pipelines: ordered debug-then-release steps plus
//! artifact deployment.
//!
//! Deployment for a target runs only after every build step for that target
//! has succeeded; a failed step aborts the remainder of its pipeline.

use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::consts;
use crate::deploy::{deploy_host_artifacts, deploy_wasm_artifacts};
use crate::environment::BuildEnvironment;
use crate::error::SyncError;
use crate::report::PipelineReport;
use crate::runner::{BuildStep, run_step};
use crate::target::BuildTarget;
use crate::util::find_executable;

/// The two host build invocations: unoptimized, then optimized.
pub fn host_steps(config: &SyncConfig, env: &BuildEnvironment) -> Vec<BuildStep> {
  let cwd = config.crate_dir();
  vec![
    BuildStep {
      command: vec!["cargo".to_string(), "build".to_string()],
      cwd: cwd.clone(),
      env: env.clone(),
      description: "host debug build".to_string(),
      quiet: false,
      log_file: None,
      timeout: config.step_timeout,
    },
    BuildStep {
      command: vec!["cargo".to_string(), "build".to_string(), "--release".to_string()],
      cwd,
      env: env.clone(),
      description: "host release build".to_string(),
      quiet: false,
      log_file: None,
      timeout: config.step_timeout,
    },
  ]
}

/// The two wasm build invocations, on the nightly channel with std rebuilt
/// for the emscripten triple.
///
/// The debug step overlays the iteration-speed profile from
/// [`consts::WASM_DEV_PROFILE`]; the release step uses the plain env.
pub fn wasm_steps(config: &SyncConfig, env: &BuildEnvironment, quiet: bool) -> Vec<BuildStep> {
  let cwd = config.crate_dir();
  let base: Vec<String> = [
    "cargo",
    "+nightly",
    "build",
    "-Zbuild-std=std,panic_abort",
    "--target",
    consts::WASM_TRIPLE,
  ]
  .iter()
  .map(|arg| arg.to_string())
  .collect();

  let mut debug_env = env.clone();
  for (key, value) in consts::WASM_DEV_PROFILE {
    debug_env.insert((*key).to_string(), (*value).to_string());
  }

  let mut release_command = base.clone();
  release_command.push("--release".to_string());

  vec![
    BuildStep {
      command: base,
      cwd: cwd.clone(),
      env: debug_env,
      description: "wasm debug build".to_string(),
      quiet,
      log_file: Some(config.wasm_build_log()),
      timeout: config.step_timeout,
    },
    BuildStep {
      command: release_command,
      cwd,
      env: env.clone(),
      description: "wasm release build".to_string(),
      quiet,
      log_file: Some(config.wasm_build_log()),
      timeout: config.step_timeout,
    },
  ]
}

/// Build the host target and deploy its libraries.
pub async fn run_host_pipeline(
  config: &SyncConfig,
  env: &BuildEnvironment,
) -> Result<PipelineReport, SyncError> {
  for step in host_steps(config, env) {
    run_step(&step).await?;
  }

  let artifacts = deploy_host_artifacts(config)?;
  info!(artifacts = artifacts.len(), "host binaries ready");
  Ok(PipelineReport::completed(BuildTarget::Host, artifacts))
}

/// Build the wasm target and deploy its binaries.
///
/// Without an emscripten compiler on PATH the pipeline is skipped with a
/// warning, unless the run requires the toolchain.
pub async fn run_wasm_pipeline(
  config: &SyncConfig,
  env: &BuildEnvironment,
  quiet: bool,
) -> Result<PipelineReport, SyncError> {
  if find_executable(consts::EMSCRIPTEN_COMPILER, env).is_none() {
    if config.require_emscripten {
      return Err(SyncError::CommandNotFound {
        command: consts::EMSCRIPTEN_COMPILER.to_string(),
      });
    }
    warn!(compiler = consts::EMSCRIPTEN_COMPILER, "emscripten not found; skipping wasm build");
    return Ok(PipelineReport::skipped(BuildTarget::Wasm));
  }

  for step in wasm_steps(config, env, quiet) {
    run_step(&step).await?;
  }

  let artifacts = deploy_wasm_artifacts(config)?;
  info!(artifacts = artifacts.len(), "wasm binaries ready");
  Ok(PipelineReport::completed(BuildTarget::Wasm, artifacts))
}
