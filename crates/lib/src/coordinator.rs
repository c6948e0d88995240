//! Top-level run orchestration.
//!
//! The main task runs the host pipeline; when both targets are requested
//! and background execution is enabled, the wasm pipeline runs on a single
//! background task. Its `JoinHandle` is the one synchronization point: the
//! result is written once before the task exits and read once after the
//! join, then any stored failure is re-raised as a fatal error.

use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::advisory::advisory;
use crate::config::SyncConfig;
use crate::consts;
use crate::deploy::ensure_plugin_layout;
use crate::editor::{relaunch_editor, terminate_editor};
use crate::environment::{self, BuildEnvironment};
use crate::error::SyncError;
use crate::logs::archive_editor_log;
use crate::pipeline::{run_host_pipeline, run_wasm_pipeline};
use crate::report::{PipelineReport, SyncReport};
use crate::target::{BuildTarget, TargetSet};

/// Run a full sync for the selected targets.
///
/// Resolves the ambient process environment once and hands each pipeline a
/// private per-target copy.
pub async fn run_sync(config: &SyncConfig, targets: TargetSet) -> Result<SyncReport, SyncError> {
  let base = environment::resolve(&environment::ambient(), config.cache).await;
  run_sync_with_env(config, targets, base).await
}

/// Run a full sync with an explicit, already-resolved base environment.
pub async fn run_sync_with_env(
  config: &SyncConfig,
  targets: TargetSet,
  base: BuildEnvironment,
) -> Result<SyncReport, SyncError> {
  let started = Instant::now();

  terminate_editor(consts::EDITOR_PROCESS, &base);
  ensure_plugin_layout(&config.plugin_dir())?;

  let mut report = SyncReport::default();
  let mut background: Option<JoinHandle<Result<PipelineReport, SyncError>>> = None;
  let mut inline_wasm_env: Option<BuildEnvironment> = None;

  if targets.wasm {
    let env = environment::for_target(&base, BuildTarget::Wasm, config);
    if targets.host && config.background_wasm {
      info!(log = %config.wasm_build_log().display(), "wasm build started in the background");
      let task_config = config.clone();
      background = Some(tokio::spawn(async move {
        run_wasm_pipeline(&task_config, &env, true).await
      }));
    } else {
      inline_wasm_env = Some(env);
    }
  } else {
    info!("wasm target not selected");
  }

  let mut host_error: Option<SyncError> = None;
  if targets.host {
    let env = environment::for_target(&base, BuildTarget::Host, config);
    match run_host_pipeline(config, &env).await {
      Ok(host) => report.host = Some(host),
      Err(err) => host_error = Some(err),
    }
  } else {
    info!("host target not selected");
  }

  if host_error.is_none()
    && let Some(env) = inline_wasm_env
  {
    report.wasm = Some(run_wasm_pipeline(config, &env, false).await?);
  }

  // The join happens even when the host pipeline failed; the sibling
  // pipeline runs to its own completion or failure.
  let background_result = match background {
    Some(handle) => Some(join_background(handle).await),
    None => None,
  };

  if let Some(err) = host_error {
    return Err(err);
  }
  if let Some(result) = background_result {
    report.wasm = Some(result?);
  }

  advisory("log archiving", || {
    archive_editor_log(&config.editor_log(), &config.archive_log(), consts::ARCHIVE_LINE_LIMIT)
  });

  if config.restart_editor {
    advisory("editor relaunch", || relaunch_editor(config, &base));
  } else {
    info!("editor relaunch suppressed");
  }

  report.duration_secs = started.elapsed().as_secs_f64();
  Ok(report)
}

/// Join the background wasm task and re-raise any stored failure.
async fn join_background(
  handle: JoinHandle<Result<PipelineReport, SyncError>>,
) -> Result<PipelineReport, SyncError> {
  match handle.await {
    Ok(Ok(wasm)) => Ok(wasm),
    Ok(Err(err)) => Err(SyncError::Background(Box::new(err))),
    Err(join_err) => {
      warn!(error = %join_err, "background wasm task aborted");
      Err(SyncError::Background(Box::new(SyncError::Io(
        std::io::Error::other(join_err),
      ))))
    }
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use crate::report::PipelineOutcome;
  use std::os::unix::fs::PermissionsExt;
  use std::path::{Path, PathBuf};
  use tempfile::TempDir;

  /// Temp project with a stub toolchain directory used as the whole PATH.
  struct TestProject {
    temp: TempDir,
  }

  impl TestProject {
    fn new() -> Self {
      let temp = TempDir::new().unwrap();
      let project = Self { temp };
      std::fs::create_dir_all(project.config().crate_dir()).unwrap();
      std::fs::create_dir_all(project.stub_bin()).unwrap();
      project
    }

    fn config(&self) -> SyncConfig {
      let mut config = SyncConfig::new(self.temp.path());
      config.restart_editor = false;
      config
    }

    fn stub_bin(&self) -> PathBuf {
      self.temp.path().join("stub-bin")
    }

    fn write_stub(&self, name: &str, script: &str) {
      let path = self.stub_bin().join(name);
      std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
      let mut perms = std::fs::metadata(&path).unwrap().permissions();
      perms.set_mode(0o755);
      std::fs::set_permissions(&path, perms).unwrap();
    }

    fn base_env(&self) -> BuildEnvironment {
      BuildEnvironment::from([("PATH".to_string(), self.stub_bin().display().to_string())])
    }

    fn seed_host_artifact(&self, config: &SyncConfig) -> PathBuf {
      let lib = config.target_dir(BuildTarget::Host).join("debug/libgame.so");
      std::fs::create_dir_all(lib.parent().unwrap()).unwrap();
      std::fs::write(&lib, "elf").unwrap();
      config.plugin_dir().join("bin/debug/libgame.so")
    }
  }

  fn all_targets() -> TargetSet {
    TargetSet::from_flags(false, false)
  }

  fn host_only() -> TargetSet {
    TargetSet::from_flags(true, false)
  }

  #[tokio::test]
  async fn host_only_run_never_touches_the_wasm_target() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 0");
    let config = project.config();

    let report = run_sync_with_env(&config, host_only(), project.base_env()).await.unwrap();

    assert!(report.host.is_some());
    assert!(report.wasm.is_none());
    assert!(!config.wasm_build_log().exists());
    assert!(!config.target_dir(BuildTarget::Wasm).exists());
  }

  #[tokio::test]
  async fn both_targets_without_emscripten_skip_wasm_and_succeed() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 0");
    let config = project.config();

    let report = run_sync_with_env(&config, all_targets(), project.base_env()).await.unwrap();

    assert!(report.host.is_some());
    assert_eq!(
      report.wasm.map(|wasm| wasm.outcome),
      Some(PipelineOutcome::SkippedMissingToolchain)
    );
  }

  #[tokio::test]
  async fn host_failure_surfaces_and_deploys_nothing() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 3");
    let config = project.config();
    let deployed = project.seed_host_artifact(&config);

    let err = run_sync_with_env(&config, host_only(), project.base_env()).await.unwrap_err();

    assert!(matches!(err, SyncError::BuildFailure { code: 3, .. }));
    assert!(!deployed.exists());
  }

  #[tokio::test]
  async fn background_wasm_failure_surfaces_after_host_artifacts_deploy() {
    let project = TestProject::new();
    // Host builds succeed; the nightly wasm builds fail.
    project.write_stub("cargo", "if [ \"$1\" = \"+nightly\" ]; then exit 9; fi\nexit 0");
    project.write_stub("emcc", "exit 0");
    let config = project.config();
    let deployed = project.seed_host_artifact(&config);

    let err = run_sync_with_env(&config, all_targets(), project.base_env()).await.unwrap_err();

    match err {
      SyncError::Background(inner) => {
        assert!(matches!(*inner, SyncError::BuildFailure { code: 9, .. }));
      }
      other => panic!("expected Background, got {other:?}"),
    }
    assert!(deployed.exists(), "host artifacts stay on disk after the join");
  }

  #[tokio::test]
  async fn disabling_background_serializes_both_pipelines() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 0");
    project.write_stub("emcc", "exit 0");
    let mut config = project.config();
    config.background_wasm = false;

    let report = run_sync_with_env(&config, all_targets(), project.base_env()).await.unwrap();

    assert_eq!(report.host.map(|host| host.outcome), Some(PipelineOutcome::Completed));
    assert_eq!(report.wasm.map(|wasm| wasm.outcome), Some(PipelineOutcome::Completed));
    // The wasm steps ran and logged to the per-run build log.
    let log = std::fs::read_to_string(config.wasm_build_log()).unwrap();
    assert!(log.contains("=== wasm debug build @ "));
    assert!(log.contains("=== wasm release build @ "));
  }

  #[tokio::test]
  async fn successful_run_truncates_the_live_editor_log() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 0");
    let config = project.config();
    std::fs::create_dir_all(config.logs_dir()).unwrap();
    std::fs::write(config.editor_log(), "previous session\n").unwrap();

    run_sync_with_env(&config, host_only(), project.base_env()).await.unwrap();

    assert_eq!(std::fs::read_to_string(config.editor_log()).unwrap(), "");
    let archive = std::fs::read_to_string(config.archive_log()).unwrap();
    assert!(archive.contains("previous session"));
  }

  #[tokio::test]
  async fn plugin_layout_exists_after_any_successful_run() {
    let project = TestProject::new();
    project.write_stub("cargo", "exit 0");
    let config = project.config();

    run_sync_with_env(&config, host_only(), project.base_env()).await.unwrap();

    assert!(config.plugin_dir().join("bin/debug").is_dir());
    assert!(config.plugin_dir().join("bin/release").is_dir());
  }

  #[test]
  fn path_helpers_reference_the_stub_dir() {
    let project = TestProject::new();
    let env = project.base_env();
    assert!(Path::new(&env["PATH"]).is_dir());
  }
}
