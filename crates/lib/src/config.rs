//! Run configuration and project layout.
//!
//! One `SyncConfig` value per run carries every path and policy; nothing is
//! read from ambient globals after construction.

use std::path::PathBuf;
use std::time::Duration;

use crate::consts;
use crate::target::BuildTarget;

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
  /// Repository root containing the `rust/` crate and `game/` project.
  pub project_root: PathBuf,

  /// Extension name; drives the plugin directory and artifact file names.
  pub extension: String,

  /// Probe for a compiler cache and install it as the rustc wrapper.
  pub cache: bool,

  /// Run the wasm pipeline on a background task when both targets build.
  pub background_wasm: bool,

  /// Relaunch the editor after a successful run.
  pub restart_editor: bool,

  /// Treat a missing emscripten toolchain as fatal instead of skipping.
  pub require_emscripten: bool,

  /// Timeout applied to every build step.
  pub step_timeout: Duration,
}

impl SyncConfig {
  pub fn new(project_root: impl Into<PathBuf>) -> Self {
    Self {
      project_root: project_root.into(),
      extension: consts::DEFAULT_EXTENSION.to_string(),
      cache: true,
      background_wasm: true,
      restart_editor: true,
      require_emscripten: false,
      step_timeout: consts::DEFAULT_STEP_TIMEOUT,
    }
  }

  /// Directory of the extension crate the external toolchain builds.
  pub fn crate_dir(&self) -> PathBuf {
    self.project_root.join(consts::CRATE_DIR)
  }

  /// Directory of the Godot project consuming the plugin.
  pub fn game_dir(&self) -> PathBuf {
    self.project_root.join(consts::GAME_DIR)
  }

  /// Plugin directory the artifacts deploy into.
  pub fn plugin_dir(&self) -> PathBuf {
    self.game_dir().join(consts::ADDONS_DIR).join(&self.extension)
  }

  /// Exclusive build tree for one target.
  pub fn target_dir(&self, target: BuildTarget) -> PathBuf {
    self.crate_dir().join(target.dir_name())
  }

  pub fn logs_dir(&self) -> PathBuf {
    self.crate_dir().join("logs")
  }

  /// Live editor log; relaunch output is redirected here.
  pub fn editor_log(&self) -> PathBuf {
    self.logs_dir().join("editor.log")
  }

  /// Size-capped archive of previous editor sessions.
  pub fn archive_log(&self) -> PathBuf {
    self.logs_dir().join("editor_archive.log")
  }

  /// Build log for the backgrounded wasm pipeline.
  pub fn wasm_build_log(&self) -> PathBuf {
    self.logs_dir().join("wasm_build.log")
  }
}
