//! Run reports for the terminal summary and JSON output.

use serde::Serialize;

use crate::target::BuildTarget;

/// How a target's pipeline ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOutcome {
  /// Both builds ran and artifacts were deployed.
  Completed,
  /// The wasm toolchain is absent; the pipeline was skipped.
  SkippedMissingToolchain,
}

/// Result of one target's pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
  pub target: &'static str,
  pub outcome: PipelineOutcome,
  /// Plugin-relative paths of deployed artifacts, e.g. `debug/libgame.so`.
  pub artifacts: Vec<String>,
}

impl PipelineReport {
  pub fn completed(target: BuildTarget, artifacts: Vec<String>) -> Self {
    Self {
      target: target.name(),
      outcome: PipelineOutcome::Completed,
      artifacts,
    }
  }

  pub fn skipped(target: BuildTarget) -> Self {
    Self {
      target: target.name(),
      outcome: PipelineOutcome::SkippedMissingToolchain,
      artifacts: Vec::new(),
    }
  }
}

/// Summary of a whole sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
  pub host: Option<PipelineReport>,
  pub wasm: Option<PipelineReport>,
  pub duration_secs: f64,
}

impl SyncReport {
  /// Total artifacts placed into the plugin.
  pub fn artifact_count(&self) -> usize {
    self
      .host
      .iter()
      .chain(self.wasm.iter())
      .map(|report| report.artifacts.len())
      .sum()
  }
}
