//! Error taxonomy for a sync run.
//!
//! Required build steps are fail-fast: any variant here aborts the run and
//! surfaces as a nonzero exit. Advisory side operations (cache warm-up,
//! re-signing, log archiving, editor relaunch) never reach this type; they
//! are logged and discarded at the advisory boundary.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
  /// A required build step returned a nonzero exit status.
  #[error("{description} failed with exit code {code}")]
  BuildFailure { description: String, code: i32 },

  /// A required executable is missing.
  #[error("command not found: {command}")]
  CommandNotFound { command: String },

  /// A build step exceeded its allotted runtime and was killed.
  #[error("{description} timed out after {}s", .limit.as_secs())]
  Timeout { description: String, limit: Duration },

  /// The background wasm pipeline failed; surfaced at the join point.
  #[error("background wasm build failed: {0}")]
  Background(#[source] Box<SyncError>),

  /// I/O error during orchestration.
  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
