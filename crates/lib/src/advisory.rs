//! Advisory operations: best-effort steps that never abort the run.
//!
//! The fail-fast/advisory boundary lives here: anything routed through this
//! module logs its failure and lets the run continue. Required build steps
//! must not use it.

use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Run a fallible side operation; on failure log and continue.
pub fn advisory<T, E: Display>(description: &str, op: impl FnOnce() -> Result<T, E>) -> Option<T> {
  match op() {
    Ok(value) => Some(value),
    Err(err) => {
      warn!(step = description, error = %err, "advisory step failed; continuing");
      None
    }
  }
}

/// Async variant of [`advisory`].
pub async fn advisory_async<T, E, F>(description: &str, op: F) -> Option<T>
where
  E: Display,
  F: Future<Output = Result<T, E>>,
{
  match op.await {
    Ok(value) => Some(value),
    Err(err) => {
      warn!(step = description, error = %err, "advisory step failed; continuing");
      None
    }
  }
}
