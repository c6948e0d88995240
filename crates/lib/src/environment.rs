//! Build environment resolution.
//!
//! Every target builds with a private environment map derived from one
//! resolver call. The resolver never mutates its input; per-target overlays
//! are fresh clones, so no map is ever shared between pipelines.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::advisory::advisory_async;
use crate::config::SyncConfig;
use crate::consts;
use crate::target::BuildTarget;
use crate::util::{find_executable, home_dir};

/// Process environment for one build run.
pub type BuildEnvironment = BTreeMap<String, String>;

/// Snapshot the ambient process environment.
pub fn ambient() -> BuildEnvironment {
  std::env::vars().collect()
}

/// Resolve the base build environment.
///
/// Prepends `~/.cargo/bin` to PATH when the directory exists, merges the
/// variables exported by `~/.cargo/env`, and installs a compiler-cache
/// wrapper when enabled. Returns a fresh map; `base` is left untouched.
pub async fn resolve(base: &BuildEnvironment, enable_cache: bool) -> BuildEnvironment {
  let mut env = base.clone();

  if let Some(home) = home_dir() {
    let cargo = home.join(".cargo");
    prepend_path_entry(&mut env, &cargo.join("bin"));
    merge_cargo_env(&mut env, &cargo.join("env")).await;
  }

  configure_cache(&mut env, enable_cache).await;

  env
}

/// Clone the base environment and point `CARGO_TARGET_DIR` at the target's
/// exclusive build tree.
pub fn for_target(base: &BuildEnvironment, target: BuildTarget, config: &SyncConfig) -> BuildEnvironment {
  let mut env = base.clone();
  env.insert(
    consts::CARGO_TARGET_DIR_VAR.to_string(),
    config.target_dir(target).display().to_string(),
  );
  env
}

/// Prepend a directory to PATH, once. A directory that is absent from disk
/// or already on PATH leaves the map unchanged.
pub(crate) fn prepend_path_entry(env: &mut BuildEnvironment, dir: &Path) {
  if !dir.is_dir() {
    return;
  }

  let path = env.get("PATH").cloned().unwrap_or_default();
  if std::env::split_paths(&path).any(|entry| entry == dir) {
    return;
  }

  let entries = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&path));
  if let Ok(joined) = std::env::join_paths(entries) {
    env.insert("PATH".to_string(), joined.to_string_lossy().into_owned());
  }
}

/// Source `~/.cargo/env` in a login shell and merge the variables it
/// exports. Failure is non-fatal; the build proceeds with whatever was
/// already resolved.
#[cfg(unix)]
async fn merge_cargo_env(env: &mut BuildEnvironment, cargo_env: &Path) {
  use tracing::debug;

  if !cargo_env.is_file() {
    return;
  }

  let script = format!("source \"{}\" >/dev/null 2>&1 && env", cargo_env.display());
  let output = match Command::new("bash").arg("-lc").arg(&script).output().await {
    Ok(output) if output.status.success() => output,
    Ok(output) => {
      debug!(code = ?output.status.code(), "sourcing ~/.cargo/env failed; continuing");
      return;
    }
    Err(err) => {
      debug!(error = %err, "could not run bash to source ~/.cargo/env; continuing");
      return;
    }
  };

  for line in String::from_utf8_lossy(&output.stdout).lines() {
    if let Some((key, value)) = line.split_once('=') {
      env.insert(key.to_string(), value.to_string());
    }
  }
}

#[cfg(not(unix))]
async fn merge_cargo_env(_env: &mut BuildEnvironment, _cargo_env: &Path) {}

/// Probe for a compiler cache and install it as the rustc wrapper. The
/// highest-priority tool also gets a server warm-up.
pub(crate) async fn configure_cache(env: &mut BuildEnvironment, enable: bool) {
  if !enable {
    info!("compiler cache disabled");
    return;
  }

  for tool in consts::CACHE_TOOLS {
    if let Some(path) = find_executable(tool, env) {
      env.insert(consts::RUSTC_WRAPPER_VAR.to_string(), path.display().to_string());
      info!(tool = %tool, path = %path.display(), "compiler cache enabled");

      if *tool == "sccache" {
        advisory_async("sccache warm-up", async {
          Command::new(&path).arg("--start-server").output().await.map(|_| ())
        })
        .await;
      }
      return;
    }
  }

  info!("no compiler cache found on PATH; building without one");
}
