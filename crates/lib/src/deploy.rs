//! Artifact deployment into the plugin layout.
//!
//! Copy-if-exists semantics throughout: a missing source is never an error,
//! a present source always overwrites the destination.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::consts;
use crate::error::SyncError;
use crate::target::BuildTarget;

/// Ensure the plugin `bin/debug` and `bin/release` directories exist.
pub fn ensure_plugin_layout(plugin_dir: &Path) -> io::Result<()> {
  fs::create_dir_all(plugin_dir.join("bin").join("debug"))?;
  fs::create_dir_all(plugin_dir.join("bin").join("release"))?;
  Ok(())
}

/// Copy an artifact if the source exists. Returns whether a copy happened.
pub fn copy_artifact(src: &Path, dest: &Path) -> Result<bool, SyncError> {
  if !src.exists() {
    debug!(src = %src.display(), "artifact absent; skipping");
    return Ok(false);
  }

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::copy(src, dest)?;
  info!(src = %src.display(), dest = %dest.display(), "artifact copied");
  Ok(true)
}

/// Host dynamic-library file names for one extension. A developer machine
/// runs one OS at a time; only the names that exist get copied.
fn host_artifact_names(extension: &str) -> [String; 3] {
  [
    format!("lib{extension}.dylib"),
    format!("lib{extension}.so"),
    format!("{extension}.dll"),
  ]
}

/// Copy host debug and release libraries into the plugin.
///
/// Returns the plugin-relative paths that were copied.
pub fn deploy_host_artifacts(config: &SyncConfig) -> Result<Vec<String>, SyncError> {
  let target_dir = config.target_dir(BuildTarget::Host);
  let bin = config.plugin_dir().join("bin");
  let mut copied = Vec::new();

  for profile in ["debug", "release"] {
    for name in host_artifact_names(&config.extension) {
      let src = target_dir.join(profile).join(&name);
      let dest = bin.join(profile).join(&name);
      if copy_artifact(&src, &dest)? {
        if name.ends_with(".dylib") {
          finish_host_binary(&dest);
        }
        copied.push(format!("{profile}/{name}"));
      }
    }
  }

  Ok(copied)
}

/// Copy wasm debug and release binaries into the plugin.
///
/// The debug artifact is searched across the candidate profile directories;
/// the first that exists wins.
pub fn deploy_wasm_artifacts(config: &SyncConfig) -> Result<Vec<String>, SyncError> {
  let target_dir = config.target_dir(BuildTarget::Wasm).join(consts::WASM_TRIPLE);
  let bin = config.plugin_dir().join("bin");
  let wasm_name = format!("{}.wasm", config.extension);
  let mut copied = Vec::new();

  for profile_dir in consts::WASM_DEBUG_PROFILE_DIRS {
    let src = target_dir.join(profile_dir).join(&wasm_name);
    if copy_artifact(&src, &bin.join("debug").join(&wasm_name))? {
      copied.push(format!("debug/{wasm_name}"));
      break;
    }
  }

  let release_src = target_dir.join("release").join(&wasm_name);
  if copy_artifact(&release_src, &bin.join("release").join(&wasm_name))? {
    copied.push(format!("release/{wasm_name}"));
  }

  Ok(copied)
}

/// Strip the quarantine attribute and ad-hoc re-sign a freshly copied
/// dylib so the editor loads it without a security prompt. Both steps are
/// best-effort.
#[cfg(target_os = "macos")]
fn finish_host_binary(binary: &Path) {
  use std::process::Command;

  use crate::advisory::advisory;

  advisory("quarantine removal", || {
    Command::new("xattr")
      .args(["-dr", "com.apple.quarantine"])
      .arg(binary)
      .status()
      .map(|_| ())
  });
  advisory("ad-hoc codesign", || {
    Command::new("codesign")
      .args(["--force", "--sign", "-"])
      .arg(binary)
      .status()
      .map(|_| ())
  });
}

#[cfg(not(target_os = "macos"))]
fn finish_host_binary(_binary: &Path) {}
