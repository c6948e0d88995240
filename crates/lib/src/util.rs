//! Shared helpers: executable lookup, home directory, timestamps.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::environment::BuildEnvironment;

/// Locate an executable on the PATH of the given environment.
///
/// Walks the entries in order and returns the first regular file that is
/// executable for the current user.
pub fn find_executable(name: &str, env: &BuildEnvironment) -> Option<PathBuf> {
  let path = env.get("PATH")?;
  for dir in std::env::split_paths(path) {
    let candidate = dir.join(exe_name(name));
    if is_executable(&candidate) {
      return Some(candidate);
    }
  }
  None
}

#[cfg(windows)]
fn exe_name(name: &str) -> String {
  format!("{name}.exe")
}

#[cfg(not(windows))]
fn exe_name(name: &str) -> String {
  name.to_string()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;

  path
    .metadata()
    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
  path.is_file()
}

/// Returns the user's home directory.
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory.
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// RFC 3339 timestamp for log headers and archive separators.
pub fn timestamp() -> String {
  humantime::format_rfc3339_seconds(SystemTime::now()).to_string()
}
