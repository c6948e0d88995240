//! Editor lifecycle: terminate before building, relaunch after.

use std::fs::OpenOptions;
use std::process::{Child, Command, Stdio};

use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::consts;
use crate::environment::BuildEnvironment;
use crate::error::SyncError;
use crate::util::find_executable;

/// Force-terminate any running editor instance.
///
/// Absence of a matching process, or of the termination utility itself, is
/// informational only; a build must not fail over it.
pub fn terminate_editor(process_name: &str, env: &BuildEnvironment) {
  let Some(pkill) = find_executable("pkill", env) else {
    warn!(process = process_name, "pkill not found on PATH; skipping editor termination");
    return;
  };

  let result = Command::new(pkill)
    .args(["-9", process_name])
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status();

  match result {
    Ok(status) if status.success() => {
      info!(process = process_name, "terminated running editor");
    }
    Ok(_) => {
      info!(process = process_name, "no running editor found");
    }
    Err(err) => {
      warn!(error = %err, "pkill unavailable; skipping editor termination");
    }
  }
}

/// Relaunch the editor against the game project as a detached process.
///
/// Output is redirected into the live editor log. The returned handle is
/// never waited on; the editor outlives the sync run.
pub fn relaunch_editor(config: &SyncConfig, env: &BuildEnvironment) -> Result<Child, SyncError> {
  let Some(launcher) = find_executable(consts::EDITOR_LAUNCHER, env) else {
    return Err(SyncError::CommandNotFound {
      command: consts::EDITOR_LAUNCHER.to_string(),
    });
  };

  let log_path = config.editor_log();
  if let Some(parent) = log_path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  let log = OpenOptions::new().append(true).create(true).open(&log_path)?;
  let log_err = log.try_clone()?;

  let child = Command::new(&launcher)
    .arg("--editor")
    .arg("--path")
    .arg(config.game_dir())
    .current_dir(config.game_dir())
    .stdout(Stdio::from(log))
    .stderr(Stdio::from(log_err))
    .spawn()?;

  info!(pid = child.id(), log = %log_path.display(), "editor relaunched");
  Ok(child)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn termination_without_pkill_on_path_is_skipped() {
    let temp = TempDir::new().unwrap();
    let env = BuildEnvironment::from([("PATH".to_string(), temp.path().display().to_string())]);
    terminate_editor("gdsync-no-such-process", &env);
  }

  #[test]
  #[cfg(unix)]
  fn termination_with_no_matching_process_is_informational() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let pkill = temp.path().join("pkill");
    std::fs::write(&pkill, "#!/bin/sh\nexit 1\n").unwrap();
    let mut perms = std::fs::metadata(&pkill).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&pkill, perms).unwrap();

    let env = BuildEnvironment::from([("PATH".to_string(), temp.path().display().to_string())]);
    terminate_editor("gdsync-no-such-process", &env);
  }

  #[test]
  fn relaunch_without_launcher_reports_command_not_found() {
    let temp = TempDir::new().unwrap();
    let config = SyncConfig::new(temp.path());
    let env = BuildEnvironment::from([("PATH".to_string(), temp.path().display().to_string())]);

    let err = relaunch_editor(&config, &env).unwrap_err();
    match err {
      SyncError::CommandNotFound { command } => assert_eq!(command, consts::EDITOR_LAUNCHER),
      other => panic!("expected CommandNotFound, got {other:?}"),
    }
  }
}
