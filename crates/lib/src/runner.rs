//! External build step execution.
//!
//! One invocation, one result. Retry policy, if any, belongs to the caller.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::info;

use crate::environment::BuildEnvironment;
use crate::error::SyncError;
use crate::util::timestamp;

/// A single external build invocation.
#[derive(Debug, Clone)]
pub struct BuildStep {
  /// Program and arguments.
  pub command: Vec<String>,

  /// Working directory for the process.
  pub cwd: PathBuf,

  /// Private environment for this step.
  pub env: BuildEnvironment,

  /// Human-readable step description, carried into failures.
  pub description: String,

  /// Suppress terminal echo of process output.
  pub quiet: bool,

  /// Mirror output into this file, preceded by a per-session header.
  pub log_file: Option<PathBuf>,

  /// Kill the process and fail once this much time has elapsed.
  pub timeout: Duration,
}

/// Run one build step, streaming merged stdout/stderr line by line.
///
/// Each line is echoed to the terminal unless `quiet`, and appended
/// (flushed) to the log file when one is configured. Waits for exit under
/// the step's timeout; on expiry the process is killed and the step fails.
pub async fn run_step(step: &BuildStep) -> Result<(), SyncError> {
  info!(step = %step.description, "running build step");
  if !step.quiet {
    println!("→ {}", step.description);
  }

  let mut log = open_log(step)?;

  let (program, args) = step
    .command
    .split_first()
    .ok_or_else(|| io::Error::other("empty build command"))?;

  let mut child = Command::new(program)
    .args(args)
    .current_dir(&step.cwd)
    .env_clear()
    .envs(&step.env)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .map_err(|err| spawn_error(err, program))?;

  let stdout = child
    .stdout
    .take()
    .ok_or_else(|| io::Error::other("child stdout not captured"))?;
  let stderr = child
    .stderr
    .take()
    .ok_or_else(|| io::Error::other("child stderr not captured"))?;

  let (tx, mut rx) = mpsc::unbounded_channel();
  tokio::spawn(forward_lines(stdout, tx.clone()));
  tokio::spawn(forward_lines(stderr, tx));

  let drain = async {
    while let Some(line) = rx.recv().await {
      if !step.quiet {
        println!("{line}");
      }
      if let Some(log) = log.as_mut() {
        writeln!(log, "{line}")?;
        log.flush()?;
      }
    }
    child.wait().await
  };

  let status = match tokio::time::timeout(step.timeout, drain).await {
    Ok(status) => status?,
    Err(_) => {
      child.kill().await.ok();
      return Err(SyncError::Timeout {
        description: step.description.clone(),
        limit: step.timeout,
      });
    }
  };

  if !status.success() {
    return Err(SyncError::BuildFailure {
      description: step.description.clone(),
      // A signal death has no exit code; report it as -1.
      code: status.code().unwrap_or(-1),
    });
  }

  Ok(())
}

/// Open the step's log file in append mode and write the session header.
fn open_log(step: &BuildStep) -> io::Result<Option<fs::File>> {
  let Some(path) = &step.log_file else {
    return Ok(None);
  };

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  let mut file = OpenOptions::new().append(true).create(true).open(path)?;
  writeln!(file, "\n=== {} @ {} ===", step.description, timestamp())?;
  file.flush()?;
  Ok(Some(file))
}

fn spawn_error(err: io::Error, program: &str) -> SyncError {
  if err.kind() == io::ErrorKind::NotFound {
    SyncError::CommandNotFound {
      command: program.to_string(),
    }
  } else {
    SyncError::Io(err)
  }
}

/// Forward lines from one child stream into the merged channel until EOF.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
  R: AsyncRead + Unpin,
{
  let mut lines = BufReader::new(reader).lines();
  while let Ok(Some(line)) = lines.next_line().await {
    if tx.send(line).is_err() {
      break;
    }
  }
}
