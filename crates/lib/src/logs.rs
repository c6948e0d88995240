//! Editor log rotation.
//!
//! A size-cap guard, not generational rotation: the archive accumulates
//! across runs until it crosses a line ceiling, then resets to empty before
//! the next append.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::info;

use crate::util::timestamp;

/// Archive the live editor log and truncate it for the next launch.
///
/// The archive reset and append are best-effort; the live-log truncation is
/// the one step that must succeed so the next editor session starts clean.
pub fn archive_editor_log(live: &Path, archive: &Path, line_limit: usize) -> io::Result<()> {
  reset_oversized_archive(archive, line_limit);
  append_to_archive(live, archive);

  if let Some(parent) = live.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(live, "")?;
  Ok(())
}

/// Truncate the archive once it exceeds the line ceiling. Read failures
/// leave the archive as-is.
fn reset_oversized_archive(archive: &Path, line_limit: usize) {
  let Ok(file) = File::open(archive) else {
    return;
  };

  let line_count = BufReader::new(file).lines().map_while(|line| line.ok()).count();
  if line_count > line_limit {
    info!(lines = line_count, limit = line_limit, "log archive over ceiling; resetting");
    let _ = fs::write(archive, "");
  }
}

/// Append the live log to the archive behind a timestamped separator.
fn append_to_archive(live: &Path, archive: &Path) {
  let Ok(metadata) = fs::metadata(live) else {
    return;
  };
  if metadata.len() == 0 {
    return;
  }

  let result = (|| -> io::Result<()> {
    let mut source = File::open(live)?;
    let mut dest = OpenOptions::new().append(true).create(true).open(archive)?;
    writeln!(dest, "----- Archived on {} -----", timestamp())?;
    io::copy(&mut source, &mut dest)?;
    writeln!(dest)?;
    Ok(())
  })();

  if let Err(err) = result {
    tracing::debug!(error = %err, "log archive append failed; skipping");
  }
}
