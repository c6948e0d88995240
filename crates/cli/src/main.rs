//! gdsync: build and sync the GDExtension binaries into the Godot project.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gdsync_lib::config::SyncConfig;
use gdsync_lib::coordinator::run_sync;
use gdsync_lib::report::{PipelineOutcome, SyncReport};
use gdsync_lib::target::TargetSet;

mod output;

use output::{OutputFormat, print_error, print_info, print_json, print_success, print_warning};

/// Build and sync the GDExtension binaries for the Godot project.
#[derive(Parser)]
#[command(name = "gdsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Build host artifacts only (combine with --wasm to build both)
  #[arg(long)]
  mac: bool,

  /// Build wasm artifacts only (combine with --mac to build both)
  #[arg(long)]
  wasm: bool,

  /// Run the wasm build in the foreground even when building both targets
  #[arg(long)]
  no_background_wasm: bool,

  /// Enable sccache/ccache when available (default)
  #[arg(long, overrides_with = "no_cache")]
  cache: bool,

  /// Disable compiler cache usage
  #[arg(long, overrides_with = "cache")]
  no_cache: bool,

  /// Do not relaunch the Godot editor after syncing binaries
  #[arg(long)]
  skip_godot_restart: bool,

  /// Fail when the emscripten toolchain is missing instead of skipping wasm
  #[arg(long)]
  require_emscripten: bool,

  /// Project root containing the rust/ crate and game/ project
  #[arg(long, default_value = ".")]
  project_root: PathBuf,

  /// Per-step timeout (e.g. "30m", "2h")
  #[arg(long, value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  /// Output format for the final summary
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  output: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt().with_env_filter(filter).without_time().init();

  let project_root = dunce::canonicalize(&cli.project_root)
    .with_context(|| format!("project root not found: {}", cli.project_root.display()))?;

  let targets = TargetSet::from_flags(cli.mac, cli.wasm);

  let mut config = SyncConfig::new(project_root);
  config.cache = cli.cache || !cli.no_cache;
  config.background_wasm = !cli.no_background_wasm;
  config.restart_editor = !cli.skip_godot_restart;
  config.require_emscripten = cli.require_emscripten;
  if let Some(timeout) = cli.timeout {
    config.step_timeout = timeout;
  }
  tracing::debug!(root = %config.project_root.display(), targets = %targets, "configuration resolved");

  if !cli.output.is_json() {
    print_banner(&config, targets);
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  match rt.block_on(run_sync(&config, targets)) {
    Ok(report) => {
      if cli.output.is_json() {
        print_json(&report)?;
      } else {
        print_summary(&report);
      }
      Ok(())
    }
    Err(err) => {
      print_error(&format!("sync failed: {err}"));
      std::process::exit(1);
    }
  }
}

fn print_banner(config: &SyncConfig, targets: TargetSet) {
  println!("======================================");
  println!("GDExtension Build & Sync");
  println!("======================================");
  println!("Project root: {}", config.project_root.display());
  println!("Rust crate:   {}", config.crate_dir().display());
  println!("Plugin dir:   {}", config.plugin_dir().display());
  println!("Targets:      {targets}");
  println!();
}

fn print_summary(report: &SyncReport) {
  println!();
  print_success("Sync complete!");

  if let Some(host) = &report.host {
    print_info(&format!("host artifacts deployed: {}", host.artifacts.len()));
  }
  if let Some(wasm) = &report.wasm {
    match wasm.outcome {
      PipelineOutcome::Completed => {
        print_info(&format!("wasm artifacts deployed: {}", wasm.artifacts.len()));
      }
      PipelineOutcome::SkippedMissingToolchain => {
        print_warning("wasm build skipped (emcc not found)");
      }
    }
  }

  print_info(&format!("total artifacts: {}", report.artifact_count()));
  print_info(&format!("duration: {:.1}s", report.duration_secs));
}
