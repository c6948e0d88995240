//! End-to-end sync runs against a temporary project with a stubbed
//! toolchain on PATH.
//!
//! Each test gets its own project tree and a stub-bin directory that acts
//! as the entire PATH of the spawned gdsync process, so no real cargo,
//! emscripten, pkill, or Godot is ever invoked.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

struct TestProject {
  temp: TempDir,
}

impl TestProject {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("rust")).unwrap();
    fs::create_dir_all(temp.path().join("game")).unwrap();
    fs::create_dir_all(temp.path().join("stub-bin")).unwrap();
    Self { temp }
  }

  fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Directory of stub executables; becomes the whole PATH.
  fn stub_bin(&self) -> PathBuf {
    self.root().join("stub-bin")
  }

  fn write_stub(&self, name: &str, script: &str) {
    let path = self.stub_bin().join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
  }

  fn seed_host_artifact(&self, content: &str) {
    let lib = self.root().join("rust/target-host/debug/libgame.so");
    fs::create_dir_all(lib.parent().unwrap()).unwrap();
    fs::write(&lib, content).unwrap();
  }

  fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("gdsync");
    cmd
      .arg("--project-root")
      .arg(self.root())
      .arg("--skip-godot-restart")
      .arg("--no-cache")
      .env("PATH", self.stub_bin())
      // Keep ~/.cargo out of the resolved environment.
      .env_remove("HOME")
      .env_remove("RUST_LOG");
    cmd
  }
}

#[test]
fn host_only_run_succeeds_with_stub_cargo() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");

  project
    .cmd()
    .arg("--mac")
    .assert()
    .success()
    .stdout(predicate::str::contains("Sync complete"));

  // Plugin layout is created even when there are no artifacts to copy.
  assert!(project.root().join("game/addons/game/bin/debug").is_dir());
  assert!(project.root().join("game/addons/game/bin/release").is_dir());
}

#[test]
fn failing_host_build_exits_nonzero() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 7");

  project
    .cmd()
    .arg("--mac")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("exit code 7"));
}

#[test]
fn host_artifacts_are_deployed() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");
  project.seed_host_artifact("fake-lib");

  project.cmd().arg("--mac").assert().success();

  let deployed = project.root().join("game/addons/game/bin/debug/libgame.so");
  assert_eq!(fs::read_to_string(deployed).unwrap(), "fake-lib");
}

#[test]
fn missing_emscripten_skips_wasm_but_run_succeeds() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");

  project
    .cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Sync complete"))
    .stderr(predicate::str::contains("wasm build skipped"));
}

#[test]
fn missing_emscripten_is_fatal_when_required() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");

  project
    .cmd()
    .arg("--require-emscripten")
    .arg("--no-background-wasm")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("command not found: emcc"));
}

#[test]
fn background_wasm_failure_fails_the_run_after_host_deploys() {
  let project = TestProject::new();
  project.write_stub("cargo", "if [ \"$1\" = \"+nightly\" ]; then exit 9; fi\nexit 0");
  project.write_stub("emcc", "exit 0");
  project.seed_host_artifact("fake-lib");

  project
    .cmd()
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("background wasm build failed"));

  // Partial success is observable: host artifacts landed before the join.
  assert!(project.root().join("game/addons/game/bin/debug/libgame.so").exists());
}

#[test]
fn background_wasm_output_stays_out_of_the_terminal() {
  let project = TestProject::new();
  project.write_stub("cargo", "echo \"cargo-run $@\"\nexit 0");
  project.write_stub("emcc", "exit 0");

  project
    .cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("cargo-run build"))
    .stdout(predicate::str::contains("+nightly").not());

  // The wasm output went to its own log instead.
  let wasm_log = fs::read_to_string(project.root().join("rust/logs/wasm_build.log")).unwrap();
  assert!(wasm_log.contains("+nightly"));
}

#[test]
fn foreground_wasm_output_is_visible() {
  let project = TestProject::new();
  project.write_stub("cargo", "echo \"cargo-run $@\"\nexit 0");
  project.write_stub("emcc", "exit 0");

  project
    .cmd()
    .arg("--no-background-wasm")
    .assert()
    .success()
    .stdout(predicate::str::contains("+nightly"));
}

#[test]
fn json_output_reports_both_targets() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");
  project.seed_host_artifact("fake-lib");

  let assert = project.cmd().arg("-o").arg("json").assert().success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

  // Build-step echo precedes the JSON document; parse from the first brace.
  let json_start = stdout.find('{').unwrap();
  let report: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();
  assert_eq!(report["host"]["outcome"], "completed");
  assert_eq!(report["wasm"]["outcome"], "skipped_missing_toolchain");
  assert_eq!(report["host"]["artifacts"][0], "debug/libgame.so");
}

#[test]
fn editor_relaunch_writes_to_the_live_log() {
  let project = TestProject::new();
  project.write_stub("cargo", "exit 0");
  project.write_stub("godot", "echo editor-started\nexit 0");

  let mut cmd = cargo_bin_cmd!("gdsync");
  cmd
    .arg("--project-root")
    .arg(project.root())
    .arg("--mac")
    .arg("--no-cache")
    .env("PATH", project.stub_bin())
    .env_remove("HOME")
    .env_remove("RUST_LOG")
    .assert()
    .success();

  assert!(project.root().join("rust/logs/editor.log").exists());
}
