//! gdsync-lib: build-and-deployment synchronizer for a Godot GDExtension.
//!
//! Orchestrates two build pipelines (host dynamic library and emscripten
//! wasm), deploys the resulting binaries into the Godot project's addon
//! layout, rotates the editor log archive, and manages the editor process
//! around the build:
//! - `environment`: per-target build environments with cache wiring
//! - `runner`: single external build steps with streaming and timeouts
//! - `pipeline` / `deploy`: debug-then-release builds and artifact placement
//! - `coordinator`: the run entry point, including the background wasm task

pub mod advisory;
pub mod config;
pub mod consts;
pub mod coordinator;
pub mod deploy;
pub mod editor;
pub mod environment;
pub mod error;
pub mod logs;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod target;
pub mod util;
