//! Fixed names and limits for the sync layout.

use std::time::Duration;

/// Tool name, used in log output.
pub const APP_NAME: &str = "gdsync";

/// Subdirectory of the project root holding the extension crate.
pub const CRATE_DIR: &str = "rust";

/// Subdirectory of the project root holding the Godot project.
pub const GAME_DIR: &str = "game";

/// Godot addons directory inside the game project.
pub const ADDONS_DIR: &str = "addons";

/// Default extension name; drives the plugin directory and artifact names.
pub const DEFAULT_EXTENSION: &str = "game";

/// Cargo target triple for the browser build.
pub const WASM_TRIPLE: &str = "wasm32-unknown-emscripten";

/// Compiler whose presence gates the wasm pipeline.
pub const EMSCRIPTEN_COMPILER: &str = "emcc";

/// Compiler caches probed in priority order; the first found wins.
pub const CACHE_TOOLS: &[&str] = &["sccache", "ccache"];

/// Environment variable carrying the compiler-cache wrapper.
pub const RUSTC_WRAPPER_VAR: &str = "RUSTC_WRAPPER";

/// Environment variable carrying a target's exclusive build tree.
pub const CARGO_TARGET_DIR_VAR: &str = "CARGO_TARGET_DIR";

/// Process name the editor runs under, for termination.
pub const EDITOR_PROCESS: &str = "Godot";

/// Editor launcher binary looked up on PATH.
pub const EDITOR_LAUNCHER: &str = "godot";

/// Line ceiling after which the editor log archive resets to empty.
pub const ARCHIVE_LINE_LIMIT: usize = 100_000;

/// Default per-step timeout.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(3600);

/// Profile overlay for the wasm debug build. Unmodified dev output for the
/// emscripten target is too large and too slow to link per iteration.
pub const WASM_DEV_PROFILE: &[(&str, &str)] = &[
  ("CARGO_PROFILE_DEV_DEBUG", "false"),
  ("CARGO_PROFILE_DEV_OPT_LEVEL", "s"),
  ("CARGO_PROFILE_DEV_STRIP", "debuginfo"),
  ("CARGO_PROFILE_DEV_PANIC", "abort"),
  ("CARGO_PROFILE_DEV_LTO", "thin"),
  ("CARGO_PROFILE_DEV_CODEGEN_UNITS", "1"),
  ("CARGO_PROFILE_DEV_INCREMENTAL", "false"),
];

/// Candidate profile directories for the wasm debug artifact. Toolchains
/// disagree on what the unoptimized profile directory is called.
pub const WASM_DEBUG_PROFILE_DIRS: &[&str] = &["dev-wasm", "debug"];
