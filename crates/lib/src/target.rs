//! Build target identity and run target selection.

use std::fmt;

/// One compilation configuration with its own toolchain and output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
  /// The machine the sync runs on; produces a dynamic library.
  Host,
  /// Browser-embeddable emscripten byte code.
  Wasm,
}

impl BuildTarget {
  pub fn name(self) -> &'static str {
    match self {
      BuildTarget::Host => "host",
      BuildTarget::Wasm => "wasm",
    }
  }

  /// Directory name of this target's build tree. Each target builds into an
  /// exclusive `CARGO_TARGET_DIR` so concurrent builds never contend on the
  /// same build lock.
  pub fn dir_name(self) -> &'static str {
    match self {
      BuildTarget::Host => "target-host",
      BuildTarget::Wasm => "target-wasm",
    }
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// The set of targets requested for a run, resolved once from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSet {
  pub host: bool,
  pub wasm: bool,
}

impl TargetSet {
  /// Resolve CLI flags into a target set. Selecting neither means both.
  pub fn from_flags(host: bool, wasm: bool) -> Self {
    if !host && !wasm {
      Self { host: true, wasm: true }
    } else {
      Self { host, wasm }
    }
  }

  pub fn contains(self, target: BuildTarget) -> bool {
    match target {
      BuildTarget::Host => self.host,
      BuildTarget::Wasm => self.wasm,
    }
  }

  pub fn both(self) -> bool {
    self.host && self.wasm
  }
}

impl fmt::Display for TargetSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names = Vec::new();
    if self.host {
      names.push(BuildTarget::Host.name());
    }
    if self.wasm {
      names.push(BuildTarget::Wasm.name());
    }
    write!(f, "{}", names.join(", "))
  }
}
