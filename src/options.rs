//! Compile options and their environment overrides.

use serde::{Deserialize, Serialize};

/// Overrides `fatal_errors`.
pub const ENV_FATAL_ERRORS: &str = "LAUNCH_FATAL_ERRORS";
/// Overrides `no_single_element_bins`.
pub const ENV_NO_SINGLE_ELEMENT_BINS: &str = "LAUNCH_NO_SINGLE_ELEMENT_BINS";
/// Overrides `place_in_bin`.
pub const ENV_PLACE_IN_BIN: &str = "LAUNCH_PLACE_IN_BIN";
/// Overrides `default_container`.
pub const ENV_DEFAULT_CONTAINER: &str = "LAUNCH_DEFAULT_CONTAINER";

/// Behaviour switches for a compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseFlags {
  /// Any error diagnostic aborts the compile instead of being recovered.
  pub fatal_errors: bool,
  /// A root container holding exactly one child is replaced by that child.
  pub no_single_element_bins: bool,
  /// Always wrap the top level in the implicit container.
  pub place_in_bin: bool,
}

/// Options for [`crate::compile_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
  pub flags: ParseFlags,
  /// Container type used for `( ... )` without an explicit type.
  pub default_container: String,
  /// Container type synthesized to host several top-level nodes.
  pub implicit_container: String,
}

impl Default for ParseOptions {
  fn default() -> Self {
    Self {
      flags: ParseFlags::default(),
      default_container: "bin".to_string(),
      implicit_container: "pipeline".to_string(),
    }
  }
}

/// Parses `1|true|yes|on` and `0|false|no|off`, case-insensitively.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

impl ParseOptions {
  pub fn with_flags(mut self, flags: ParseFlags) -> Self {
    self.flags = flags;
    self
  }

  /// Applies overrides found through `lookup`. Unparseable values are ignored.
  pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(v) = lookup(ENV_FATAL_ERRORS).as_deref().and_then(parse_bool) {
      self.flags.fatal_errors = v;
    }
    if let Some(v) = lookup(ENV_NO_SINGLE_ELEMENT_BINS)
      .as_deref()
      .and_then(parse_bool)
    {
      self.flags.no_single_element_bins = v;
    }
    if let Some(v) = lookup(ENV_PLACE_IN_BIN).as_deref().and_then(parse_bool) {
      self.flags.place_in_bin = v;
    }
    if let Some(v) = lookup(ENV_DEFAULT_CONTAINER).filter(|v| !v.trim().is_empty()) {
      self.default_container = v.trim().to_string();
    }
    self
  }

  /// Applies overrides from the process environment.
  pub fn from_env(self) -> Self {
    self.apply_env(|key| std::env::var(key).ok())
  }
}
