//! Ports: typed input/output attachment points on a node.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FormatDescriptor, NodeId};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
  /// Receives data (sink side of a link).
  Input,
  /// Produces data (source side of a link).
  Output,
}

impl fmt::Display for PortDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PortDirection::Input => write!(f, "input"),
      PortDirection::Output => write!(f, "output"),
    }
  }
}

/// When a port exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortPresence {
  /// Exists as soon as the node is created.
  #[default]
  Always,
  /// Announced later, asynchronously (dynamic-port capability).
  Sometimes,
  /// Instantiated on demand while linking; the name is a `%u` template.
  Request,
}

/// A port or port template declared by a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
  pub name: String,
  pub direction: PortDirection,
  #[serde(default)]
  pub presence: PortPresence,
  #[serde(default)]
  pub format: FormatDescriptor,
}

impl PortInfo {
  pub fn new(name: impl Into<String>, direction: PortDirection) -> Self {
    Self {
      name: name.into(),
      direction,
      presence: PortPresence::Always,
      format: FormatDescriptor::Any,
    }
  }

  pub fn input(name: impl Into<String>) -> Self {
    Self::new(name, PortDirection::Input)
  }

  pub fn output(name: impl Into<String>) -> Self {
    Self::new(name, PortDirection::Output)
  }

  pub fn with_presence(mut self, presence: PortPresence) -> Self {
    self.presence = presence;
    self
  }

  pub fn with_format(mut self, format: FormatDescriptor) -> Self {
    self.format = format;
    self
  }

  /// Whether `name` is an instance of this template (`src_%u` matches `src_3`).
  pub fn template_matches(&self, name: &str) -> bool {
    match self.name.split_once("%u") {
      Some((prefix, suffix)) => name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
      None => self.name == name,
    }
  }

  /// Concrete name for the `index`-th instance of this template.
  pub fn instance_name(&self, index: usize) -> String {
    self.name.replacen("%u", &index.to_string(), 1)
  }
}

/// Stable address of a concrete port: node plus index into its port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PortHandle {
  pub node: NodeId,
  pub port: usize,
}
