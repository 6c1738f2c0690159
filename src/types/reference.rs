//! Symbolic chain endpoints and port selectors.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::NodeId;

/// Error returned when a `.port,port` selector is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
  #[error("port selector must start with '.': \"{0}\"")]
  MissingDot(String),
  #[error("empty port name in selector \"{0}\"")]
  EmptyName(String),
}

/// Ordered port names attached to a chain end or reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortSelector(Vec<String>);

impl PortSelector {
  pub fn new(names: Vec<String>) -> Self {
    Self(names)
  }

  /// Parses the part after the `.`: `a,b,c`. An empty string yields an empty selector.
  pub fn from_list(list: &str) -> Result<Self, SelectorParseError> {
    if list.is_empty() {
      return Ok(Self::default());
    }
    let names: Vec<String> = list.split(',').map(|n| n.trim().to_string()).collect();
    if names.iter().any(String::is_empty) {
      return Err(SelectorParseError::EmptyName(list.to_string()));
    }
    Ok(Self(names))
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn names(&self) -> &[String] {
    &self.0
  }

  pub fn first(&self) -> Option<&str> {
    self.0.first().map(String::as_str)
  }

  pub fn extend(&mut self, other: PortSelector) {
    self.0.extend(other.0);
  }
}

impl fmt::Display for PortSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return Ok(());
    }
    write!(f, ".{}", self.0.join(","))
  }
}

impl FromStr for PortSelector {
  type Err = SelectorParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let list = s
      .strip_prefix('.')
      .ok_or_else(|| SelectorParseError::MissingDot(s.to_string()))?;
    if list.is_empty() {
      return Err(SelectorParseError::EmptyName(s.to_string()));
    }
    Self::from_list(list)
  }
}

/// Null placeholder left behind by a node type the factory could not create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNode {
  /// Distinguishes placeholders of the same type.
  pub serial: usize,
  pub type_name: String,
}

/// A chain endpoint: a concrete node, a name awaiting resolution, or nothing.
///
/// Once resolved, a reference keeps its node; [`Reference::resolve`] never replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
  pub name: Option<String>,
  pub ports: PortSelector,
  node: Option<NodeId>,
  pub missing: Option<MissingNode>,
}

impl Reference {
  pub fn named(name: impl Into<String>, ports: PortSelector) -> Self {
    Self {
      name: Some(name.into()),
      ports,
      node: None,
      missing: None,
    }
  }

  pub fn bound(node: NodeId) -> Self {
    Self {
      node: Some(node),
      ..Self::default()
    }
  }

  pub fn missing(missing: MissingNode) -> Self {
    Self {
      missing: Some(missing),
      ..Self::default()
    }
  }

  pub fn node(&self) -> Option<NodeId> {
    self.node
  }

  pub fn is_resolved(&self) -> bool {
    self.node.is_some()
  }

  /// Neither a concrete node nor a name.
  pub fn is_empty(&self) -> bool {
    self.node.is_none() && self.name.is_none()
  }

  /// Binds the reference to `node` unless it is already bound; returns the bound node.
  pub fn resolve(&mut self, node: NodeId) -> NodeId {
    *self.node.get_or_insert(node)
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (&self.name, self.node, &self.missing) {
      (Some(name), _, _) => write!(f, "{}{}", name, self.ports),
      (None, Some(node), _) => write!(f, "{}{}", node, self.ports),
      (None, None, Some(m)) => write!(f, "<missing {}>", m.type_name),
      (None, None, None) => write!(f, "<none>{}", self.ports),
    }
  }
}
