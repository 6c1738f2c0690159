//! A processing node in the compiled graph.

use serde::Serialize;
use std::fmt;

use super::{PortDirection, PortInfo, PortPresence};

/// Arena handle of a node. Stable for the lifetime of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A `name=value` assignment queued for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAssignment {
  pub name: String,
  pub value: String,
}

impl PropertyAssignment {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: value.into(),
    }
  }

  /// Splits `name=value` at the first `=`. Surrounding quotes on the value are removed.
  pub fn parse(raw: &str) -> Option<Self> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
      return None;
    }
    Some(Self::new(name, unquote(value.trim())))
  }
}

/// Removes one level of `"` / `'` quoting and unescapes `\"`.
pub(crate) fn unquote(value: &str) -> String {
  let bytes = value.as_bytes();
  if bytes.len() >= 2
    && (bytes[0] == b'"' || bytes[0] == b'\'')
    && bytes[bytes.len() - 1] == bytes[0]
  {
    let quote = bytes[0] as char;
    value[1..value.len() - 1].replace(&format!("\\{}", quote), &quote.to_string())
  } else {
    value.to_string()
  }
}

/// What kind of vertex a node is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
  Simple,
  /// No-op stand-in keeping the structure well-formed after a recovered error.
  Placeholder,
  Container { children: Vec<NodeId> },
}

/// A named, typed unit of processing.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
  pub id: NodeId,
  pub type_name: String,
  pub name: String,
  pub kind: NodeKind,
  pub properties: Vec<PropertyAssignment>,
  /// Owning container, if any.
  pub parent: Option<NodeId>,
  /// Concrete ports.
  pub ports: Vec<PortInfo>,
  /// `Sometimes` and `Request` templates.
  pub templates: Vec<PortInfo>,
  /// Set for nodes created from a URL endpoint.
  pub uri: Option<String>,
}

impl Node {
  pub fn is_container(&self) -> bool {
    matches!(self.kind, NodeKind::Container { .. })
  }

  pub fn is_placeholder(&self) -> bool {
    matches!(self.kind, NodeKind::Placeholder)
  }

  pub fn in_container(&self) -> bool {
    self.parent.is_some()
  }

  pub fn children(&self) -> &[NodeId] {
    match &self.kind {
      NodeKind::Container { children } => children,
      _ => &[],
    }
  }

  /// Whether the node can announce more output ports after creation.
  pub fn has_dynamic_ports(&self) -> bool {
    self
      .templates
      .iter()
      .any(|t| t.direction == PortDirection::Output && t.presence == PortPresence::Sometimes)
  }

  /// Index of the concrete port called `name` in `direction`.
  pub fn find_port(&self, direction: PortDirection, name: &str) -> Option<usize> {
    self
      .ports
      .iter()
      .position(|p| p.direction == direction && p.name == name)
  }

  /// Applies an assignment: `name` renames the node, everything else is queued as a property.
  pub fn apply_property(&mut self, assignment: PropertyAssignment) {
    if assignment.name == "name" {
      self.name = assignment.value;
    } else {
      self.properties.push(assignment);
    }
  }

  pub fn property(&self, name: &str) -> Option<&str> {
    self
      .properties
      .iter()
      .rev()
      .find(|p| p.name == name)
      .map(|p| p.value.as_str())
  }
}
