//! What a node factory returns for a type it knows.

use serde::{Deserialize, Serialize};

use super::{PortInfo, PortPresence};

/// Description of a node type: its ports, templates and whether it is a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
  pub type_name: String,
  #[serde(default)]
  pub container: bool,
  #[serde(default)]
  pub ports: Vec<PortInfo>,
}

impl NodeDescriptor {
  pub fn new(type_name: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      container: false,
      ports: Vec::new(),
    }
  }

  pub fn container(type_name: impl Into<String>) -> Self {
    Self {
      container: true,
      ..Self::new(type_name)
    }
  }

  pub fn with_port(mut self, port: PortInfo) -> Self {
    self.ports.push(port);
    self
  }

  /// Ports present at creation.
  pub fn always_ports(&self) -> impl Iterator<Item = &PortInfo> {
    self
      .ports
      .iter()
      .filter(|p| p.presence == PortPresence::Always)
  }

  /// `Sometimes` and `Request` templates.
  pub fn templates(&self) -> impl Iterator<Item = &PortInfo> {
    self
      .ports
      .iter()
      .filter(|p| p.presence != PortPresence::Always)
  }
}
