//! Arena owning every node created during a compile.
//!
//! Nodes are addressed by [`NodeId`]; chains, links and containers move ids around,
//! never node payloads.

use std::collections::{HashMap, VecDeque};
use std::ops::{Index, IndexMut};

use super::{Node, NodeDescriptor, NodeId, NodeKind};

/// Type name given to placeholder nodes.
pub const PLACEHOLDER_TYPE: &str = "placeholder";

/// Owns all nodes and the container hierarchy between them.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
  nodes: Vec<Node>,
  /// Per-type counters for automatic instance names.
  name_counters: HashMap<String, usize>,
}

impl NodeArena {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn get(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(id.0)
  }

  pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
    self.nodes.get_mut(id.0)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Node> {
    self.nodes.iter()
  }

  fn auto_name(&mut self, type_name: &str) -> String {
    let counter = self.name_counters.entry(type_name.to_string()).or_insert(0);
    let name = format!("{}{}", type_name, counter);
    *counter += 1;
    name
  }

  fn push(&mut self, type_name: &str, name: Option<&str>, kind: NodeKind) -> NodeId {
    let id = NodeId(self.nodes.len());
    let name = match name {
      Some(n) => n.to_string(),
      None => self.auto_name(type_name),
    };
    self.nodes.push(Node {
      id,
      type_name: type_name.to_string(),
      name,
      kind,
      properties: Vec::new(),
      parent: None,
      ports: Vec::new(),
      templates: Vec::new(),
      uri: None,
    });
    id
  }

  /// Creates a node from a factory descriptor.
  pub fn insert(&mut self, descriptor: &NodeDescriptor, name: Option<&str>) -> NodeId {
    let kind = if descriptor.container {
      NodeKind::Container {
        children: Vec::new(),
      }
    } else {
      NodeKind::Simple
    };
    let id = self.push(&descriptor.type_name, name, kind);
    let node = &mut self.nodes[id.0];
    node.ports = descriptor.always_ports().cloned().collect();
    node.templates = descriptor.templates().cloned().collect();
    id
  }

  /// Creates an empty built-in container that no factory was asked for.
  pub fn insert_container(&mut self, type_name: &str) -> NodeId {
    self.push(
      type_name,
      None,
      NodeKind::Container {
        children: Vec::new(),
      },
    )
  }

  /// Creates a no-op placeholder node.
  pub fn insert_placeholder(&mut self) -> NodeId {
    self.push(PLACEHOLDER_TYPE, None, NodeKind::Placeholder)
  }

  /// Moves `child` into `parent`'s children, detaching it from any previous parent.
  pub fn adopt(&mut self, parent: NodeId, child: NodeId) {
    self.detach(child);
    if let NodeKind::Container { children } = &mut self.nodes[parent.0].kind {
      children.push(child);
      self.nodes[child.0].parent = Some(parent);
    }
  }

  /// Removes `child` from its container, if it has one.
  pub fn detach(&mut self, child: NodeId) {
    if let Some(old) = self.nodes[child.0].parent.take()
      && let NodeKind::Container { children } = &mut self.nodes[old.0].kind
    {
      children.retain(|c| *c != child);
    }
  }

  /// All nodes below `id`, depth-first in child order.
  pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = self[id].children().iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
      out.push(next);
      stack.extend(self[next].children().iter().rev().copied());
    }
    out
  }

  fn breadth_first(&self, start: impl IntoIterator<Item = NodeId>, name: &str) -> Option<NodeId> {
    let mut queue: VecDeque<NodeId> = start.into_iter().collect();
    while let Some(id) = queue.pop_front() {
      let node = &self[id];
      if node.name == name {
        return Some(id);
      }
      queue.extend(node.children().iter().copied());
    }
    None
  }

  /// Looks `name` up below `container`, shallowest match first.
  pub fn find_in(&self, container: NodeId, name: &str) -> Option<NodeId> {
    self.breadth_first(self[container].children().iter().copied(), name)
  }

  /// Looks `name` up among nodes outside any container and their descendants.
  pub fn find_top_level(&self, name: &str) -> Option<NodeId> {
    self.breadth_first(
      self.nodes.iter().filter(|n| n.parent.is_none()).map(|n| n.id),
      name,
    )
  }

  /// Looks `name` up in `scope`, then in each enclosing container, then at the top level.
  pub fn find_recurse_up(&self, scope: Option<NodeId>, name: &str) -> Option<NodeId> {
    let mut current = scope;
    while let Some(container) = current {
      if let Some(found) = self.find_in(container, name) {
        return Some(found);
      }
      current = self[container].parent;
    }
    self.find_top_level(name)
  }
}

impl Index<NodeId> for NodeArena {
  type Output = Node;

  fn index(&self, id: NodeId) -> &Node {
    &self.nodes[id.0]
  }
}

impl IndexMut<NodeId> for NodeArena {
  fn index_mut(&mut self, id: NodeId) -> &mut Node {
    &mut self.nodes[id.0]
  }
}
