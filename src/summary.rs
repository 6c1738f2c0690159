//! Serializable overview of a compiled graph, used by the CLI.

use serde::Serialize;
use std::fmt;

use crate::graph::Graph;
use crate::types::{NodeId, NodeKind, PropertyAssignment, Reference};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
  pub name: String,
  #[serde(rename = "type")]
  pub type_name: String,
  pub kind: &'static str,
  /// Nesting level below the root.
  pub depth: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub properties: Vec<PropertyAssignment>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub uri: Option<String>,
}

/// Nodes, links and leftovers of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
  pub root: String,
  pub nodes: Vec<NodeSummary>,
  /// `source.port ! sink.port`.
  pub links: Vec<String>,
  pub unresolved_links: Vec<String>,
  pub missing_types: Vec<String>,
  pub deferred_links: usize,
}

/// A link end by node name when it was bound to a node.
fn end(graph: &Graph, reference: &Reference) -> String {
  match (reference.node(), &reference.name) {
    (Some(id), None) => format!("{}{}", graph.node(id).name, reference.ports),
    _ => reference.to_string(),
  }
}

impl GraphSummary {
  pub fn from_graph(graph: &Graph) -> Self {
    let mut nodes = Vec::new();
    let mut stack: Vec<(NodeId, usize)> = vec![(graph.root_id(), 0)];
    while let Some((id, depth)) = stack.pop() {
      let node = graph.node(id);
      nodes.push(NodeSummary {
        name: node.name.clone(),
        type_name: node.type_name.clone(),
        kind: match node.kind {
          NodeKind::Simple => "simple",
          NodeKind::Placeholder => "placeholder",
          NodeKind::Container { .. } => "container",
        },
        depth,
        parent: node
          .parent
          .filter(|_| id != graph.root_id())
          .map(|p| graph.node(p).name.clone()),
        properties: node.properties.clone(),
        uri: node.uri.clone(),
      });
      stack.extend(node.children().iter().rev().map(|c| (*c, depth + 1)));
    }
    let links = graph
      .links()
      .iter()
      .map(|l| {
        format!(
          "{}.{} ! {}.{}",
          graph.node(l.source.node).name,
          l.source_port,
          graph.node(l.sink.node).name,
          l.sink_port
        )
      })
      .collect();
    Self {
      root: graph.root().name.clone(),
      nodes,
      links,
      unresolved_links: graph
        .unresolved_links()
        .iter()
        .map(|l| format!("{} ! {}", end(graph, &l.source), end(graph, &l.sink)))
        .collect(),
      missing_types: graph.missing_types().to_vec(),
      deferred_links: graph.pending_deferred(),
    }
  }
}

impl fmt::Display for GraphSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Graph root: {}", self.root)?;
    for node in &self.nodes {
      write!(
        f,
        "  {}{} ({}, {})",
        "  ".repeat(node.depth),
        node.name,
        node.type_name,
        node.kind
      )?;
      for p in &node.properties {
        write!(f, " {}={}", p.name, p.value)?;
      }
      writeln!(f)?;
    }
    writeln!(f, "Links: {}", self.links.len())?;
    for link in &self.links {
      writeln!(f, "  {}", link)?;
    }
    if self.deferred_links > 0 {
      writeln!(f, "Deferred links: {}", self.deferred_links)?;
    }
    if !self.unresolved_links.is_empty() {
      writeln!(f, "Unresolved links:")?;
      for link in &self.unresolved_links {
        writeln!(f, "  {}", link)?;
      }
    }
    if !self.missing_types.is_empty() {
      writeln!(f, "Missing types: {}", self.missing_types.join(", "))?;
    }
    Ok(())
  }
}
