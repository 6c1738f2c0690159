//! An ordered, partially-linked run of nodes produced while parsing.

use super::{InvalidLink, Link, LinkOp, MissingNode, NodeId, Reference};

/// An ordered run of nodes with two open ends.
///
/// `elements` is in textual order; `first`/`last` track the open ends across merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
  pub first: Reference,
  pub last: Reference,
  pub elements: Vec<NodeId>,
  pub pending_links: Vec<Link>,
}

impl Chain {
  /// One-element chain whose both ends are `node`.
  pub fn from_node(node: NodeId) -> Self {
    Self {
      first: Reference::bound(node),
      last: Reference::bound(node),
      elements: vec![node],
      pending_links: Vec::new(),
    }
  }

  /// Chain made only of a symbolic reference.
  pub fn from_reference(reference: Reference) -> Self {
    Self {
      first: reference.clone(),
      last: reference,
      elements: Vec::new(),
      pending_links: Vec::new(),
    }
  }

  /// Chain standing for a node that could not be created.
  pub fn from_missing(missing: MissingNode) -> Self {
    Self::from_reference(Reference::missing(missing))
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Concatenates `other` after `self` without linking them.
  ///
  /// The left chain keeps its `first`, the right chain provides `last`.
  pub fn append(&mut self, other: Chain) {
    self.elements.extend(other.elements);
    self.pending_links.extend(other.pending_links);
    self.last = other.last;
  }

  /// Links `self.last` to `other.first` with `op` and merges `other` in.
  ///
  /// The merge always happens; the link is only queued when both ends are usable.
  pub fn link(&mut self, op: LinkOp, mut other: Chain) -> Result<(), InvalidLink> {
    let source = std::mem::take(&mut self.last);
    let sink = std::mem::take(&mut other.first);
    let result = Link::new(source, sink, op).map(|link| self.pending_links.push(link));
    self.append(other);
    result
  }
}
