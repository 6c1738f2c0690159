//! The compiled graph handed to the runtime.

use tracing::{info, instrument};

use crate::deferred::{DeferredLinker, PortAnnouncer};
use crate::factory::NodeFactory;
use crate::link_resolver::{PortMatcher, PortWiring};
use crate::types::{Diagnostic, Diagnostics, EstablishedLink, Link, Node, NodeArena, NodeId};

/// Result of applying queued port announcements.
#[derive(Debug, Clone, Default)]
pub struct PortEventReport {
  /// Deferred links completed by the announcements.
  pub performed: Vec<EstablishedLink>,
  pub diagnostics: Vec<Diagnostic>,
}

/// A finalized pipeline graph: one root node plus everything the compile learned about it.
///
/// Only port announcements change a graph after compilation.
#[derive(Debug)]
pub struct Graph {
  root: NodeId,
  arena: NodeArena,
  wiring: PortWiring,
  unresolved_links: Vec<Link>,
  missing_types: Vec<String>,
  deferred: DeferredLinker,
}

impl Graph {
  pub(crate) fn new(
    root: NodeId,
    arena: NodeArena,
    wiring: PortWiring,
    unresolved_links: Vec<Link>,
    missing_types: Vec<String>,
    deferred: DeferredLinker,
  ) -> Self {
    Self {
      root,
      arena,
      wiring,
      unresolved_links,
      missing_types,
      deferred,
    }
  }

  pub fn root(&self) -> &Node {
    &self.arena[self.root]
  }

  pub fn root_id(&self) -> NodeId {
    self.root
  }

  pub fn node(&self, id: NodeId) -> &Node {
    &self.arena[id]
  }

  pub fn arena(&self) -> &NodeArena {
    &self.arena
  }

  /// The root and all of its descendants, depth-first.
  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    std::iter::once(self.root)
      .chain(self.arena.descendants(self.root))
      .map(|id| &self.arena[id])
  }

  /// First node called `name`, searching from the root outwards.
  pub fn find(&self, name: &str) -> Option<&Node> {
    if self.root().name == name {
      return Some(self.root());
    }
    self.arena.find_in(self.root, name).map(|id| &self.arena[id])
  }

  /// Established connections, in the order they were made.
  pub fn links(&self) -> &[EstablishedLink] {
    self.wiring.links()
  }

  /// Whether some port of `source` feeds some port of `sink`, by node name.
  pub fn is_linked(&self, source: &str, sink: &str) -> bool {
    self.links().iter().any(|l| {
      self.arena[l.source.node].name == source && self.arena[l.sink.node].name == sink
    })
  }

  /// Links dropped because an end never resolved or no ports matched.
  pub fn unresolved_links(&self) -> &[Link] {
    &self.unresolved_links
  }

  /// Every node type or URL the factory could not create.
  pub fn missing_types(&self) -> &[String] {
    &self.missing_types
  }

  /// Deferred links still waiting for a port.
  pub fn pending_deferred(&self) -> usize {
    self.deferred.pending()
  }

  /// Port-discovery subscriptions still held.
  pub fn active_subscriptions(&self) -> usize {
    self.deferred.active_subscriptions()
  }

  /// Handle the runtime uses to announce ports, from any thread.
  pub fn port_announcer(&self) -> PortAnnouncer {
    self.deferred.announcer()
  }

  /// Applies every announcement queued so far and completes the deferred links they satisfy.
  #[instrument(level = "trace", skip(self, factory))]
  pub fn process_port_events(&mut self, factory: &dyn NodeFactory) -> PortEventReport {
    let mut diagnostics = Diagnostics::new();
    let mut matcher = PortMatcher::new(factory, &mut self.arena, &mut self.wiring);
    let performed = self.deferred.process(&mut matcher, &mut diagnostics);
    if !performed.is_empty() {
      info!(
        performed = performed.len(),
        pending = self.deferred.pending(),
        "completed deferred links"
      );
    }
    PortEventReport {
      performed,
      diagnostics: diagnostics.into_vec(),
    }
  }

  /// Drops every deferred link and releases its subscription.
  pub fn teardown(&mut self) {
    self.deferred.teardown();
  }
}
