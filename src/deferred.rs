//! Deferred links waiting for nodes to announce ports.
//!
//! Port announcements may come from any thread through a [`PortAnnouncer`]. They are queued on
//! a channel and applied synchronously by the graph owner, one node lock at a time.

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

use crate::link_resolver::PortMatcher;
use crate::types::{Diagnostics, EstablishedLink, ErrorKind, Link, NodeId, PortInfo};

/// Something a node reported about its ports after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEvent {
  PortAdded { node: NodeId, port: PortInfo },
  /// The node will not announce further ports.
  NoMorePorts { node: NodeId },
}

impl PortEvent {
  pub fn node(&self) -> NodeId {
    match self {
      PortEvent::PortAdded { node, .. } | PortEvent::NoMorePorts { node } => *node,
    }
  }
}

/// Sending half handed to whatever runs port discovery.
#[derive(Debug, Clone)]
pub struct PortAnnouncer {
  sender: Sender<PortEvent>,
}

impl PortAnnouncer {
  /// Queues a new port on `node`. Returns false once the graph is gone.
  pub fn port_added(&self, node: NodeId, port: PortInfo) -> bool {
    self.sender.send(PortEvent::PortAdded { node, port }).is_ok()
  }

  pub fn no_more_ports(&self, node: NodeId) -> bool {
    self.sender.send(PortEvent::NoMorePorts { node }).is_ok()
  }
}

/// Proof of a port-discovery subscription. Consumed by [`PortEventBus::unsubscribe`].
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionToken {
  id: u64,
  node: NodeId,
}

impl SubscriptionToken {
  pub fn node(&self) -> NodeId {
    self.node
  }
}

/// Port-discovery subscriptions and the queue of announced events.
#[derive(Debug)]
pub struct PortEventBus {
  sender: Sender<PortEvent>,
  receiver: Receiver<PortEvent>,
  subscriptions: Mutex<HashMap<u64, NodeId>>,
  next_id: AtomicU64,
}

impl Default for PortEventBus {
  fn default() -> Self {
    Self::new()
  }
}

impl PortEventBus {
  pub fn new() -> Self {
    let (sender, receiver) = unbounded();
    Self {
      sender,
      receiver,
      subscriptions: Mutex::new(HashMap::new()),
      next_id: AtomicU64::new(0),
    }
  }

  pub fn subscribe_port_discovered(&self, node: NodeId) -> SubscriptionToken {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    self.subscriptions.lock().insert(id, node);
    trace!(%node, id, "subscribed to port discovery");
    SubscriptionToken { id, node }
  }

  /// Releases a subscription. Returns false if it was not active.
  pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
    let removed = self.subscriptions.lock().remove(&token.id).is_some();
    trace!(node = %token.node, id = token.id, removed, "unsubscribed from port discovery");
    removed
  }

  pub fn is_subscribed(&self, node: NodeId) -> bool {
    self.subscriptions.lock().values().any(|n| *n == node)
  }

  pub fn active_subscriptions(&self) -> usize {
    self.subscriptions.lock().len()
  }

  pub fn announcer(&self) -> PortAnnouncer {
    PortAnnouncer {
      sender: self.sender.clone(),
    }
  }

  /// Takes every queued event without blocking.
  pub fn drain(&self) -> Vec<PortEvent> {
    self.receiver.try_iter().collect()
  }
}

/// A resolved link waiting for its source to announce a matching port.
#[derive(Debug, Clone)]
pub struct DeferredLink {
  pub link: Link,
  pub source: NodeId,
  pub sink: NodeId,
  /// Links made so far; only grows past one for all-ports links.
  pub established: usize,
}

impl DeferredLink {
  /// Whether `port` is one this link asked for, and the sink port paired with it.
  fn accepts<'l>(&'l self, port: &str) -> Option<Option<&'l str>> {
    let wanted = self.link.source.ports.names();
    if wanted.is_empty() {
      return Some(self.link.sink.ports.first());
    }
    let index = wanted.iter().position(|w| w == port)?;
    Some(self.link.sink.ports.names().get(index).map(String::as_str))
  }
}

/// Remaining deferred links of one announcing node.
#[derive(Debug, Default)]
struct NodeLinkState {
  pending: Vec<DeferredLink>,
  token: Option<SubscriptionToken>,
}

/// Owns every deferred link and its subscription. Dropping it releases all tokens.
#[derive(Debug, Default)]
pub struct DeferredLinker {
  bus: PortEventBus,
  nodes: HashMap<NodeId, Arc<Mutex<NodeLinkState>>>,
}

impl DeferredLinker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parks `link` until `watch` announces a port, subscribing on first use.
  pub(crate) fn defer(&mut self, watch: NodeId, link: DeferredLink) {
    let state = self.nodes.entry(watch).or_default();
    let mut state = state.lock();
    if state.token.is_none() {
      state.token = Some(self.bus.subscribe_port_discovered(watch));
    }
    debug!(node = %watch, link = %link.link, "deferred link");
    state.pending.push(link);
  }

  pub fn pending(&self) -> usize {
    self.nodes.values().map(|s| s.lock().pending.len()).sum()
  }

  pub fn active_subscriptions(&self) -> usize {
    self.bus.active_subscriptions()
  }

  pub fn announcer(&self) -> PortAnnouncer {
    self.bus.announcer()
  }

  fn release(&self, state: &mut NodeLinkState) {
    if let Some(token) = state.token.take() {
      self.bus.unsubscribe(token);
    }
  }

  /// Applies queued port events and returns the links they completed.
  pub(crate) fn process(
    &mut self,
    matcher: &mut PortMatcher<'_>,
    diagnostics: &mut Diagnostics,
  ) -> Vec<EstablishedLink> {
    let mut made = Vec::new();
    for event in self.bus.drain() {
      let node = event.node();
      let state = self.nodes.get(&node).cloned();
      match event {
        PortEvent::PortAdded { node, port } => {
          let handle = matcher.announce_port(node, port);
          let Some(state) = state else {
            continue;
          };
          let mut state = state.lock();
          if state.token.is_none() {
            continue;
          }
          let port_name = matcher.port(handle).name.clone();
          state.pending.retain_mut(|deferred| {
            let Some(sink_port) = deferred.accepts(&port_name) else {
              return true;
            };
            match matcher.link_announced(
              handle,
              deferred.sink,
              sink_port,
              deferred.link.format.as_ref(),
            ) {
              Some(link) => {
                debug!(link = %deferred.link, port = %port_name, "deferred link fired");
                deferred.established += 1;
                made.push(link);
                deferred.link.all_ports
              }
              None => true,
            }
          });
          if state.pending.is_empty() {
            self.release(&mut state);
          }
        }
        PortEvent::NoMorePorts { node } => {
          let Some(state) = state else {
            continue;
          };
          let mut state = state.lock();
          for deferred in state.pending.drain(..) {
            if deferred.established == 0 {
              diagnostics.warning(
                ErrorKind::DeferredLinkNeverFired,
                format!(
                  "deferred link {} never fired: \"{}\" announced no more ports",
                  deferred.link,
                  matcher.name(node)
                ),
              );
            }
          }
          self.release(&mut state);
        }
      }
    }
    made
  }

  /// Releases every subscription still held.
  pub fn teardown(&mut self) {
    for state in self.nodes.values() {
      let mut state = state.lock();
      state.pending.clear();
      self.release(&mut state);
    }
  }
}

impl Drop for DeferredLinker {
  fn drop(&mut self) {
    self.teardown();
  }
}
