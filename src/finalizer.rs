//! Turns the parsed top-level chains into one [`Graph`].

use tracing::{debug, info, instrument};

use crate::build_context::BuildContext;
use crate::chain_builder;
use crate::deferred::DeferredLinker;
use crate::graph::Graph;
use crate::link_resolver::{LinkResolver, PortMatcher, PortWiring};
use crate::types::{Chain, Diagnostics, LinkOutcome, NodeId};

/// Merges `chains`, picks or synthesizes the root, then performs every pending link in order.
#[instrument(level = "trace", skip(ctx, chains))]
pub(crate) fn finalize(ctx: BuildContext<'_>, chains: Vec<Chain>) -> (Graph, Diagnostics) {
  let BuildContext {
    factory,
    options,
    mut arena,
    mut diagnostics,
    missing_types,
    ..
  } = ctx;

  let mut merged = chain_builder::merge(chains);
  if merged.elements.is_empty() {
    let placeholder = arena.insert_placeholder();
    merged.elements.push(placeholder);
  }

  let top: Vec<NodeId> = merged
    .elements
    .iter()
    .copied()
    .filter(|id| arena[*id].parent.is_none())
    .collect();
  let root = match top.as_slice() {
    [single] if !options.flags.place_in_bin => *single,
    _ => {
      let implicit = &options.implicit_container;
      let root = match factory.create_container(implicit, None) {
        Some(descriptor) => arena.insert(&descriptor, None),
        None => arena.insert_container(implicit),
      };
      for id in &top {
        arena.adopt(root, *id);
      }
      debug!(container = %arena[root].name, children = top.len(), "wrapped top level");
      root
    }
  };

  let mut wiring = PortWiring::new();
  let mut deferred = DeferredLinker::new();
  let mut unresolved = Vec::new();
  let (mut performed, mut deferred_count) = (0usize, 0usize);
  {
    let matcher = PortMatcher::new(factory, &mut arena, &mut wiring);
    let mut resolver = LinkResolver::new(matcher, &mut deferred, &mut diagnostics);
    for mut link in merged.pending_links {
      match resolver.perform(&mut link) {
        LinkOutcome::Performed => performed += 1,
        LinkOutcome::Deferred => deferred_count += 1,
        LinkOutcome::Failed => unresolved.push(link),
      }
    }
  }

  let mut root = root;
  if options.flags.no_single_element_bins
    && let [only] = arena[root].children()
  {
    let only = *only;
    arena.detach(only);
    root = only;
  }

  info!(
    root = %arena[root].name,
    performed,
    deferred = deferred_count,
    failed = unresolved.len(),
    missing = missing_types.len(),
    "finalized graph"
  );
  let graph = Graph::new(root, arena, wiring, unresolved, missing_types, deferred);
  (graph, diagnostics)
}
