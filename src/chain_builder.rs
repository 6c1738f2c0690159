//! Builds chains out of elements, URL endpoints and references.
//!
//! Creation failures never abort a chain: the failed end becomes a [`MissingNode`]
//! placeholder and links touching it are dropped with a single diagnostic.
//!
//! [`MissingNode`]: crate::types::MissingNode

use tracing::{instrument, trace};

use crate::build_context::BuildContext;
use crate::factory::UriDirection;
use crate::types::{Chain, ErrorKind, LinkOp, PortSelector, PropertyAssignment, Reference};

fn instance_name(assignments: &[PropertyAssignment]) -> Option<String> {
  assignments
    .iter()
    .rev()
    .find(|a| a.name == "name")
    .map(|a| a.value.clone())
}

/// One-element chain for `type_name` configured by `assignments`.
#[instrument(level = "trace", skip(ctx, assignments))]
pub(crate) fn element(
  ctx: &mut BuildContext<'_>,
  type_name: &str,
  assignments: Vec<PropertyAssignment>,
) -> Chain {
  let instance = instance_name(&assignments);
  let Some(descriptor) = ctx.factory.create_node(type_name, instance.as_deref()) else {
    let missing = ctx.missing(type_name, format!("no element \"{}\"", type_name));
    return Chain::from_missing(missing);
  };
  let id = ctx.arena.insert(&descriptor, instance.as_deref());
  let node = &mut ctx.arena[id];
  for assignment in assignments {
    node.apply_property(assignment);
  }
  trace!(node = %node.name, type_name = %node.type_name, "created element");
  Chain::from_node(id)
}

/// One-element chain for a URL at the start (`Source`) or end (`Sink`) of a chain.
#[instrument(level = "trace", skip(ctx, assignments))]
pub(crate) fn url_endpoint(
  ctx: &mut BuildContext<'_>,
  uri: &str,
  direction: UriDirection,
  assignments: Vec<PropertyAssignment>,
) -> Chain {
  let instance = instance_name(&assignments);
  let Some(descriptor) = ctx
    .factory
    .create_from_uri(direction, uri, instance.as_deref())
  else {
    let role = match direction {
      UriDirection::Source => "source",
      UriDirection::Sink => "sink",
    };
    let missing = ctx.missing(uri, format!("no {} element for URI \"{}\"", role, uri));
    return Chain::from_missing(missing);
  };
  let id = ctx.arena.insert(&descriptor, instance.as_deref());
  let node = &mut ctx.arena[id];
  node.uri = Some(uri.to_string());
  for assignment in assignments {
    node.apply_property(assignment);
  }
  Chain::from_node(id)
}

/// Chain made of a symbolic `name.ports` reference.
pub(crate) fn reference(name: &str, ports: PortSelector) -> Chain {
  Chain::from_reference(Reference::named(name, ports))
}

/// Links `chain` to `next` with `op`, reporting a link that cannot be queued.
pub(crate) fn link(ctx: &mut BuildContext<'_>, chain: &mut Chain, op: LinkOp, next: Chain) {
  if let Err(invalid) = chain.link(op, next) {
    ctx.report_invalid_link(invalid);
  }
}

/// Concatenates chains left to right without linking them.
pub(crate) fn merge(chains: Vec<Chain>) -> Chain {
  let mut iter = chains.into_iter();
  let Some(mut merged) = iter.next() else {
    return Chain::default();
  };
  for chain in iter {
    merged.append(chain);
  }
  merged
}

/// A reference that no link consumed.
pub(crate) fn unexpected_reference(ctx: &mut BuildContext<'_>, reference: &Reference) {
  ctx.diagnostics.error(
    ErrorKind::Syntax,
    format!("unexpected reference \"{}\" - ignoring", reference),
  );
}

/// Port names that no link consumed.
pub(crate) fn unexpected_ports(ctx: &mut BuildContext<'_>, ports: &PortSelector) {
  ctx.diagnostics.error(
    ErrorKind::Syntax,
    format!("unexpected pad-reference \"{}\" - ignoring", ports),
  );
}
