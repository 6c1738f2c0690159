//! Builds container nodes from `( ... )` groups.

use tracing::debug;

use crate::build_context::BuildContext;
use crate::chain_builder;
use crate::types::{Chain, ErrorKind, PropertyAssignment};

/// Turns the chains parsed inside a container into a one-element chain holding the container.
///
/// An empty interior is replaced by a placeholder. When the container type cannot be created
/// its assignments are dropped and the interior chain is returned as is, so its nodes end up
/// in the enclosing scope.
pub(crate) fn build(
  ctx: &mut BuildContext<'_>,
  type_name: Option<&str>,
  assignments: Vec<PropertyAssignment>,
  chains: Vec<Chain>,
) -> Chain {
  let type_name = type_name
    .unwrap_or(ctx.options.default_container.as_str())
    .to_string();
  let mut inner = chain_builder::merge(chains);
  if inner.elements.is_empty() {
    ctx.diagnostics.error(
      ErrorKind::EmptyContainer,
      format!("specified empty container \"{}\", not allowed", type_name),
    );
    let placeholder = ctx.arena.insert_placeholder();
    let links = std::mem::take(&mut inner.pending_links);
    inner = Chain::from_node(placeholder);
    inner.pending_links = links;
  }

  let instance = assignments
    .iter()
    .rev()
    .find(|a| a.name == "name")
    .map(|a| a.value.clone());
  let Some(descriptor) = ctx
    .factory
    .create_container(&type_name, instance.as_deref())
  else {
    ctx.missing(&type_name, format!("no container type \"{}\"", type_name));
    debug!(type_name = %type_name, nodes = inner.elements.len(), "flattening container");
    return inner;
  };

  let id = ctx.arena.insert(&descriptor, instance.as_deref());
  for element in &inner.elements {
    ctx.arena.adopt(id, *element);
  }
  for link in &mut inner.pending_links {
    link.scope.get_or_insert(id);
  }
  let node = &mut ctx.arena[id];
  for assignment in assignments {
    node.apply_property(assignment);
  }
  debug!(container = %node.name, children = node.children().len(), "built container");

  let mut chain = Chain::from_node(id);
  chain.pending_links = inner.pending_links;
  chain
}
