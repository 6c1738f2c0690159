//! Tests for container construction.

use crate::build_context::BuildContext;
use crate::chain_builder::{element, link, reference};
use crate::container_builder::build;
use crate::factory::ElementRegistry;
use crate::options::ParseOptions;
use crate::types::{ErrorKind, LinkOp, NodeDescriptor, PortSelector, PropertyAssignment};

fn registry() -> ElementRegistry {
  let mut r = ElementRegistry::with_defaults();
  r.register(NodeDescriptor::container("mux"));
  r
}

#[test]
fn children_are_adopted_and_assignments_apply_to_container() {
  let registry = registry();
  let options = ParseOptions::default();
  let mut ctx = BuildContext::new(&registry, &options);
  let mut inner = element(&mut ctx, "fakesrc", Vec::new());
  let sink = element(&mut ctx, "fakesink", Vec::new());
  link(&mut ctx, &mut inner, LinkOp::plain(), sink);
  let ids = inner.elements.clone();

  let chain = build(
    &mut ctx,
    Some("mux"),
    vec![
      PropertyAssignment::new("name", "m"),
      PropertyAssignment::new("latency", "5"),
    ],
    vec![inner],
  );
  assert_eq!(chain.elements.len(), 1);
  let container = &ctx.arena[chain.elements[0]];
  assert_eq!(container.name, "m");
  assert_eq!(container.property("latency"), Some("5"));
  assert_eq!(container.children(), ids.as_slice());
  for id in ids {
    assert_eq!(ctx.arena[id].parent, Some(container.id));
    assert!(ctx.arena[id].properties.is_empty());
  }
  assert_eq!(chain.pending_links.len(), 1);
  assert_eq!(chain.pending_links[0].scope, Some(container.id));
}

#[test]
fn default_type_is_used_without_explicit_type() {
  let registry = registry();
  let options = ParseOptions::default();
  let mut ctx = BuildContext::new(&registry, &options);
  let inner = element(&mut ctx, "identity", Vec::new());
  let chain = build(&mut ctx, None, Vec::new(), vec![inner]);
  assert_eq!(ctx.arena[chain.elements[0]].type_name, "bin");
}

#[test]
fn empty_container_gets_placeholder() {
  let registry = registry();
  let options = ParseOptions::default();
  let mut ctx = BuildContext::new(&registry, &options);
  let chain = build(&mut ctx, Some("mux"), Vec::new(), Vec::new());
  let container = &ctx.arena[chain.elements[0]];
  assert_eq!(container.children().len(), 1);
  assert!(ctx.arena[container.children()[0]].is_placeholder());
  assert_eq!(ctx.diagnostics.count(ErrorKind::EmptyContainer), 1);
  assert_eq!(ctx.diagnostics.len(), 1);
}

#[test]
fn missing_type_flattens_interior() {
  let registry = registry();
  let options = ParseOptions::default();
  let mut ctx = BuildContext::new(&registry, &options);
  let mut inner = element(&mut ctx, "fakesrc", Vec::new());
  let sink = element(&mut ctx, "fakesink", Vec::new());
  link(&mut ctx, &mut inner, LinkOp::plain(), sink);
  let ids = inner.elements.clone();

  let chain = build(
    &mut ctx,
    Some("missingbin"),
    vec![PropertyAssignment::new("latency", "5")],
    vec![inner],
  );
  assert_eq!(chain.elements, ids);
  assert!(ids.iter().all(|id| ctx.arena[*id].parent.is_none()));
  assert_eq!(chain.pending_links[0].scope, None);
  assert_eq!(ctx.missing_types, vec!["missingbin".to_string()]);
  assert_eq!(ctx.diagnostics.count(ErrorKind::UnknownNodeType), 1);
}

#[test]
fn nested_scopes_are_kept() {
  let registry = registry();
  let options = ParseOptions::default();
  let mut ctx = BuildContext::new(&registry, &options);
  let mut inner = element(&mut ctx, "fakesrc", Vec::new());
  let sink = element(&mut ctx, "fakesink", Vec::new());
  link(&mut ctx, &mut inner, LinkOp::plain(), sink);
  let nested = build(&mut ctx, None, Vec::new(), vec![inner]);
  let nested_id = nested.elements[0];

  let mut outer_chain = reference("x", PortSelector::default());
  let q = element(&mut ctx, "queue", Vec::new());
  link(&mut ctx, &mut outer_chain, LinkOp::plain(), q);
  let outer = build(&mut ctx, Some("mux"), Vec::new(), vec![nested, outer_chain]);
  let outer_id = outer.elements[0];

  let scopes: Vec<_> = outer.pending_links.iter().map(|l| l.scope).collect();
  assert_eq!(scopes, vec![Some(nested_id), Some(outer_id)]);
  assert_eq!(ctx.arena[nested_id].parent, Some(outer_id));
}
