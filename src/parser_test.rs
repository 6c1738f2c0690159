//! Tests for the recursive-descent parser.

use crate::build_context::BuildContext;
use crate::factory::ElementRegistry;
use crate::lexer::{Lexer, TokenSource};
use crate::options::ParseOptions;
use crate::parser::{Parser, Unrecoverable};
use crate::types::{Chain, ErrorKind, NodeDescriptor, Severity};

fn registry() -> ElementRegistry {
  let mut r = ElementRegistry::with_defaults();
  r.register(NodeDescriptor::container("mux"));
  r
}

fn parse(ctx: &mut BuildContext<'_>, text: &str) -> Result<Vec<Chain>, Unrecoverable> {
  let tokens = Lexer.tokens(text);
  Parser::new(&tokens, ctx).parse()
}

fn names(ctx: &BuildContext<'_>, chain: &Chain) -> Vec<String> {
  chain
    .elements
    .iter()
    .map(|id| ctx.arena[*id].name.clone())
    .collect()
}

#[test]
fn chain_elements_in_textual_order() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc name=a ! identity name=b ! fakesink name=c").unwrap();
  assert_eq!(chains.len(), 1);
  assert_eq!(names(&ctx, &chains[0]), ["a", "b", "c"]);
  assert_eq!(chains[0].pending_links.len(), 2);
  assert!(ctx.diagnostics.is_empty());
}

#[test]
fn separate_chains_without_link() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc ! fakesink fakesrc ! fakesink").unwrap();
  assert_eq!(chains.len(), 2);
}

#[test]
fn references_link_across_chains() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "tee name=t ! queue ! fakesink t. ! queue ! fakesink").unwrap();
  assert_eq!(chains.len(), 2);
  let link = &chains[1].pending_links[0];
  assert_eq!(link.source.name.as_deref(), Some("t"));
  assert!(ctx.diagnostics.is_empty());
}

#[test]
fn pads_attach_to_link_ends() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "tee name=t .src_0 ! .sink queue").unwrap();
  let link = &chains[0].pending_links[0];
  assert_eq!(link.source.ports.to_string(), ".src_0");
  assert_eq!(link.sink.ports.to_string(), ".sink");
}

#[test]
fn lone_reference_is_ignored_with_syntax_error() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc t.").unwrap();
  assert_eq!(chains.len(), 1);
  assert_eq!(ctx.diagnostics.count(ErrorKind::Syntax), 1);
  assert!(
    ctx
      .diagnostics
      .iter()
      .any(|d| d.message.contains("unexpected reference \"t\""))
  );
}

#[test]
fn trailing_pads_are_discarded() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc ! identity .src").unwrap();
  assert_eq!(chains[0].elements.len(), 2);
  assert!(chains[0].last.ports.is_empty());
  assert!(
    ctx
      .diagnostics
      .iter()
      .any(|d| d.message.contains("unexpected pad-reference \".src\""))
  );
}

#[test]
fn trailing_pads_after_reference_are_reported() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "tee name=t ! fakesink fakesrc ! t.sink .extra").unwrap();
  assert_eq!(chains.len(), 2);
  let link = &chains[1].pending_links[0];
  assert_eq!(link.sink.ports.to_string(), ".sink");
  assert!(chains[1].last.ports.is_empty());
  assert_eq!(ctx.diagnostics.count(ErrorKind::Syntax), 1);
  assert!(
    ctx
      .diagnostics
      .iter()
      .any(|d| d.message.contains("unexpected pad-reference \".extra\""))
  );
}

#[test]
fn recovers_after_invalid_token() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc ! 9/? fakesrc ! fakesink").unwrap();
  assert_eq!(chains.len(), 2);
  assert_eq!(chains[1].pending_links.len(), 1);
  assert_eq!(ctx.diagnostics.count(ErrorKind::Syntax), 1);
}

#[test]
fn leading_link_has_no_source() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "! fakesink").unwrap();
  assert_eq!(chains[0].elements.len(), 1);
  assert!(chains[0].pending_links.is_empty());
  let d = ctx.diagnostics.iter().next().unwrap();
  assert_eq!(d.kind, ErrorKind::Syntax);
  assert!(d.message.contains("no source"), "{}", d.message);
}

#[test]
fn containers_nest() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "mux.( name=m bin.( fakesrc ) ! fakesink )").unwrap();
  assert_eq!(chains.len(), 1);
  let m = chains[0].elements[0];
  assert_eq!(ctx.arena[m].name, "m");
  let children = ctx.arena[m].children().to_vec();
  assert_eq!(children.len(), 2);
  assert!(ctx.arena[children[0]].is_container());
  assert_eq!(ctx.arena.descendants(m).len(), 3);
}

#[test]
fn stray_close_is_recoverable() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "fakesrc ) ! fakesink").unwrap();
  assert!(!chains.is_empty());
  assert!(!ctx.diagnostics.has_fatal());
  assert!(ctx.diagnostics.count(ErrorKind::Syntax) >= 1);
}

#[test]
fn unclosed_container_is_fatal() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  assert_eq!(parse(&mut ctx, "( fakesrc ! fakesink"), Err(Unrecoverable));
  assert!(
    ctx
      .diagnostics
      .iter()
      .any(|d| d.severity == Severity::Fatal)
  );
}

#[test]
fn urls_take_their_role_from_position() {
  let r = registry();
  let o = ParseOptions::default();
  let mut ctx = BuildContext::new(&r, &o);
  let chains = parse(&mut ctx, "file:///a ! identity ! file:///b").unwrap();
  let types: Vec<_> = chains[0]
    .elements
    .iter()
    .map(|id| ctx.arena[*id].type_name.clone())
    .collect();
  assert_eq!(types, ["filesrc", "identity", "filesink"]);
}
