//! End-to-end properties of the public compile API.

use pipeline_launch::types::{NodeDescriptor, PortInfo, PortSelector};
use pipeline_launch::{
  ElementRegistry, ErrorKind, Lexer, ParseOptions, Token, TokenSource, compile_pipeline,
};
use proptest::prelude::*;

fn registry() -> ElementRegistry {
  let mut r = ElementRegistry::with_defaults();
  for name in ["a", "b", "c"] {
    r.register(
      NodeDescriptor::new(name)
        .with_port(PortInfo::input("sink"))
        .with_port(PortInfo::output("src")),
    );
  }
  r
}

fn top_level(description: &str) -> Vec<String> {
  let r = registry();
  let c = compile_pipeline(description, &r, &ParseOptions::default()).unwrap();
  c.graph
    .root()
    .children()
    .iter()
    .map(|id| c.graph.node(*id).name.clone())
    .collect()
}

#[test]
fn chain_order_is_associative() {
  let linked = top_level("a ! b ! c");
  let joined = top_level("a ! b name=b0 b0. ! c");
  assert_eq!(linked, ["a0", "b0", "c0"]);
  assert_eq!(linked, joined);
}

#[test]
fn tee_fans_out_to_every_branch() {
  let r = registry();
  let c = compile_pipeline(
    "videotestsrc ! tee name=t ! queue ! autovideosink t. ! queue ! fakesink",
    &r,
    &ParseOptions::default(),
  )
  .unwrap();
  assert!(c.diagnostics.is_empty(), "{:?}", c.diagnostics);
  assert!(c.graph.is_linked("t", "queue0"));
  assert!(c.graph.is_linked("t", "queue1"));
  assert_eq!(c.graph.links().len(), 5);
}

#[test]
fn deferred_link_fires_after_announcement() {
  let r = registry();
  let mut c = compile_pipeline(
    "filesrc location=in.raw ! decodebin name=dec ! audioconvert ! autoaudiosink",
    &r,
    &ParseOptions::default(),
  )
  .unwrap();
  assert!(c.diagnostics.is_empty(), "{:?}", c.diagnostics);
  assert!(!c.graph.is_linked("dec", "audioconvert0"));
  assert_eq!(c.graph.active_subscriptions(), 1);

  let dec = c.graph.find("dec").unwrap().id;
  c.graph.port_announcer().port_added(dec, PortInfo::output("src_0"));
  let report = c.graph.process_port_events(&r);
  assert_eq!(report.performed.len(), 1);
  assert!(c.graph.is_linked("dec", "audioconvert0"));
  assert_eq!(c.graph.active_subscriptions(), 0);
}

#[test]
fn recovered_errors_still_yield_graph() {
  let r = registry();
  let c = compile_pipeline("a ! nosuch ! b ! c ) ghost. ! c", &r, &ParseOptions::default())
    .unwrap();
  assert!(c.has_errors());
  assert!(c.diagnostics.iter().any(|d| d.kind == ErrorKind::UnknownNodeType));
  assert!(c.diagnostics.iter().any(|d| d.kind == ErrorKind::Syntax));
  assert!(c.graph.is_linked("b0", "c0"));
}

proptest! {
  #[test]
  fn port_selector_round_trips(names in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..5)) {
    let text = format!("t.{}", names.join(","));
    let tokens = Lexer.tokens(&text);
    prop_assert_eq!(tokens.len(), 1);
    let Token::Reference { name, ports } = &tokens[0].token else {
      return Err(TestCaseError::fail(format!("not a reference: {:?}", tokens[0])));
    };
    prop_assert_eq!(name.as_str(), "t");
    prop_assert_eq!(ports.names(), names.as_slice());
    prop_assert_eq!(ports.to_string(), format!(".{}", names.join(",")));
    prop_assert_eq!(ports, &PortSelector::new(names.clone()));
  }

  #[test]
  fn unnamed_chains_keep_textual_order(len in 1usize..8) {
    let types: Vec<&str> = ["a", "b", "c"].iter().cycle().take(len).copied().collect();
    let r = registry();
    let c = compile_pipeline(&types.join(" ! "), &r, &ParseOptions::default()).unwrap();
    prop_assert!(c.diagnostics.is_empty());
    prop_assert_eq!(c.graph.links().len(), len - 1);
    let seen: Vec<String> = c
      .graph
      .nodes()
      .filter(|n| !n.is_container())
      .map(|n| n.type_name.clone())
      .collect();
    prop_assert_eq!(seen, types.iter().map(|t| t.to_string()).collect::<Vec<_>>());
  }
}
