//! Tests for `summary`.

use crate::compiler::compile_pipeline;
use crate::factory::ElementRegistry;
use crate::options::ParseOptions;
use crate::summary::GraphSummary;

#[test]
fn summary_lists_nodes_with_depth_and_links() {
  let r = ElementRegistry::with_defaults();
  let c = compile_pipeline(
    "fakesrc name=s ! ( queue name=q max-size=3 ) ! fakesink name=k",
    &r,
    &ParseOptions::default(),
  )
  .unwrap();
  let summary = GraphSummary::from_graph(&c.graph);
  assert_eq!(summary.root, "pipeline0");
  let nodes: Vec<_> = summary
    .nodes
    .iter()
    .map(|n| (n.name.as_str(), n.depth, n.parent.as_deref()))
    .collect();
  assert_eq!(
    nodes,
    [
      ("pipeline0", 0, None),
      ("s", 1, Some("pipeline0")),
      ("bin0", 1, Some("pipeline0")),
      ("q", 2, Some("bin0")),
      ("k", 1, Some("pipeline0")),
    ]
  );
  assert_eq!(summary.links, ["s.src ! q.sink", "q.src ! k.sink"]);

  let text = summary.to_string();
  assert!(text.starts_with("Graph root: pipeline0\n"), "{}", text);
  assert!(text.contains("q (queue, simple) max-size=3"), "{}", text);
  assert!(text.contains("Links: 2"), "{}", text);
}

#[test]
fn summary_reports_leftovers() {
  let r = ElementRegistry::with_defaults();
  let c = compile_pipeline(
    "decodebin ! fakesink fakesrc ! nosuch",
    &r,
    &ParseOptions::default(),
  )
  .unwrap();
  let summary = GraphSummary::from_graph(&c.graph);
  assert_eq!(summary.deferred_links, 1);
  assert_eq!(summary.missing_types, ["nosuch".to_string()]);

  let json = serde_json::to_value(&summary).unwrap();
  assert_eq!(json["nodes"][1]["type"], "decodebin");
  assert_eq!(json["deferred_links"], 1);
  let text = summary.to_string();
  assert!(text.contains("Deferred links: 1"), "{}", text);
  assert!(text.contains("Missing types: nosuch"), "{}", text);
}
