//! Tests for `NodeArena` and `Node`.

use super::{
  NodeArena, NodeDescriptor, NodeKind, PortDirection, PortInfo, PortPresence, PropertyAssignment,
};

fn simple(type_name: &str) -> NodeDescriptor {
  NodeDescriptor::new(type_name)
    .with_port(PortInfo::input("sink"))
    .with_port(PortInfo::output("src"))
}

#[test]
fn auto_names_per_type() {
  let mut arena = NodeArena::new();
  let a = arena.insert(&simple("queue"), None);
  let b = arena.insert(&simple("queue"), None);
  let c = arena.insert(&simple("identity"), Some("id"));
  assert_eq!(arena[a].name, "queue0");
  assert_eq!(arena[b].name, "queue1");
  assert_eq!(arena[c].name, "id");
}

#[test]
fn named_nodes_leave_counter_alone() {
  let mut arena = NodeArena::new();
  let q = arena.insert(&simple("queue"), Some("q"));
  let a = arena.insert(&simple("queue"), None);
  assert_eq!(arena[q].name, "q");
  assert_eq!(arena[a].name, "queue0");
}

#[test]
fn insert_splits_ports_and_templates() {
  let mut arena = NodeArena::new();
  let desc = NodeDescriptor::new("decodebin")
    .with_port(PortInfo::input("sink"))
    .with_port(PortInfo::output("src_%u").with_presence(PortPresence::Sometimes));
  let id = arena.insert(&desc, None);
  assert_eq!(arena[id].ports.len(), 1);
  assert_eq!(arena[id].templates.len(), 1);
  assert!(arena[id].has_dynamic_ports());
  assert_eq!(arena[id].find_port(PortDirection::Input, "sink"), Some(0));
  assert_eq!(arena[id].find_port(PortDirection::Output, "sink"), None);
}

#[test]
fn adopt_and_detach() {
  let mut arena = NodeArena::new();
  let bin = arena.insert(&NodeDescriptor::container("bin"), None);
  let a = arena.insert(&simple("queue"), None);
  arena.adopt(bin, a);
  assert_eq!(arena[a].parent, Some(bin));
  assert!(arena[a].in_container());
  assert_eq!(arena[bin].children(), [a]);
  arena.detach(a);
  assert!(arena[a].parent.is_none());
  assert!(arena[bin].children().is_empty());
}

#[test]
fn adopt_moves_between_containers() {
  let mut arena = NodeArena::new();
  let inner = arena.insert_container("bin");
  let outer = arena.insert_container("pipeline");
  let a = arena.insert(&simple("queue"), None);
  arena.adopt(inner, a);
  arena.adopt(outer, a);
  assert!(arena[inner].children().is_empty());
  assert_eq!(arena[outer].children(), [a]);
}

#[test]
fn find_prefers_current_scope_then_walks_up() {
  let mut arena = NodeArena::new();
  let outer = arena.insert_container("bin");
  let inner = arena.insert_container("bin");
  let top_x = arena.insert(&simple("queue"), Some("x"));
  let inner_x = arena.insert(&simple("queue"), Some("x"));
  let only_outer = arena.insert(&simple("queue"), Some("y"));
  arena.adopt(outer, inner);
  arena.adopt(inner, inner_x);
  arena.adopt(outer, only_outer);

  assert_eq!(arena.find_recurse_up(Some(inner), "x"), Some(inner_x));
  assert_eq!(arena.find_recurse_up(Some(inner), "y"), Some(only_outer));
  assert_eq!(arena.find_recurse_up(None, "x"), Some(top_x));
  assert_eq!(arena.find_recurse_up(Some(inner), "nope"), None);
}

#[test]
fn descendants_are_depth_first() {
  let mut arena = NodeArena::new();
  let root = arena.insert_container("pipeline");
  let bin = arena.insert_container("bin");
  let a = arena.insert(&simple("queue"), None);
  let b = arena.insert(&simple("queue"), None);
  let c = arena.insert(&simple("queue"), None);
  arena.adopt(root, bin);
  arena.adopt(bin, a);
  arena.adopt(bin, b);
  arena.adopt(root, c);
  assert_eq!(arena.descendants(root), vec![bin, a, b, c]);
}

#[test]
fn placeholder_kind() {
  let mut arena = NodeArena::new();
  let p = arena.insert_placeholder();
  assert!(arena[p].is_placeholder());
  assert_eq!(arena[p].kind, NodeKind::Placeholder);
}

#[test]
fn apply_property_name_renames() {
  let mut arena = NodeArena::new();
  let id = arena.insert(&simple("queue"), None);
  arena[id].apply_property(PropertyAssignment::new("name", "q"));
  arena[id].apply_property(PropertyAssignment::new("max-size", "10"));
  assert_eq!(arena[id].name, "q");
  assert_eq!(arena[id].property("max-size"), Some("10"));
  assert_eq!(arena[id].properties.len(), 1);
}

#[test]
fn property_assignment_parse_unquotes() {
  let p = PropertyAssignment::parse("location=\"my file.txt\"").unwrap();
  assert_eq!(p.name, "location");
  assert_eq!(p.value, "my file.txt");
  assert!(PropertyAssignment::parse("=x").is_none());
  assert!(PropertyAssignment::parse("novalue").is_none());
}
