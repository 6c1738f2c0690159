//! Tests for `Diagnostic` and `Diagnostics`.

use super::{Diagnostic, Diagnostics, ErrorKind, Severity};

#[test]
fn display_includes_severity_and_kind() {
  let d = Diagnostic::error(ErrorKind::UnknownNodeType, "no element \"bar\"");
  assert_eq!(d.to_string(), "error[unknown_node_type]: no element \"bar\"");
}

#[test]
fn warnings_are_not_errors() {
  let mut diags = Diagnostics::new();
  diags.warning(ErrorKind::DeferredLinkNeverFired, "nothing linked");
  assert!(!diags.has_errors());
  assert!(!diags.has_fatal());
  assert_eq!(diags.len(), 1);
}

#[test]
fn fatal_counts_as_error() {
  let mut diags = Diagnostics::new();
  diags.fatal(ErrorKind::Syntax, "empty pipeline not allowed");
  assert!(diags.has_errors());
  assert!(diags.has_fatal());
}

#[test]
fn count_by_kind() {
  let mut diags = Diagnostics::new();
  diags.error(ErrorKind::Syntax, "a");
  diags.error(ErrorKind::Syntax, "b");
  diags.error(ErrorKind::DanglingReference, "c");
  assert_eq!(diags.count(ErrorKind::Syntax), 2);
  assert_eq!(diags.count(ErrorKind::DanglingReference), 1);
  assert_eq!(diags.count(ErrorKind::EmptyContainer), 0);
}

#[test]
fn severity_ordering() {
  assert!(Severity::Warning < Severity::Error);
  assert!(Severity::Error < Severity::Fatal);
}

#[test]
fn serializes_snake_case_kind() {
  let d = Diagnostic::warning(ErrorKind::LinkIncompatible, "x");
  let v: serde_json::Value = serde_json::to_value(&d).unwrap();
  assert_eq!(v["kind"], "link_incompatible");
  assert_eq!(v["severity"], "warning");
}
