//! State shared by every stage of one compile.

use std::collections::HashSet;

use crate::factory::NodeFactory;
use crate::options::ParseOptions;
use crate::types::{
  Diagnostics, ErrorKind, InvalidLink, LinkEnd, MissingNode, NodeArena, Reference,
};

/// Owns the node arena and the diagnostics while a description is being compiled.
pub(crate) struct BuildContext<'a> {
  pub factory: &'a dyn NodeFactory,
  pub options: &'a ParseOptions,
  pub arena: NodeArena,
  pub diagnostics: Diagnostics,
  /// Every type or URL the factory could not create, in encounter order.
  pub missing_types: Vec<String>,
  next_missing: usize,
  reported_missing: HashSet<usize>,
}

impl<'a> BuildContext<'a> {
  pub fn new(factory: &'a dyn NodeFactory, options: &'a ParseOptions) -> Self {
    Self {
      factory,
      options,
      arena: NodeArena::new(),
      diagnostics: Diagnostics::new(),
      missing_types: Vec::new(),
      next_missing: 0,
      reported_missing: HashSet::new(),
    }
  }

  /// Records a factory failure and returns the placeholder standing in for it.
  pub fn missing(&mut self, type_name: &str, message: String) -> MissingNode {
    self.diagnostics.error(ErrorKind::UnknownNodeType, message);
    self.missing_types.push(type_name.to_string());
    let serial = self.next_missing;
    self.next_missing += 1;
    MissingNode {
      serial,
      type_name: type_name.to_string(),
    }
  }

  /// Reports a link that could not be queued.
  ///
  /// An end standing for a missing node is a dangling reference, reported once per placeholder.
  /// An end with nothing at all is a syntax error.
  pub fn report_invalid_link(&mut self, invalid: InvalidLink) {
    match &invalid.missing {
      Some(missing) => {
        if self.reported_missing.insert(missing.serial) {
          let direction = match invalid.end {
            LinkEnd::Source => "to",
            LinkEnd::Sink => "from",
          };
          self.diagnostics.error(
            ErrorKind::DanglingReference,
            format!(
              "link {} \"{}\" dropped: no element \"{}\"",
              direction,
              self.describe(&invalid.other),
              missing.type_name
            ),
          );
        }
      }
      None => {
        let message = format!(
          "link has no {} [{}]",
          invalid.end,
          self.describe(&invalid.other)
        );
        self.diagnostics.error(ErrorKind::Syntax, message);
      }
    }
  }

  /// Renders a reference with node names instead of arena handles.
  pub fn describe(&self, reference: &Reference) -> String {
    match (reference.node(), &reference.name) {
      (Some(id), None) => format!("{}{}", self.arena[id].name, reference.ports),
      _ => reference.to_string(),
    }
  }
}
