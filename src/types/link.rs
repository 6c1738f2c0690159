//! Candidate and established connections between nodes.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::{FormatDescriptor, MissingNode, NodeId, PortHandle, Reference};

/// A parsed link operator: `!`, `!!` or `! format !`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOp {
  pub format: Option<FormatDescriptor>,
  pub all_ports: bool,
}

impl LinkOp {
  pub fn plain() -> Self {
    Self::default()
  }

  pub fn all_ports() -> Self {
    Self {
      format: None,
      all_ports: true,
    }
  }

  pub fn filtered(format: FormatDescriptor) -> Self {
    Self {
      format: Some(format),
      all_ports: false,
    }
  }
}

/// Which side of a link was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
  Source,
  Sink,
}

impl fmt::Display for LinkEnd {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LinkEnd::Source => write!(f, "source"),
      LinkEnd::Sink => write!(f, "sink"),
    }
  }
}

/// A link that would be half-empty and can never be queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("link has no {end} [{other}]")]
pub struct InvalidLink {
  pub end: LinkEnd,
  /// Placeholder standing where the endpoint should have been, if any.
  pub missing: Option<MissingNode>,
  /// The opposite endpoint.
  pub other: Reference,
}

/// A candidate connection awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  pub source: Reference,
  pub sink: Reference,
  pub format: Option<FormatDescriptor>,
  pub all_ports: bool,
  /// Container the link was written in; `None` for the top level.
  pub scope: Option<NodeId>,
}

impl Link {
  /// Builds a link, rejecting it when either end has neither a node nor a name.
  pub fn new(source: Reference, sink: Reference, op: LinkOp) -> Result<Self, InvalidLink> {
    if source.is_empty() {
      return Err(InvalidLink {
        end: LinkEnd::Source,
        missing: source.missing,
        other: sink,
      });
    }
    if sink.is_empty() {
      return Err(InvalidLink {
        end: LinkEnd::Sink,
        missing: sink.missing,
        other: source,
      });
    }
    Ok(Self {
      source,
      sink,
      format: op.format,
      all_ports: op.all_ports,
      scope: None,
    })
  }
}

impl fmt::Display for Link {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let op = match (&self.format, self.all_ports) {
      (_, true) => "!!".to_string(),
      (Some(format), false) => format!("! {} !", format),
      (None, false) => "!".to_string(),
    };
    write!(f, "{} {} {}", self.source, op, self.sink)
  }
}

/// Result of attempting a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
  Performed,
  /// Waiting for the source to announce a matching port.
  Deferred,
  Failed,
}

/// A connection made between two concrete ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstablishedLink {
  pub source: PortHandle,
  pub sink: PortHandle,
  pub source_port: String,
  pub sink_port: String,
}
