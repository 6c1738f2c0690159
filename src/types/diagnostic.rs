//! Structured diagnostics recorded while compiling a pipeline description.

use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

/// Category of a recorded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Malformed token sequence.
  Syntax,
  /// The node factory could not create a type.
  UnknownNodeType,
  /// `( )` with nothing inside.
  EmptyContainer,
  /// A link end names or stands for a node that does not exist.
  DanglingReference,
  /// Both ends exist but no port/format pair matches.
  LinkIncompatible,
  /// A deferred link whose source stopped announcing ports without a match.
  DeferredLinkNeverFired,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorKind::Syntax => write!(f, "syntax"),
      ErrorKind::UnknownNodeType => write!(f, "unknown_node_type"),
      ErrorKind::EmptyContainer => write!(f, "empty_container"),
      ErrorKind::DanglingReference => write!(f, "dangling_reference"),
      ErrorKind::LinkIncompatible => write!(f, "link_incompatible"),
      ErrorKind::DeferredLinkNeverFired => write!(f, "deferred_link_never_fired"),
    }
  }
}

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  /// Recovered locally; the graph is still produced.
  Error,
  /// No graph is produced.
  Fatal,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Warning => write!(f, "warning"),
      Severity::Error => write!(f, "error"),
      Severity::Fatal => write!(f, "fatal"),
    }
  }
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub kind: ErrorKind,
  pub severity: Severity,
  pub message: String,
}

impl Diagnostic {
  pub fn new(kind: ErrorKind, severity: Severity, message: impl Into<String>) -> Self {
    Self {
      kind,
      severity,
      message: message.into(),
    }
  }

  pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self::new(kind, Severity::Error, message)
  }

  pub fn warning(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self::new(kind, Severity::Warning, message)
  }

  pub fn fatal(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self::new(kind, Severity::Fatal, message)
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}]: {}", self.severity, self.kind, self.message)
  }
}

/// Ordered diagnostic collector. Every entry is also logged.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
  entries: Vec<Diagnostic>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    match diagnostic.severity {
      Severity::Fatal => error!(kind = %diagnostic.kind, "{}", diagnostic.message),
      Severity::Error | Severity::Warning => {
        warn!(kind = %diagnostic.kind, severity = %diagnostic.severity, "{}", diagnostic.message)
      }
    }
    self.entries.push(diagnostic);
  }

  pub fn error(&mut self, kind: ErrorKind, message: impl Into<String>) {
    self.push(Diagnostic::error(kind, message));
  }

  pub fn warning(&mut self, kind: ErrorKind, message: impl Into<String>) {
    self.push(Diagnostic::warning(kind, message));
  }

  pub fn fatal(&mut self, kind: ErrorKind, message: impl Into<String>) {
    self.push(Diagnostic::fatal(kind, message));
  }

  pub fn has_errors(&self) -> bool {
    self.entries.iter().any(|d| d.severity >= Severity::Error)
  }

  pub fn has_fatal(&self) -> bool {
    self.entries.iter().any(|d| d.severity == Severity::Fatal)
  }

  pub fn count(&self, kind: ErrorKind) -> usize {
    self.entries.iter().filter(|d| d.kind == kind).count()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
    self.entries.iter()
  }

  pub fn into_vec(self) -> Vec<Diagnostic> {
    self.entries
  }
}
