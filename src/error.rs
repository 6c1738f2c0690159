//! Error types surfaced to callers.
//!
//! Recoverable problems are [`Diagnostic`]s, not errors; only a compile that produces
//! no graph at all returns [`CompileFailure`].

use thiserror::Error;

use crate::types::{Diagnostic, Severity};

/// A compile that produced no graph. Carries every diagnostic recorded on the way.
#[derive(Debug, Clone, Error)]
#[error("failed to compile pipeline description: {summary}")]
pub struct CompileFailure {
  summary: String,
  pub diagnostics: Vec<Diagnostic>,
}

impl CompileFailure {
  pub(crate) fn new(diagnostics: Vec<Diagnostic>) -> Self {
    let summary = diagnostics
      .iter()
      .max_by_key(|d| d.severity)
      .map(|d| d.message.clone())
      .unwrap_or_else(|| "unknown error".to_string());
    Self {
      summary,
      diagnostics,
    }
  }

  /// Diagnostics of fatal severity.
  pub fn fatal(&self) -> impl Iterator<Item = &Diagnostic> {
    self
      .diagnostics
      .iter()
      .filter(|d| d.severity == Severity::Fatal)
  }
}

/// Failure loading or saving a node registry file.
#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("registry I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("invalid registry JSON: {0}")]
  Json(#[from] serde_json::Error),
}
