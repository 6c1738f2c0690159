//! Compile a pipeline description to a [`Graph`].
//!
//! Phase 1: tokens (any [`TokenSource`]).
//! Phase 2: chains and containers, with local error recovery.
//! Phase 3: merge, root selection and linking.

use tracing::{info, instrument};

use crate::build_context::BuildContext;
use crate::error::CompileFailure;
use crate::factory::NodeFactory;
use crate::finalizer;
use crate::graph::Graph;
use crate::lexer::{Lexer, TokenSource};
use crate::options::ParseOptions;
use crate::parser::Parser;
use crate::types::{Diagnostic, ErrorKind, Severity};

/// A graph plus the diagnostics recorded while building it.
///
/// Diagnostics do not imply failure: a graph with recovered errors is still usable.
#[derive(Debug)]
pub struct Compiled {
  pub graph: Graph,
  pub diagnostics: Vec<Diagnostic>,
}

impl Compiled {
  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(|d| d.severity >= Severity::Error)
  }
}

fn failure(ctx: BuildContext<'_>) -> CompileFailure {
  CompileFailure::new(ctx.diagnostics.into_vec())
}

/// Compiles `description` with the default [`Lexer`].
pub fn compile_pipeline(
  description: &str,
  factory: &dyn NodeFactory,
  options: &ParseOptions,
) -> Result<Compiled, CompileFailure> {
  compile_with_source(&Lexer, description, factory, options)
}

/// Compiles `description` tokenized by `source`.
///
/// Returns `Err` only when no graph can be produced: empty input, an unclosed container, or any
/// error while `fatal_errors` is set.
#[instrument(level = "debug", skip(source, factory, options))]
pub fn compile_with_source(
  source: &dyn TokenSource,
  description: &str,
  factory: &dyn NodeFactory,
  options: &ParseOptions,
) -> Result<Compiled, CompileFailure> {
  let mut ctx = BuildContext::new(factory, options);
  let tokens = source.tokens(description);
  if tokens.is_empty() {
    ctx
      .diagnostics
      .fatal(ErrorKind::Syntax, "empty pipeline not allowed");
    return Err(failure(ctx));
  }

  let chains = match Parser::new(&tokens, &mut ctx).parse() {
    Ok(chains) => chains,
    Err(_) => return Err(failure(ctx)),
  };
  if options.flags.fatal_errors && ctx.diagnostics.has_errors() {
    return Err(failure(ctx));
  }

  let (graph, diagnostics) = finalizer::finalize(ctx, chains);
  if options.flags.fatal_errors && diagnostics.has_errors() {
    return Err(CompileFailure::new(diagnostics.into_vec()));
  }
  info!(
    nodes = graph.nodes().count(),
    links = graph.links().len(),
    diagnostics = diagnostics.len(),
    "compiled pipeline description"
  );
  Ok(Compiled {
    graph,
    diagnostics: diagnostics.into_vec(),
  })
}
