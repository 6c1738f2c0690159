//! CLI: Compile a pipeline description and print the resulting graph.
//!
//! Usage: `compile_pipeline [OPTIONS] <description>...`
//! Example: compile_pipeline audiotestsrc ! audioconvert ! autoaudiosink
//!
//! Description words are joined with spaces, so the shell may split the line freely.
//! Set RUST_LOG=pipeline_launch=trace for TRACE-level span enter/exit and events.

use clap::Parser;
use pipeline_launch::registry_io::{load_registry, save_registry};
use pipeline_launch::{ElementRegistry, GraphSummary, ParseFlags, ParseOptions, compile_pipeline};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Compile a pipeline description into a graph.
#[derive(Parser, Debug)]
#[command(name = "compile_pipeline")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  LAUNCH_FATAL_ERRORS             1/0: treat every error as fatal
  LAUNCH_NO_SINGLE_ELEMENT_BINS   1/0: unwrap a root container with one child
  LAUNCH_PLACE_IN_BIN             1/0: always wrap the top level
  LAUNCH_DEFAULT_CONTAINER        container type used for bare ( ... )

Examples:
  compile_pipeline fakesrc ! fakesink
  compile_pipeline --json "tee name=t ! queue ! fakesink t. ! queue ! fakesink"
  compile_pipeline --registry nodes.json "mysrc ! mysink""#
)]
struct Args {
  /// JSON node registry merged over the built-in node types
  #[arg(long, value_name = "FILE")]
  registry: Option<PathBuf>,

  /// Write the node registry in use to FILE and continue
  #[arg(long, value_name = "FILE")]
  dump_registry: Option<PathBuf>,

  /// Any error aborts the compile
  #[arg(long)]
  fatal_errors: bool,

  /// Always wrap the top level in the implicit container
  #[arg(long)]
  place_in_bin: bool,

  /// Replace a root container holding one child by that child
  #[arg(long)]
  no_single_element_bins: bool,

  /// Print the graph summary as JSON
  #[arg(long)]
  json: bool,

  /// Pipeline description
  #[arg(value_name = "description", required = true, num_args = 1..)]
  description: Vec<String>,
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let mut registry = ElementRegistry::with_defaults();
  if let Some(path) = &args.registry {
    match load_registry(path) {
      Ok(loaded) => registry.extend(loaded),
      Err(e) => {
        eprintln!("Error loading registry {}: {}", path.display(), e);
        process::exit(1);
      }
    }
  }
  if let Some(path) = &args.dump_registry
    && let Err(e) = save_registry(path, &registry)
  {
    eprintln!("Error writing registry {}: {}", path.display(), e);
    process::exit(1);
  }

  // Env vars override flags.
  let options = ParseOptions::default()
    .with_flags(ParseFlags {
      fatal_errors: args.fatal_errors,
      no_single_element_bins: args.no_single_element_bins,
      place_in_bin: args.place_in_bin,
    })
    .from_env();
  info!(flags = ?options.flags, default_container = %options.default_container, "options (env or flags)");

  let description = args.description.join(" ");
  let compiled = match compile_pipeline(&description, &registry, &options) {
    Ok(c) => c,
    Err(e) => {
      for d in &e.diagnostics {
        eprintln!("{}", d);
      }
      eprintln!("Compile error: {}", e);
      process::exit(1);
    }
  };

  for d in &compiled.diagnostics {
    eprintln!("{}", d);
  }
  let summary = GraphSummary::from_graph(&compiled.graph);
  if args.json {
    match serde_json::to_string_pretty(&summary) {
      Ok(s) => println!("{}", s),
      Err(e) => {
        eprintln!("Error serializing summary: {}", e);
        process::exit(1);
      }
    }
  } else {
    print!("{}", summary);
  }
  if compiled.has_errors() {
    process::exit(1);
  }
}
