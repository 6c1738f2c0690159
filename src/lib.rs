//! # pipeline-launch
//!
//! Compiler for one-line pipeline descriptions such as
//! `filesrc location=in.raw ! decodebin ! audioconvert ! autoaudiosink`.
//!
//! ## Architecture
//!
//! Text flows strictly forward:
//!
//! tokens ([`lexer`]) → chains and containers (parser, chain and container builders)
//! → merge, root selection and linking (finalizer, [`link_resolver`]) → [`Graph`].
//!
//! Node types come from an injected [`NodeFactory`]; [`ElementRegistry`] is the in-memory one.
//! Links whose source can only announce ports later are kept by [`deferred`] until the runtime
//! announces them through a [`PortAnnouncer`].

mod build_context;
mod chain_builder;
pub mod compiler;
mod container_builder;
#[cfg(test)]
mod container_builder_test;
pub mod deferred;
pub mod error;
pub mod factory;
mod finalizer;
pub mod graph;
pub mod lexer;
pub mod link_resolver;
pub mod options;
mod parser;
#[cfg(test)]
mod parser_test;
pub mod registry_io;
#[cfg(test)]
mod registry_io_test;
pub mod summary;
#[cfg(test)]
mod summary_test;
pub mod types;

pub use compiler::{Compiled, compile_pipeline, compile_with_source};
pub use deferred::{PortAnnouncer, PortEvent, PortEventBus, SubscriptionToken};
pub use error::{CompileFailure, RegistryError};
pub use factory::{ElementRegistry, NodeFactory, UriDirection, UriHandler};
pub use graph::{Graph, PortEventReport};
pub use lexer::{Lexer, Token, TokenSource};
pub use options::{ParseFlags, ParseOptions};
pub use summary::GraphSummary;
pub use types::{Diagnostic, ErrorKind, LinkOutcome, Node, NodeDescriptor, NodeId, Severity};
