//! Data model of the pipeline description compiler.
//!
//! Nodes live in a [`NodeArena`]; chains, references and links refer to them by [`NodeId`].

mod chain;
mod diagnostic;
#[cfg(test)]
mod diagnostic_test;
mod format;
mod link;
mod node;
mod node_arena;
#[cfg(test)]
mod node_arena_test;
mod node_descriptor;
mod port;
mod reference;

pub use chain::Chain;
pub use diagnostic::{Diagnostic, Diagnostics, ErrorKind, Severity};
pub use format::{FormatDescriptor, FormatParseError, FormatStructure};
pub(crate) use format::looks_like_media_type;
pub use link::{EstablishedLink, InvalidLink, Link, LinkEnd, LinkOp, LinkOutcome};
pub use node::{Node, NodeId, NodeKind, PropertyAssignment};
pub use node_arena::{NodeArena, PLACEHOLDER_TYPE};
pub use node_descriptor::NodeDescriptor;
pub use port::{PortDirection, PortHandle, PortInfo, PortPresence};
pub use reference::{MissingNode, PortSelector, Reference, SelectorParseError};
