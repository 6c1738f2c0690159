//! Node factory: turns type names and URLs into node descriptors.
//!
//! The compiler never touches a global registry; it is handed a [`NodeFactory`].
//! [`ElementRegistry`] is the in-memory implementation used by the CLI and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::types::{FormatDescriptor, NodeDescriptor, PortDirection, PortInfo, PortPresence};

/// Which end of a chain a URL stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriDirection {
  /// URL at the start of a chain: produces data.
  Source,
  /// URL at the end of a chain: consumes data.
  Sink,
}

/// Creates nodes and judges port compatibility for the compiler.
pub trait NodeFactory {
  /// Descriptor for `type_name`, or `None` if the type is unknown.
  fn create_node(&self, type_name: &str, instance_name: Option<&str>) -> Option<NodeDescriptor>;

  /// Descriptor for a container type; `None` if unknown or not a container.
  fn create_container(
    &self,
    type_name: &str,
    instance_name: Option<&str>,
  ) -> Option<NodeDescriptor> {
    self
      .create_node(type_name, instance_name)
      .filter(|d| d.container)
  }

  /// Descriptor for a node handling `uri` in `direction`.
  fn create_from_uri(
    &self,
    direction: UriDirection,
    uri: &str,
    instance_name: Option<&str>,
  ) -> Option<NodeDescriptor>;

  /// Whether `source` may feed `sink`, optionally narrowed by `constraint`.
  fn ports_compatible(
    &self,
    source: &PortInfo,
    sink: &PortInfo,
    constraint: Option<&FormatDescriptor>,
  ) -> bool {
    source.format.intersects(&sink.format)
      && constraint.is_none_or(|c| c.intersects(&source.format) && c.intersects(&sink.format))
  }
}

/// Maps a URL scheme to the node type handling it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriHandler {
  pub scheme: String,
  pub direction: UriDirection,
  pub type_name: String,
}

/// In-memory node registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryFile")]
pub struct ElementRegistry {
  #[serde(default)]
  types: Vec<NodeDescriptor>,
  #[serde(default)]
  uri_handlers: Vec<UriHandler>,
  #[serde(skip)]
  index: HashMap<String, usize>,
}

/// On-disk form of [`ElementRegistry`]; the name index is rebuilt on load.
#[derive(Deserialize)]
struct RegistryFile {
  #[serde(default)]
  types: Vec<NodeDescriptor>,
  #[serde(default)]
  uri_handlers: Vec<UriHandler>,
}

impl From<RegistryFile> for ElementRegistry {
  fn from(file: RegistryFile) -> Self {
    let mut registry = Self::default();
    for d in file.types {
      registry.register(d);
    }
    registry.uri_handlers = file.uri_handlers;
    registry
  }
}

fn raw(format: &str) -> FormatDescriptor {
  format.parse().unwrap_or_default()
}

impl ElementRegistry {
  /// Registry that knows only the `bin` and `pipeline` containers.
  pub fn new() -> Self {
    let mut registry = Self::default();
    registry.register(NodeDescriptor::container("bin"));
    registry.register(NodeDescriptor::container("pipeline"));
    registry
  }

  /// Registry with a small standard set of node types.
  pub fn with_defaults() -> Self {
    let audio = raw("audio/x-raw");
    let video = raw("video/x-raw");
    let mut r = Self::new();
    r.register(NodeDescriptor::new("fakesrc").with_port(PortInfo::output("src")));
    r.register(NodeDescriptor::new("fakesink").with_port(PortInfo::input("sink")));
    for t in ["identity", "queue"] {
      r.register(
        NodeDescriptor::new(t)
          .with_port(PortInfo::input("sink"))
          .with_port(PortInfo::output("src")),
      );
    }
    r.register(
      NodeDescriptor::new("tee")
        .with_port(PortInfo::input("sink"))
        .with_port(PortInfo::output("src_%u").with_presence(PortPresence::Request)),
    );
    r.register(
      NodeDescriptor::new("decodebin")
        .with_port(PortInfo::input("sink"))
        .with_port(PortInfo::output("src_%u").with_presence(PortPresence::Sometimes)),
    );
    r.register(
      NodeDescriptor::new("audiotestsrc")
        .with_port(PortInfo::output("src").with_format(audio.clone())),
    );
    r.register(
      NodeDescriptor::new("videotestsrc")
        .with_port(PortInfo::output("src").with_format(video.clone())),
    );
    r.register(
      NodeDescriptor::new("audioconvert")
        .with_port(PortInfo::input("sink").with_format(audio.clone()))
        .with_port(PortInfo::output("src").with_format(audio.clone())),
    );
    r.register(
      NodeDescriptor::new("videoconvert")
        .with_port(PortInfo::input("sink").with_format(video.clone()))
        .with_port(PortInfo::output("src").with_format(video.clone())),
    );
    r.register(
      NodeDescriptor::new("autoaudiosink").with_port(PortInfo::input("sink").with_format(audio)),
    );
    r.register(
      NodeDescriptor::new("autovideosink").with_port(PortInfo::input("sink").with_format(video)),
    );
    r.register(NodeDescriptor::new("filesrc").with_port(PortInfo::output("src")));
    r.register(NodeDescriptor::new("filesink").with_port(PortInfo::input("sink")));
    r.register_uri_handler(UriHandler {
      scheme: "file".to_string(),
      direction: UriDirection::Source,
      type_name: "filesrc".to_string(),
    });
    r.register_uri_handler(UriHandler {
      scheme: "file".to_string(),
      direction: UriDirection::Sink,
      type_name: "filesink".to_string(),
    });
    r
  }

  /// Adds or replaces a node type.
  pub fn register(&mut self, descriptor: NodeDescriptor) {
    match self.index.get(&descriptor.type_name) {
      Some(&i) => self.types[i] = descriptor,
      None => {
        self
          .index
          .insert(descriptor.type_name.clone(), self.types.len());
        self.types.push(descriptor);
      }
    }
  }

  pub fn register_uri_handler(&mut self, handler: UriHandler) {
    self.uri_handlers.push(handler);
  }

  pub fn descriptor(&self, type_name: &str) -> Option<&NodeDescriptor> {
    self.index.get(type_name).map(|&i| &self.types[i])
  }

  pub fn type_names(&self) -> impl Iterator<Item = &str> {
    self.types.iter().map(|d| d.type_name.as_str())
  }

  /// Merges `other` into `self`; types in `other` win.
  pub fn extend(&mut self, other: ElementRegistry) {
    for d in other.types {
      self.register(d);
    }
    self.uri_handlers.extend(other.uri_handlers);
  }
}

impl NodeFactory for ElementRegistry {
  #[instrument(level = "trace", skip(self))]
  fn create_node(&self, type_name: &str, instance_name: Option<&str>) -> Option<NodeDescriptor> {
    let found = self.descriptor(type_name).cloned();
    if found.is_none() {
      debug!(type_name, "no such node type");
    }
    found
  }

  #[instrument(level = "trace", skip(self))]
  fn create_from_uri(
    &self,
    direction: UriDirection,
    uri: &str,
    instance_name: Option<&str>,
  ) -> Option<NodeDescriptor> {
    let (scheme, _) = uri.split_once("://")?;
    self
      .uri_handlers
      .iter()
      .find(|h| h.direction == direction && h.scheme.eq_ignore_ascii_case(scheme))
      .and_then(|h| self.create_node(&h.type_name, instance_name))
      .filter(|d| {
        let wanted = match direction {
          UriDirection::Source => PortDirection::Output,
          UriDirection::Sink => PortDirection::Input,
        };
        d.ports.iter().any(|p| p.direction == wanted)
      })
  }
}
