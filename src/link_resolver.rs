//! Resolving link ends to nodes and connecting their ports.
//!
//! A link is either performed immediately, parked as a deferred link when its source can still
//! announce ports, or dropped with a diagnostic explaining which side could not cooperate.

use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::deferred::{DeferredLink, DeferredLinker};
use crate::factory::NodeFactory;
use crate::types::{
  Diagnostics, ErrorKind, EstablishedLink, FormatDescriptor, Link, LinkOutcome, NodeArena, NodeId,
  PortDirection, PortHandle, PortInfo, PortPresence, Reference,
};

/// Resolves `reference` by name, looking in `scope` first and then in its ancestors.
///
/// A reference that is already bound keeps its node.
pub fn resolve_reference(
  arena: &NodeArena,
  scope: Option<NodeId>,
  reference: &mut Reference,
) -> Option<NodeId> {
  if let Some(node) = reference.node() {
    return Some(node);
  }
  let name = reference.name.as_deref()?;
  let found = arena.find_recurse_up(scope, name)?;
  Some(reference.resolve(found))
}

/// Connections made so far and the ports they occupy.
#[derive(Debug, Clone, Default)]
pub struct PortWiring {
  used: HashSet<PortHandle>,
  links: Vec<EstablishedLink>,
}

impl PortWiring {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_used(&self, handle: PortHandle) -> bool {
    self.used.contains(&handle)
  }

  pub fn links(&self) -> &[EstablishedLink] {
    &self.links
  }

  fn connect(
    &mut self,
    arena: &NodeArena,
    source: PortHandle,
    sink: PortHandle,
  ) -> EstablishedLink {
    self.used.insert(source);
    self.used.insert(sink);
    let link = EstablishedLink {
      source,
      sink,
      source_port: arena[source.node].ports[source.port].name.clone(),
      sink_port: arena[sink.node].ports[sink.port].name.clone(),
    };
    self.links.push(link.clone());
    link
  }
}

/// A port that exists or a request template that can produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
  Port(PortHandle),
  Template { node: NodeId, template: usize },
}

/// Port selection over the arena.
pub(crate) struct PortMatcher<'m> {
  factory: &'m dyn NodeFactory,
  arena: &'m mut NodeArena,
  wiring: &'m mut PortWiring,
}

impl<'m> PortMatcher<'m> {
  pub fn new(
    factory: &'m dyn NodeFactory,
    arena: &'m mut NodeArena,
    wiring: &'m mut PortWiring,
  ) -> Self {
    Self {
      factory,
      arena,
      wiring,
    }
  }

  pub fn name(&self, node: NodeId) -> &str {
    &self.arena[node].name
  }

  pub fn port(&self, handle: PortHandle) -> &PortInfo {
    &self.arena[handle.node].ports[handle.port]
  }

  fn info(&self, candidate: Candidate) -> &PortInfo {
    match candidate {
      Candidate::Port(handle) => self.port(handle),
      Candidate::Template { node, template } => &self.arena[node].templates[template],
    }
  }

  /// Nodes whose ports `node` links through: itself, or the leaves of a container.
  fn endpoints(&self, node: NodeId) -> Vec<NodeId> {
    if self.arena[node].is_container() {
      self
        .arena
        .descendants(node)
        .into_iter()
        .filter(|d| !self.arena[*d].is_container())
        .collect()
    } else {
      vec![node]
    }
  }

  /// Free ports of `node` in `direction`, then its request templates.
  fn candidates(
    &self,
    node: NodeId,
    direction: PortDirection,
    name: Option<&str>,
    templates: bool,
  ) -> Vec<Candidate> {
    let endpoints = self.endpoints(node);
    let mut out = Vec::new();
    for &n in &endpoints {
      for (port, info) in self.arena[n].ports.iter().enumerate() {
        let handle = PortHandle { node: n, port };
        if info.direction == direction
          && !self.wiring.is_used(handle)
          && name.is_none_or(|w| info.name == w)
        {
          out.push(Candidate::Port(handle));
        }
      }
    }
    if templates {
      for &n in &endpoints {
        for (template, info) in self.arena[n].templates.iter().enumerate() {
          if info.direction == direction
            && info.presence == PortPresence::Request
            && name.is_none_or(|w| info.name == w || info.template_matches(w))
          {
            out.push(Candidate::Template { node: n, template });
          }
        }
      }
    }
    out
  }

  /// Turns a candidate into a concrete port, instantiating templates.
  fn materialize(&mut self, candidate: Candidate, wanted: Option<&str>) -> PortHandle {
    let (node, template) = match candidate {
      Candidate::Port(handle) => return handle,
      Candidate::Template { node, template } => (node, template),
    };
    let info = self.arena[node].templates[template].clone();
    let name = match wanted {
      Some(w) if info.template_matches(w) => w.to_string(),
      _ => {
        let taken = |n: &str| self.arena[node].ports.iter().any(|p| p.name == n);
        let mut index = 0;
        while taken(&info.instance_name(index)) {
          index += 1;
        }
        info.instance_name(index)
      }
    };
    debug!(node = %self.arena[node].name, port = %name, "instantiated request port");
    let ports = &mut self.arena[node].ports;
    ports.push(PortInfo { name, ..info });
    PortHandle {
      node,
      port: ports.len() - 1,
    }
  }

  fn find_pair(
    &self,
    source: NodeId,
    sink: NodeId,
    names: (Option<&str>, Option<&str>),
    format: Option<&FormatDescriptor>,
    source_templates: bool,
  ) -> Option<(Candidate, Candidate)> {
    let sources = self.candidates(source, PortDirection::Output, names.0, source_templates);
    let sinks = self.candidates(sink, PortDirection::Input, names.1, true);
    sources.iter().find_map(|&s| {
      sinks
        .iter()
        .find(|&&k| {
          self
            .factory
            .ports_compatible(self.info(s), self.info(k), format)
        })
        .map(|&k| (s, k))
    })
  }

  /// Connects the first compatible port pair. Source templates are skipped when `exhaustive`
  /// so that repeated calls terminate.
  fn connect_next(
    &mut self,
    source: NodeId,
    sink: NodeId,
    names: (Option<&str>, Option<&str>),
    format: Option<&FormatDescriptor>,
    exhaustive: bool,
  ) -> Option<EstablishedLink> {
    let (s, k) = self.find_pair(source, sink, names, format, !exhaustive)?;
    let s = self.materialize(s, names.0);
    let k = self.materialize(k, names.1);
    Some(self.wiring.connect(self.arena, s, k))
  }

  /// Records a port announced by `node` after creation.
  pub fn announce_port(&mut self, node: NodeId, port: PortInfo) -> PortHandle {
    let ports = &mut self.arena[node].ports;
    let index = match ports
      .iter()
      .position(|p| p.name == port.name && p.direction == port.direction)
    {
      Some(index) => index,
      None => {
        ports.push(port);
        ports.len() - 1
      }
    };
    PortHandle { node, port: index }
  }

  /// Tries to link a freshly announced output port to `sink`.
  pub fn link_announced(
    &mut self,
    source: PortHandle,
    sink: NodeId,
    sink_port: Option<&str>,
    format: Option<&FormatDescriptor>,
  ) -> Option<EstablishedLink> {
    if self.wiring.is_used(source) || self.port(source).direction != PortDirection::Output {
      return None;
    }
    let sinks = self.candidates(sink, PortDirection::Input, sink_port, true);
    let k = sinks.into_iter().find(|&k| {
      self
        .factory
        .ports_compatible(self.port(source), self.info(k), format)
    })?;
    let k = self.materialize(k, sink_port);
    Some(self.wiring.connect(self.arena, source, k))
  }

  /// Node to watch for announced ports when `node` has nothing to link yet.
  fn dynamic_source(&self, node: NodeId) -> Option<NodeId> {
    if self.arena[node].has_dynamic_ports() {
      return Some(node);
    }
    if self.arena[node].is_container() {
      return self
        .arena
        .descendants(node)
        .into_iter()
        .find(|d| self.arena[*d].has_dynamic_ports());
    }
    None
  }

  /// Why no port pair of `source` and `sink` could be linked.
  fn describe_failure(
    &self,
    source: NodeId,
    sink: NodeId,
    names: (Option<&str>, Option<&str>),
    format: Option<&FormatDescriptor>,
  ) -> String {
    let (a, b) = (self.name(source), self.name(sink));
    let prefix = format!("could not link \"{}\" to \"{}\"", a, b);
    let sources = self.candidates(source, PortDirection::Output, names.0, true);
    let sinks = self.candidates(sink, PortDirection::Input, names.1, true);
    if sources.is_empty() {
      return match names.0 {
        Some(port) => format!("{}: \"{}\" has no free output port \"{}\"", prefix, a, port),
        None => format!("{}: \"{}\" has no free output port", prefix, a),
      };
    }
    if sinks.is_empty() {
      return match names.1 {
        Some(port) => format!("{}: \"{}\" has no free input port \"{}\"", prefix, b, port),
        None => format!("{}: \"{}\" has no free input port", prefix, b),
      };
    }
    let formats = |cands: &[Candidate]| {
      cands
        .iter()
        .map(|&c| self.info(c).format.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
    };
    let Some(format) = format else {
      return format!(
        "{}: no compatible ports ({} vs {})",
        prefix,
        formats(&sources),
        formats(&sinks)
      );
    };
    let source_ok = sources.iter().any(|&c| self.info(c).format.intersects(format));
    let sink_ok = sinks.iter().any(|&c| self.info(c).format.intersects(format));
    match (source_ok, sink_ok) {
      (false, false) => format!(
        "{}: neither element can handle format {} (\"{}\" produces {}, \"{}\" accepts {})",
        prefix,
        format,
        a,
        formats(&sources),
        b,
        formats(&sinks)
      ),
      (false, true) => format!(
        "{}: \"{}\" cannot produce format {} (offers {})",
        prefix,
        a,
        format,
        formats(&sources)
      ),
      (true, false) => format!(
        "{}: \"{}\" cannot accept format {} (accepts {})",
        prefix,
        b,
        format,
        formats(&sinks)
      ),
      (true, true) => format!(
        "{}: no port pair agrees on format {} ({} vs {})",
        prefix,
        format,
        formats(&sources),
        formats(&sinks)
      ),
    }
  }
}

/// Performs links against a finished node set.
pub(crate) struct LinkResolver<'r> {
  matcher: PortMatcher<'r>,
  deferred: &'r mut DeferredLinker,
  diagnostics: &'r mut Diagnostics,
}

impl<'r> LinkResolver<'r> {
  pub fn new(
    matcher: PortMatcher<'r>,
    deferred: &'r mut DeferredLinker,
    diagnostics: &'r mut Diagnostics,
  ) -> Self {
    Self {
      matcher,
      deferred,
      diagnostics,
    }
  }

  fn resolve_end(&mut self, scope: Option<NodeId>, reference: &mut Reference) -> Option<NodeId> {
    let found = resolve_reference(self.matcher.arena, scope, reference);
    if found.is_none() {
      self.diagnostics.error(
        ErrorKind::DanglingReference,
        format!(
          "no such element named \"{}\"",
          reference.name.as_deref().unwrap_or_default()
        ),
      );
    }
    found
  }

  /// Resolves both ends of `link` and connects them.
  #[instrument(level = "trace", skip(self, link), fields(link = %link))]
  pub fn perform(&mut self, link: &mut Link) -> LinkOutcome {
    let source = self.resolve_end(link.scope, &mut link.source);
    let sink = self.resolve_end(link.scope, &mut link.sink);
    let (Some(source), Some(sink)) = (source, sink) else {
      return LinkOutcome::Failed;
    };

    let source_names = link.source.ports.names();
    let sink_names = link.sink.ports.names();
    if !source_names.is_empty() && !sink_names.is_empty() && source_names.len() != sink_names.len()
    {
      self.diagnostics.error(
        ErrorKind::LinkIncompatible,
        format!(
          "could not link \"{}\" to \"{}\": {} source ports but {} sink ports",
          self.matcher.name(source),
          self.matcher.name(sink),
          source_names.len(),
          sink_names.len()
        ),
      );
      return LinkOutcome::Failed;
    }
    let pairs: Vec<(Option<&str>, Option<&str>)> = match (source_names, sink_names) {
      ([], []) => vec![(None, None)],
      (s, []) => s.iter().map(|n| (Some(n.as_str()), None)).collect(),
      ([], k) => k.iter().map(|n| (None, Some(n.as_str()))).collect(),
      (s, k) => s
        .iter()
        .zip(k)
        .map(|(a, b)| (Some(a.as_str()), Some(b.as_str())))
        .collect(),
    };
    let exhaustive = link.all_ports && source_names.is_empty() && sink_names.is_empty();
    let format = link.format.as_ref();

    let mut made = 0;
    let mut failed = Vec::new();
    for names in pairs {
      let mut any = false;
      while let Some(established) =
        self
          .matcher
          .connect_next(source, sink, names, format, exhaustive)
      {
        debug!(
          source = %self.matcher.name(source),
          source_port = %established.source_port,
          sink = %self.matcher.name(sink),
          sink_port = %established.sink_port,
          "linked"
        );
        any = true;
        made += 1;
        if !exhaustive {
          break;
        }
      }
      if !any {
        failed.push(names);
      }
    }

    if made > 0 && failed.is_empty() {
      return LinkOutcome::Performed;
    }
    if made == 0
      && let Some(watch) = self.matcher.dynamic_source(source)
    {
      self.deferred.defer(
        watch,
        DeferredLink {
          link: link.clone(),
          source,
          sink,
          established: 0,
        },
      );
      return LinkOutcome::Deferred;
    }
    for names in failed {
      let message = self
        .matcher
        .describe_failure(source, sink, names, format);
      self.diagnostics.error(ErrorKind::LinkIncompatible, message);
    }
    if made > 0 {
      LinkOutcome::Performed
    } else {
      LinkOutcome::Failed
    }
  }
}
