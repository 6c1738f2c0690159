//! Recursive-descent parser turning tokens into chains.
//!
//! Grammar:
//!
//! ```text
//! graph      := chainlist
//! chainlist  := chain*
//! chain      := [link pads] operand pads (link pads operand pads)*
//! operand    := element | container | reference | URL
//! element    := IDENTIFIER ASSIGNMENT*
//! container  := ('(' | CONTAINEROPEN) ASSIGNMENT* chainlist ')'
//! ```
//!
//! Errors are recorded and parsing resumes at the next token that can start a chain.
//! Only an unclosed container stops the parse.

use tracing::trace;

use crate::build_context::BuildContext;
use crate::chain_builder;
use crate::container_builder;
use crate::factory::UriDirection;
use crate::lexer::{Spanned, Token};
use crate::types::{Chain, ErrorKind, PortSelector, PropertyAssignment};

/// Parsing stopped; a fatal diagnostic has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unrecoverable;

/// What followed a link operator.
enum Operand {
  Chain { chain: Chain, reference: bool },
  /// End of input, `)` or another link.
  Nothing,
  /// A malformed fragment was reported and skipped.
  Skipped,
}

pub(crate) struct Parser<'t, 'c, 'a> {
  tokens: &'t [Spanned],
  pos: usize,
  ctx: &'c mut BuildContext<'a>,
}

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
  pub fn new(tokens: &'t [Spanned], ctx: &'c mut BuildContext<'a>) -> Self {
    Self {
      tokens,
      pos: 0,
      ctx,
    }
  }

  /// Parses the whole token stream into top-level chains, in textual order.
  pub fn parse(mut self) -> Result<Vec<Chain>, Unrecoverable> {
    self.chainlist(None)
  }

  fn peek(&self) -> Option<&'t Token> {
    self.tokens.get(self.pos).map(|s| &s.token)
  }

  fn offset(&self) -> usize {
    self
      .tokens
      .get(self.pos)
      .or_else(|| self.tokens.last())
      .map(|s| s.offset)
      .unwrap_or(0)
  }

  fn syntax_error(&mut self, message: String) {
    self.ctx.diagnostics.error(ErrorKind::Syntax, message);
  }

  /// Chains until end of input, or until the `)` closing a container opened at `open`.
  fn chainlist(&mut self, open: Option<usize>) -> Result<Vec<Chain>, Unrecoverable> {
    let mut chains = Vec::new();
    loop {
      match self.peek() {
        None => {
          if let Some(offset) = open {
            self.ctx.diagnostics.fatal(
              ErrorKind::Syntax,
              format!("unclosed container opened at offset {}", offset),
            );
            return Err(Unrecoverable);
          }
          return Ok(chains);
        }
        Some(Token::ContainerClose) => {
          let offset = self.offset();
          self.pos += 1;
          if open.is_some() {
            return Ok(chains);
          }
          self.syntax_error(format!("unexpected \")\" at offset {} - ignoring", offset));
        }
        Some(_) => {
          if let Some(chain) = self.chain()? {
            chains.push(chain);
          }
        }
      }
    }
  }

  fn chain(&mut self) -> Result<Option<Chain>, Unrecoverable> {
    let (mut chain, mut trailing, mut last_is_reference) = match self.peek() {
      Some(Token::Link(_)) => (Chain::default(), PortSelector::default(), false),
      _ => match self.operand(UriDirection::Source)? {
        Operand::Chain { mut chain, reference } => {
          let pads = self.pads();
          chain.last.ports.extend(pads.clone());
          (chain, pads, reference)
        }
        Operand::Nothing | Operand::Skipped => return Ok(None),
      },
    };
    let mut linked = false;
    while let Some(Token::Link(op)) = self.peek() {
      self.pos += 1;
      let sink_pads = self.pads();
      let mut next = match self.operand(UriDirection::Sink)? {
        Operand::Chain { chain, reference } => (chain, reference),
        Operand::Nothing => (Chain::default(), false),
        Operand::Skipped => break,
      };
      next.0.first.ports.extend(sink_pads);
      let pads = self.pads();
      next.0.last.ports.extend(pads.clone());
      chain_builder::link(self.ctx, &mut chain, op.clone(), next.0);
      linked = true;
      trailing = pads;
      last_is_reference = next.1;
    }
    if !linked && last_is_reference {
      chain_builder::unexpected_reference(self.ctx, &chain.last);
      return Ok(None);
    }
    if !trailing.is_empty() {
      chain_builder::unexpected_ports(self.ctx, &trailing);
      chain.last.ports = PortSelector::default();
    }
    trace!(elements = chain.elements.len(), links = chain.pending_links.len(), "parsed chain");
    Ok(Some(chain))
  }

  /// An operand; URLs are created for `direction`.
  fn operand(&mut self, direction: UriDirection) -> Result<Operand, Unrecoverable> {
    let offset = self.offset();
    let Some(token) = self.peek() else {
      return Ok(Operand::Nothing);
    };
    let operand = match token {
      Token::Identifier(type_name) => {
        self.pos += 1;
        let assignments = self.assignments();
        Operand::Chain {
          chain: chain_builder::element(self.ctx, type_name, assignments),
          reference: false,
        }
      }
      Token::Url(uri) => {
        self.pos += 1;
        let assignments = self.assignments();
        Operand::Chain {
          chain: chain_builder::url_endpoint(self.ctx, uri, direction, assignments),
          reference: false,
        }
      }
      Token::Reference { name, ports } => {
        self.pos += 1;
        Operand::Chain {
          chain: chain_builder::reference(name, ports.clone()),
          reference: true,
        }
      }
      Token::ContainerOpen(type_name) => {
        self.pos += 1;
        let assignments = self.assignments();
        let chains = self.chainlist(Some(offset))?;
        Operand::Chain {
          chain: container_builder::build(self.ctx, type_name.as_deref(), assignments, chains),
          reference: false,
        }
      }
      Token::ContainerClose | Token::Link(_) => Operand::Nothing,
      Token::Assignment(_) | Token::Ports(_) | Token::Invalid(_) => {
        self.syntax_error(format!(
          "syntax error at offset {}: unexpected \"{}\"",
          offset, token
        ));
        self.skip_to_chain_start();
        Operand::Skipped
      }
    };
    Ok(operand)
  }

  fn assignments(&mut self) -> Vec<PropertyAssignment> {
    let mut out = Vec::new();
    while let Some(Token::Assignment(a)) = self.peek() {
      out.push(a.clone());
      self.pos += 1;
    }
    out
  }

  fn pads(&mut self) -> PortSelector {
    let mut out = PortSelector::default();
    while let Some(Token::Ports(ports)) = self.peek() {
      out.extend(ports.clone());
      self.pos += 1;
    }
    out
  }

  fn skip_to_chain_start(&mut self) {
    while let Some(Token::Assignment(_) | Token::Ports(_) | Token::Invalid(_)) = self.peek() {
      self.pos += 1;
    }
  }
}
