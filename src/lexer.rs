//! Token source for the pipeline description language.
//!
//! The compiler consumes [`Spanned`] tokens through the [`TokenSource`] trait; [`Lexer`] is the
//! default implementation of the launch-line surface syntax.

use crate::types::{
  FormatDescriptor, LinkOp, PortSelector, PropertyAssignment, looks_like_media_type,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

pub(crate) static IDENTIFIER: Lazy<Result<Regex, regex::Error>> =
  Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_+\-:]*$"));

fn is_identifier(s: &str) -> bool {
  IDENTIFIER.as_ref().is_ok_and(|re| re.is_match(s))
}

/// One lexical token of a pipeline description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  /// Node type name.
  Identifier(String),
  /// `name=value`.
  Assignment(PropertyAssignment),
  /// `name.` or `name.port,port`.
  Reference { name: String, ports: PortSelector },
  /// `.port,port` following an element.
  Ports(PortSelector),
  /// `!`, `!!` or `! format !`.
  Link(LinkOp),
  /// `scheme://...` standing in for an element.
  Url(String),
  /// `(`, `type.(` or `type (`.
  ContainerOpen(Option<String>),
  ContainerClose,
  /// Text the lexer could not classify.
  Invalid(String),
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Token::Identifier(name) => write!(f, "{}", name),
      Token::Assignment(a) => write!(f, "{}={}", a.name, a.value),
      Token::Reference { name, ports } => write!(f, "{}.{}", name, ports.names().join(",")),
      Token::Ports(ports) => write!(f, "{}", ports),
      Token::Link(op) if op.all_ports => write!(f, "!!"),
      Token::Link(LinkOp {
        format: Some(format),
        ..
      }) => write!(f, "! {} !", format),
      Token::Link(_) => write!(f, "!"),
      Token::Url(url) => write!(f, "{}", url),
      Token::ContainerOpen(Some(ty)) => write!(f, "{}.(", ty),
      Token::ContainerOpen(None) => write!(f, "("),
      Token::ContainerClose => write!(f, ")"),
      Token::Invalid(text) => write!(f, "{}", text),
    }
  }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
  pub token: Token,
  pub offset: usize,
}

/// Anything that can turn a description into tokens.
pub trait TokenSource {
  fn tokens(&self, description: &str) -> Vec<Spanned>;
}

/// Default launch-line tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer;

impl TokenSource for Lexer {
  fn tokens(&self, description: &str) -> Vec<Spanned> {
    Scanner::new(description).run()
  }
}

fn is_delimiter(c: u8) -> bool {
  c.is_ascii_whitespace() || matches!(c, b'!' | b'(' | b')')
}

struct Scanner<'a> {
  src: &'a str,
  pos: usize,
  out: Vec<Spanned>,
}

impl<'a> Scanner<'a> {
  fn new(src: &'a str) -> Self {
    Self {
      src,
      pos: 0,
      out: Vec::new(),
    }
  }

  fn peek(&self) -> Option<u8> {
    self.src.as_bytes().get(self.pos).copied()
  }

  fn emit(&mut self, token: Token, offset: usize) {
    self.out.push(Spanned { token, offset });
  }

  fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
      self.pos += 1;
    }
  }

  fn run(mut self) -> Vec<Spanned> {
    loop {
      self.skip_whitespace();
      let start = self.pos;
      let Some(c) = self.peek() else {
        break;
      };
      match c {
        b'(' => {
          self.pos += 1;
          self.emit(Token::ContainerOpen(None), start);
        }
        b')' => {
          self.pos += 1;
          self.emit(Token::ContainerClose, start);
        }
        b'!' => self.link(start),
        _ => self.word(start),
      }
    }
    self.out
  }

  /// Byte index of the next `!` outside quotes, starting at `from`.
  fn find_bang(&self, from: usize) -> Option<usize> {
    let bytes = self.src.as_bytes();
    let mut quote = None;
    let mut i = from;
    while i < bytes.len() {
      match (bytes[i], quote) {
        (b'\\', Some(_)) => i += 1,
        (q @ (b'"' | b'\''), None) => quote = Some(q),
        (q, Some(open)) if q == open => quote = None,
        (b'!', None) => return Some(i),
        (b'(' | b')', None) => return None,
        _ => {}
      }
      i += 1;
    }
    None
  }

  fn link(&mut self, start: usize) {
    self.pos += 1;
    if self.peek() == Some(b'!') {
      self.pos += 1;
      self.emit(Token::Link(LinkOp::all_ports()), start);
      return;
    }
    if let Some(bang) = self.find_bang(self.pos) {
      let candidate = self.src[self.pos..bang].trim();
      if looks_like_media_type(candidate) {
        self.pos = bang + 1;
        match candidate.parse::<FormatDescriptor>() {
          Ok(format) => self.emit(Token::Link(LinkOp::filtered(format)), start),
          Err(e) => self.emit(Token::Invalid(format!("{} ({})", candidate, e)), start),
        }
        return;
      }
    }
    self.emit(Token::Link(LinkOp::plain()), start);
  }

  /// Reads up to the next unquoted delimiter.
  fn read_word(&mut self) -> &'a str {
    let bytes = self.src.as_bytes();
    let start = self.pos;
    let mut quote = None;
    while self.pos < bytes.len() {
      let c = bytes[self.pos];
      match quote {
        Some(open) => {
          if c == b'\\' {
            self.pos += 1;
          } else if c == open {
            quote = None;
          }
        }
        None if c == b'"' || c == b'\'' => quote = Some(c),
        None if is_delimiter(c) => break,
        None => {}
      }
      self.pos += 1;
    }
    let end = self.pos.min(bytes.len());
    &self.src[start..end]
  }

  fn word(&mut self, start: usize) {
    let word = self.read_word();
    if let Some(list) = word.strip_prefix('.') {
      let token = match PortSelector::from_list(list) {
        Ok(ports) if !ports.is_empty() => Token::Ports(ports),
        _ => Token::Invalid(word.to_string()),
      };
      self.emit(token, start);
      return;
    }
    if let Some(ty) = word.strip_suffix('.')
      && self.peek() == Some(b'(')
      && is_identifier(ty)
    {
      self.pos += 1;
      self.emit(Token::ContainerOpen(Some(ty.to_string())), start);
      return;
    }
    let token = classify(word);
    if let Token::Identifier(ty) = &token {
      let after = self.pos;
      self.skip_whitespace();
      if self.peek() == Some(b'(') {
        self.pos += 1;
        self.emit(Token::ContainerOpen(Some(ty.clone())), start);
        return;
      }
      self.pos = after;
    }
    self.emit(token, start);
  }
}

fn classify(word: &str) -> Token {
  let scheme = word.find("://");
  let eq = word.find('=');
  if let Some(s) = scheme
    && s > 0
    && eq.is_none_or(|e| s < e)
  {
    return Token::Url(word.to_string());
  }
  if eq.is_some() {
    return match PropertyAssignment::parse(word) {
      Some(a) if is_identifier(&a.name) => Token::Assignment(a),
      _ => Token::Invalid(word.to_string()),
    };
  }
  if let Some((name, list)) = word.split_once('.') {
    if !is_identifier(name) {
      return Token::Invalid(word.to_string());
    }
    return match PortSelector::from_list(list) {
      Ok(ports) => Token::Reference {
        name: name.to_string(),
        ports,
      },
      Err(_) => Token::Invalid(word.to_string()),
    };
  }
  if is_identifier(word) {
    Token::Identifier(word.to_string())
  } else {
    Token::Invalid(word.to_string())
  }
}
