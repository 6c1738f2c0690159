//! Format descriptors narrowing which ports a link may connect.
//!
//! Textual form: `media/type,key=value,...` structures separated by `;`, or
//! `ANY` for the unconstrained descriptor.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub(crate) static MEDIA_TYPE: Lazy<Result<Regex, regex::Error>> =
  Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*/[A-Za-z0-9+.\-*]+$"));

fn is_media_type(s: &str) -> bool {
  MEDIA_TYPE.as_ref().is_ok_and(|re| re.is_match(s))
}

/// Whether `text` starts with something shaped like `media/type`.
pub(crate) fn looks_like_media_type(text: &str) -> bool {
  let head = text
    .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
    .next()
    .unwrap_or_default();
  is_media_type(head)
}

/// Error returned when a format descriptor string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatParseError {
  #[error("empty format descriptor")]
  Empty,
  #[error("invalid media type \"{0}\"")]
  MediaType(String),
  #[error("invalid field \"{field}\" in \"{media_type}\"")]
  Field { media_type: String, field: String },
}

/// One `media/type,key=value` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatStructure {
  pub media_type: String,
  pub fields: BTreeMap<String, String>,
}

impl FormatStructure {
  pub fn new(media_type: impl Into<String>) -> Self {
    Self {
      media_type: media_type.into(),
      fields: BTreeMap::new(),
    }
  }

  pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.fields.insert(key.into(), value.into());
    self
  }

  /// Same media type and no conflicting value for any shared field.
  pub fn intersects(&self, other: &FormatStructure) -> bool {
    if self.media_type != other.media_type {
      return false;
    }
    self
      .fields
      .iter()
      .all(|(k, v)| other.fields.get(k).is_none_or(|o| o == v))
  }
}

impl fmt::Display for FormatStructure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.media_type)?;
    for (k, v) in &self.fields {
      write!(f, ",{}={}", k, v)?;
    }
    Ok(())
  }
}

/// Format constraint attached to ports and filtered links.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormatDescriptor {
  #[default]
  Any,
  Formats(Vec<FormatStructure>),
}

impl FormatDescriptor {
  pub fn is_any(&self) -> bool {
    matches!(self, FormatDescriptor::Any)
  }

  /// True when at least one structure of `self` intersects one of `other`.
  pub fn intersects(&self, other: &FormatDescriptor) -> bool {
    match (self, other) {
      (FormatDescriptor::Any, _) | (_, FormatDescriptor::Any) => true,
      (FormatDescriptor::Formats(a), FormatDescriptor::Formats(b)) => {
        a.iter().any(|sa| b.iter().any(|sb| sa.intersects(sb)))
      }
    }
  }
}

fn parse_structure(raw: &str) -> Result<FormatStructure, FormatParseError> {
  let mut parts = raw.split(',').map(str::trim);
  let media_type = parts.next().unwrap_or_default();
  if !is_media_type(media_type) {
    return Err(FormatParseError::MediaType(media_type.to_string()));
  }
  let mut structure = FormatStructure::new(media_type);
  for field in parts {
    let (k, v) = field
      .split_once('=')
      .filter(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
      .ok_or_else(|| FormatParseError::Field {
        media_type: media_type.to_string(),
        field: field.to_string(),
      })?;
    structure
      .fields
      .insert(k.trim().to_string(), v.trim().trim_matches('"').to_string());
  }
  Ok(structure)
}

impl FromStr for FormatDescriptor {
  type Err = FormatParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.is_empty() {
      return Err(FormatParseError::Empty);
    }
    if s.eq_ignore_ascii_case("any") {
      return Ok(FormatDescriptor::Any);
    }
    let structures = s
      .split(';')
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(parse_structure)
      .collect::<Result<Vec<_>, _>>()?;
    if structures.is_empty() {
      return Err(FormatParseError::Empty);
    }
    Ok(FormatDescriptor::Formats(structures))
  }
}

impl fmt::Display for FormatDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FormatDescriptor::Any => write!(f, "ANY"),
      FormatDescriptor::Formats(structures) => {
        for (i, s) in structures.iter().enumerate() {
          if i > 0 {
            write!(f, "; ")?;
          }
          write!(f, "{}", s)?;
        }
        Ok(())
      }
    }
  }
}

impl TryFrom<String> for FormatDescriptor {
  type Error = FormatParseError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<FormatDescriptor> for String {
  fn from(value: FormatDescriptor) -> Self {
    value.to_string()
  }
}
