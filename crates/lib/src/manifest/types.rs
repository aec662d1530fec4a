//! Typed manifest tree.
//!
//! Every element of the manifest document becomes a [`Node`]. Attribute
//! combinations are validated when the node is constructed, so a [`FileNode`]
//! always carries exactly one [`ContentSource`].

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// One entry of the manifest tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
  Dir(DirNode),
  File(FileNode),
}

impl Node {
  pub fn name(&self) -> &str {
    match self {
      Node::Dir(d) => &d.name,
      Node::File(f) => &f.name,
    }
  }

  pub fn id(&self) -> Option<&str> {
    match self {
      Node::Dir(d) => d.id.as_deref(),
      Node::File(f) => f.id.as_deref(),
    }
  }

  pub fn mode(&self) -> Option<Mode> {
    match self {
      Node::Dir(d) => d.mode,
      Node::File(f) => f.mode,
    }
  }

  /// Total number of nodes in this subtree, this one included.
  pub fn count(&self) -> usize {
    match self {
      Node::Dir(d) => 1 + d.children.iter().map(Node::count).sum::<usize>(),
      Node::File(_) => 1,
    }
  }
}

/// A directory and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirNode {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mode: Option<Mode>,
  pub children: Vec<Node>,
}

/// A file with exactly one content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mode: Option<Mode>,
  pub source: ContentSource,
}

/// Where a file's bytes come from.
///
/// Listed in precedence order; the parser rejects nodes naming more than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSource {
  /// Compress `src` into `intermediate`, then copy the result into place.
  Compressed {
    src: PathBuf,
    intermediate: PathBuf,
    algorithm: Compression,
  },

  /// Copy `src` byte-for-byte.
  Copy { src: PathBuf },

  /// Embedded element text, written after dedenting.
  Inline { text: String },
}

impl ContentSource {
  pub fn kind(&self) -> SourceKind {
    match self {
      ContentSource::Compressed { .. } => SourceKind::Compressed,
      ContentSource::Copy { .. } => SourceKind::Copy,
      ContentSource::Inline { .. } => SourceKind::Inline,
    }
  }
}

/// Discriminant of [`ContentSource`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
  Compressed,
  Copy,
  Inline,
}

impl SourceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      SourceKind::Compressed => "compressed",
      SourceKind::Copy => "copy",
      SourceKind::Inline => "inline",
    }
  }
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Supported compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
  /// gzip at maximum compression.
  Gzip,
}

impl Compression {
  /// Resolve an algorithm by the name used in the `compress` attribute.
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "gzip" | "gz" => Some(Compression::Gzip),
      _ => None,
    }
  }

  /// File extension conventionally used for the compressed output.
  pub fn extension(self) -> &'static str {
    match self {
      Compression::Gzip => "gz",
    }
  }
}

/// Unix permission bits, written in octal in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(pub u32);

impl Mode {
  /// Highest value accepted: setuid, setgid, sticky and all rwx bits.
  pub const MAX: u32 = 0o7777;

  /// Parse an octal mode string: `0755`, `755` or `0o755`.
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    let digits = s.strip_prefix("0o").unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
      return None;
    }

    u32::from_str_radix(digits, 8)
      .ok()
      .filter(|bits| *bits <= Self::MAX)
      .map(Mode)
  }

  pub fn bits(self) -> u32 {
    self.0
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04o}", self.0)
  }
}

impl Serialize for Mode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}
