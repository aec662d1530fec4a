//! Manifest parsing and lookup.
//!
//! A manifest is an XML document whose elements are directory or file nodes.
//! It must already be template-substituted (see [`crate::template`]) when it
//! reaches [`parse`].
//!
//! ```xml
//! <package name="{DEB_DIR}">
//!   <dir name="DEBIAN">
//!     <file type="file" name="control">
//!       Package: {name}
//!       Version: {version}
//!     </file>
//!   </dir>
//!   <dir name="usr/local/bin">
//!     <file type="file" name="{name}" id="binary" src="target/release/{name}" mode="0755"/>
//!   </dir>
//! </package>
//! ```
//!
//! The tag name is free-form: elements are directories unless they carry
//! `type="file"`.

mod parse;
mod types;

pub use parse::parse;
pub use types::*;

use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
  #[error("invalid XML at position {position}: {message}")]
  Xml { position: u64, message: String },

  #[error("malformed manifest: {0}")]
  Malformed(String),

  #[error("unknown node type '{value}' on <{element}> (expected 'dir' or 'file')")]
  UnknownNodeType { element: String, value: String },

  #[error("file node '{name}' has conflicting content sources: {}", .sources.join(", "))]
  ConflictingSources { name: String, sources: Vec<&'static str> },

  #[error("file node '{0}' has no content (expected inline text, src, or src-before/src-after/compress)")]
  EmptyFileNode(String),

  #[error("unsupported compression '{algorithm}' for file node '{name}' (supported: gzip)")]
  UnsupportedCompression { name: String, algorithm: String },

  #[error("element not found: no node with id '{0}'")]
  ElementNotFound(String),
}

impl ManifestError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ManifestError::Xml { .. }
      | ManifestError::Malformed(_)
      | ManifestError::UnknownNodeType { .. }
      | ManifestError::ConflictingSources { .. } => ErrorKind::MalformedManifest,
      ManifestError::EmptyFileNode(_) => ErrorKind::EmptyFileNode,
      ManifestError::UnsupportedCompression { .. } => ErrorKind::UnsupportedCompression,
      ManifestError::ElementNotFound(_) => ErrorKind::ElementNotFound,
    }
  }
}

/// Find the first node carrying `id`, depth-first in document order.
///
/// The root itself is checked first.
///
/// # Errors
///
/// Returns [`ManifestError::ElementNotFound`] if no node carries the id.
pub fn find_by_id<'a>(root: &'a Node, id: &str) -> Result<&'a Node, ManifestError> {
  search(root, id).ok_or_else(|| ManifestError::ElementNotFound(id.to_string()))
}

fn search<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
  if node.id() == Some(id) {
    return Some(node);
  }

  match node {
    Node::Dir(dir) => dir.children.iter().find_map(|child| search(child, id)),
    Node::File(_) => None,
  }
}
