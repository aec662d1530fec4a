//! Crate-level error type.
//!
//! Each stage owns its own error enum; [`Error`] wraps them so callers that
//! drive the whole pipeline deal with a single type. Every error maps onto an
//! [`ErrorKind`], the coarse classification surfaced to operators.

use thiserror::Error;

use crate::builder::BuildError;
use crate::context::ContextError;
use crate::manifest::ManifestError;
use crate::package::PackageError;
use crate::system::SystemError;
use crate::template::TemplateError;
use crate::util::hash::DigestError;

/// Coarse classification shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// Missing or invalid invocation parameters.
  Usage,
  /// A template placeholder with no value in the context.
  UndefinedVariable,
  /// The manifest is not a valid tree description.
  MalformedManifest,
  /// An id lookup found nothing.
  ElementNotFound,
  /// A file node with no content source.
  EmptyFileNode,
  /// A compression algorithm other than gzip was requested.
  UnsupportedCompression,
  /// Filesystem or external process failure.
  Io,
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      ErrorKind::Usage => "usage error",
      ErrorKind::UndefinedVariable => "undefined variable",
      ErrorKind::MalformedManifest => "malformed manifest",
      ErrorKind::ElementNotFound => "element not found",
      ErrorKind::EmptyFileNode => "empty file node",
      ErrorKind::UnsupportedCompression => "unsupported compression",
      ErrorKind::Io => "i/o failure",
    };
    write!(f, "{}", s)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Context(#[from] ContextError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  System(#[from] SystemError),

  #[error(transparent)]
  Digest(#[from] DigestError),

  #[error("failed to read manifest {path}: {source}")]
  ReadManifest {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Context(e) => e.kind(),
      Error::Template(e) => e.kind(),
      Error::Manifest(e) => e.kind(),
      Error::Build(e) => e.kind(),
      Error::Package(e) => e.kind(),
      Error::System(e) => e.kind(),
      Error::Digest(_) => ErrorKind::Io,
      Error::ReadManifest { .. } => ErrorKind::Io,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
