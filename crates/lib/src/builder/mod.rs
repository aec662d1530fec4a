//! Structure builder: manifest tree → files on disk.
//!
//! [`materialize`] walks a parsed [`Node`] tree depth-first in document order
//! and creates every directory and file it describes under a base path.
//!
//! # Clean slate
//!
//! The root's target directory is removed before anything is written, so no
//! file from a previous build survives into the new tree.
//!
//! # Content precedence
//!
//! A [`FileNode`] carries exactly one [`ContentSource`], applied as:
//! 1. compressed source: gzip `src` into `intermediate`, copy the result
//! 2. copied source: byte-for-byte copy of `src`
//! 3. inline text: dedented, newline-terminated
//!
//! # Permissions
//!
//! An explicit `mode` is applied after content is placed. Lifecycle hooks
//! (`prerm`, `postinst`) always get `+x` for owner, group and others on top of
//! whatever mode they end up with. Directory modes are applied after the
//! directory's children, so a read-only directory can still be populated.
//!
//! # Failure
//!
//! The first I/O error aborts the build. Nothing is rolled back; the output
//! tree is undefined after a failure and must not be packaged.

mod content;
mod perms;

pub use content::{compress, copy_bytes, dedent};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{EXEC_BITS, LIFECYCLE_HOOKS};
use crate::error::ErrorKind;
use crate::manifest::{ContentSource, DirNode, FileNode, Node, SourceKind};

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to remove previous output {}: {source}", .path.display())]
  Clean { path: PathBuf, source: io::Error },

  #[error("failed to create directory {}: {source}", .path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to read source {}: {source}", .path.display())]
  ReadSource { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", .path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to compress {} into {}: {source}", .src.display(), .dest.display())]
  Compress {
    src: PathBuf,
    dest: PathBuf,
    source: io::Error,
  },

  #[error("failed to set mode {mode:04o} on {}: {source}", .path.display())]
  Permissions {
    path: PathBuf,
    mode: u32,
    source: io::Error,
  },
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::Io
  }
}

/// Settings for a single materialization.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Base for relative `src`, `src-before` and `src-after` paths.
  pub source_root: PathBuf,
}

impl BuildOptions {
  pub fn new(source_root: impl Into<PathBuf>) -> Self {
    Self {
      source_root: source_root.into(),
    }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.source_root.join(path)
    }
  }
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self::new(".")
  }
}

/// A file written by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedFile {
  pub path: PathBuf,
  pub source: SourceKind,
  pub size: u64,
  /// Mode applied after placement, `None` when the default was kept.
  pub mode: Option<u32>,
}

/// Everything a build created, in creation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
  pub root: PathBuf,
  pub dirs: Vec<PathBuf>,
  pub files: Vec<PlacedFile>,
}

impl BuildReport {
  pub fn total_bytes(&self) -> u64 {
    self.files.iter().map(|f| f.size).sum()
  }
}

/// Observer for build progress.
pub trait Progress {
  /// Called once a directory exists.
  fn dir_created(&mut self, _path: &Path) {}

  /// Called as each file is placed, after its permissions are set.
  fn file_placed(&mut self, file: &PlacedFile);
}

/// Silent progress.
impl Progress for () {
  fn file_placed(&mut self, _file: &PlacedFile) {}
}

/// Materialize `root` at `base/<root name>`.
///
/// Any existing entry at that path is removed first.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered; the build stops there.
pub fn materialize<P: Progress + ?Sized>(
  root: &Node,
  base: &Path,
  options: &BuildOptions,
  progress: &mut P,
) -> Result<BuildReport, BuildError> {
  let target = base.join(root.name());
  clean(&target)?;

  info!(path = %target.display(), nodes = root.count(), "materializing tree");

  let mut builder = Builder {
    options,
    progress,
    report: BuildReport {
      root: target,
      ..Default::default()
    },
  };
  builder.node(root, base)?;

  info!(
    files = builder.report.files.len(),
    dirs = builder.report.dirs.len(),
    bytes = builder.report.total_bytes(),
    "tree materialized"
  );
  Ok(builder.report)
}

/// Remove `path` if it exists. Returns whether anything was removed.
pub fn clean(path: &Path) -> Result<bool, BuildError> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(source) => {
      return Err(BuildError::Clean {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let result = if metadata.is_dir() {
    perms::make_removable(path);
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  result.map_err(|source| BuildError::Clean {
    path: path.to_path_buf(),
    source,
  })?;

  debug!(path = %path.display(), "removed previous output");
  Ok(true)
}

/// Whether `a` and `b` name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
  match (fs::canonicalize(a), fs::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}

/// Whether `name` is a maintainer script that must stay executable.
pub fn is_lifecycle_hook(name: &str) -> bool {
  Path::new(name)
    .file_name()
    .and_then(|n| n.to_str())
    .is_some_and(|n| LIFECYCLE_HOOKS.contains(&n))
}

struct Builder<'a, P: Progress + ?Sized> {
  options: &'a BuildOptions,
  progress: &'a mut P,
  report: BuildReport,
}

impl<P: Progress + ?Sized> Builder<'_, P> {
  fn node(&mut self, node: &Node, base: &Path) -> Result<(), BuildError> {
    match node {
      Node::Dir(dir) => self.dir(dir, base),
      Node::File(file) => self.file(file, base),
    }
  }

  fn dir(&mut self, dir: &DirNode, base: &Path) -> Result<(), BuildError> {
    let path = base.join(&dir.name);
    ensure_dir(&path)?;
    debug!(path = %path.display(), "directory ready");
    self.progress.dir_created(&path);
    self.report.dirs.push(path.clone());

    for child in &dir.children {
      self.node(child, &path)?;
    }

    if let Some(mode) = dir.mode {
      perms::set_mode(&path, mode.bits())?;
    }
    Ok(())
  }

  fn file(&mut self, file: &FileNode, base: &Path) -> Result<(), BuildError> {
    let path = base.join(&file.name);
    if let Some(parent) = path.parent() {
      ensure_dir(parent)?;
    }

    let size = match &file.source {
      ContentSource::Compressed {
        src,
        intermediate,
        algorithm,
      } => {
        let intermediate = self.options.resolve(intermediate);
        content::compress(&self.options.resolve(src), &intermediate, *algorithm)?;
        if same_file(&intermediate, &path) {
          debug!(path = %path.display(), "intermediate is the destination, not copying");
          fs::metadata(&path)
            .map_err(|source| BuildError::Write {
              path: path.clone(),
              source,
            })?
            .len()
        } else {
          content::copy_bytes(&intermediate, &path)?
        }
      }
      ContentSource::Copy { src } => content::copy_bytes(&self.options.resolve(src), &path)?,
      ContentSource::Inline { text } => content::write_inline(text, &path)?,
    };

    let mode = match (file.mode, is_lifecycle_hook(&file.name)) {
      (Some(mode), hook) => Some(if hook { mode.bits() | EXEC_BITS } else { mode.bits() }),
      (None, true) => Some(perms::current_mode(&path)? | EXEC_BITS),
      (None, false) => None,
    };
    if let Some(mode) = mode {
      perms::set_mode(&path, mode)?;
    }

    let placed = PlacedFile {
      path,
      source: file.source.kind(),
      size,
      mode,
    };

    info!(
      path = %placed.path.display(),
      source = %placed.source,
      size = placed.size,
      mode = %placed.mode.map(|m| format!("{:04o}", m)).unwrap_or_else(|| "default".to_string()),
      "placed file"
    );
    self.progress.file_placed(&placed);
    self.report.files.push(placed);
    Ok(())
  }
}

fn ensure_dir(path: &Path) -> Result<(), BuildError> {
  fs::create_dir_all(path).map_err(|source| BuildError::CreateDir {
    path: path.to_path_buf(),
    source,
  })
}
