//! Archiving backends and artifact relocation.
//!
//! A backend takes a prepared directory and produces exactly one archive file.
//! [`relocate`] then moves that file to its conventional name in the working
//! directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::ARCHIVE_EXT;
use crate::error::ErrorKind;
use crate::util::process::{self, Invocation, ProcessError};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("nothing to package: {} is not a directory", .0.display())]
  MissingInput(PathBuf),

  #[error("archiver failed: {0}")]
  Archiver(#[from] ProcessError),

  #[error("archiver reported success but {} does not exist", .0.display())]
  MissingArtifact(PathBuf),

  #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
  Relocate {
    from: PathBuf,
    to: PathBuf,
    source: io::Error,
  },
}

impl PackageError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::Io
  }
}

/// Directory in, single named artifact out.
pub trait ArchiveBackend {
  /// Extension of the produced artifact, without the dot.
  fn extension(&self) -> &str;

  /// Archive `dir` and return the path of the produced file.
  fn archive(&self, dir: &Path) -> Result<PathBuf, PackageError>;
}

/// Path of the archive a backend writes for `dir`: `<dir>.<ext>` next to it.
///
/// The extension is appended, never substituted, so a dotted version such as
/// `foo_1.0_amd64` keeps its full name.
pub fn archive_path(dir: &Path, ext: &str) -> PathBuf {
  let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".");
  name.push(ext);
  dir.with_file_name(name)
}

/// `dpkg-deb --build <dir>`, which writes `<dir>.deb` next to the directory.
///
/// The tool runs in the directory's parent with the bare directory name, so
/// relative build paths resolve the same way they do for the caller.
#[derive(Debug, Clone)]
pub struct DpkgDeb {
  command: Invocation,
}

impl DpkgDeb {
  pub fn new() -> Self {
    Self::with_command(Invocation::new("dpkg-deb"))
  }

  /// Use `command` in place of `dpkg-deb`; `--build <name>` is appended.
  pub fn with_command(command: Invocation) -> Self {
    Self { command }
  }

  /// The command that would archive `dir`, relative to its parent.
  pub fn invocation(&self, dir: &Path) -> Invocation {
    let target = dir
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| dir.display().to_string());
    self.command.clone().arg("--build").arg(target)
  }
}

impl Default for DpkgDeb {
  fn default() -> Self {
    Self::new()
  }
}

impl ArchiveBackend for DpkgDeb {
  fn extension(&self) -> &str {
    ARCHIVE_EXT
  }

  fn archive(&self, dir: &Path) -> Result<PathBuf, PackageError> {
    if !dir.is_dir() || dir.file_name().is_none() {
      return Err(PackageError::MissingInput(dir.to_path_buf()));
    }

    let cwd = dir.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    process::run(&self.invocation(dir), cwd)?;

    let produced = archive_path(dir, self.extension());
    if !produced.is_file() {
      return Err(PackageError::MissingArtifact(produced));
    }

    info!(artifact = %produced.display(), "archive built");
    Ok(produced)
  }
}

/// Move `from` to `to`, replacing any existing file.
///
/// Falls back to copy-then-remove when a rename is not possible, e.g. across
/// filesystems.
pub fn relocate(from: &Path, to: &Path) -> Result<(), PackageError> {
  if from == to {
    return Ok(());
  }

  let relocate_err = |source: io::Error| PackageError::Relocate {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  };

  if let Err(e) = fs::rename(from, to) {
    debug!(error = %e, "rename failed, copying instead");
    fs::copy(from, to).map_err(relocate_err)?;
    fs::remove_file(from).map_err(relocate_err)?;
  }

  debug!(from = %from.display(), to = %to.display(), "artifact relocated");
  Ok(())
}
