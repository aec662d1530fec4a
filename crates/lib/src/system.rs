//! Install, uninstall and clean.
//!
//! Thin wrappers over `dpkg` and the filesystem. The invocations are exposed
//! separately from their execution so the exact commands can be shown and
//! tested.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::builder::{self, BuildError};
use crate::config::Config;
use crate::consts::ARCHIVE_EXT;
use crate::context::VariableContext;
use crate::error::ErrorKind;
use crate::util::process::{self, Invocation, ProcessError};

#[derive(Debug, Error)]
pub enum SystemError {
  #[error("package manager failed: {0}")]
  PackageManager(#[from] ProcessError),

  #[error("artifact {} not found; run `debkit package` first", .0.display())]
  MissingArtifact(PathBuf),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error("failed to remove {}: {source}", .path.display())]
  Remove { path: PathBuf, source: io::Error },

  #[error("failed to list {}: {source}", .path.display())]
  List { path: PathBuf, source: io::Error },
}

impl SystemError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::Io
  }
}

/// `[sudo] dpkg -i {name}_{version}_{arch}.deb`
pub fn install_invocation(ctx: &VariableContext, config: &Config) -> Invocation {
  Invocation::new("dpkg")
    .arg("-i")
    .arg(ctx.artifact_name(ARCHIVE_EXT))
    .elevated(config.sudo)
}

/// `[sudo] dpkg -P {name}`
pub fn uninstall_invocation(ctx: &VariableContext, config: &Config) -> Invocation {
  Invocation::new("dpkg").arg("-P").arg(ctx.name()).elevated(config.sudo)
}

/// Install the built artifact with the system package manager.
pub fn install(ctx: &VariableContext, config: &Config) -> Result<(), SystemError> {
  let artifact = config.artifact_path(ctx);
  if !artifact.is_file() {
    return Err(SystemError::MissingArtifact(artifact));
  }

  process::run(&install_invocation(ctx, config), config.work_dir())?;
  info!(package = ctx.name(), version = ctx.version(), "package installed");
  Ok(())
}

/// Purge the package, configuration included.
pub fn uninstall(ctx: &VariableContext, config: &Config) -> Result<(), SystemError> {
  process::run(&uninstall_invocation(ctx, config), config.work_dir())?;
  info!(package = ctx.name(), "package purged");
  Ok(())
}

/// Remove the build directory and every `*.deb` in the working directory.
///
/// Returns the removed paths. Nothing to remove is not an error.
pub fn clean(config: &Config) -> Result<Vec<PathBuf>, SystemError> {
  let mut removed = Vec::new();

  let build_root = config.build_root();
  if builder::clean(&build_root)? {
    removed.push(build_root);
  }

  for artifact in artifacts(config.work_dir())? {
    fs::remove_file(&artifact).map_err(|source| SystemError::Remove {
      path: artifact.clone(),
      source,
    })?;
    debug!(path = %artifact.display(), "removed artifact");
    removed.push(artifact);
  }

  info!(removed = removed.len(), "clean complete");
  Ok(removed)
}

/// Regular files in `dir` with the archive extension, sorted.
pub fn artifacts(dir: &Path) -> Result<Vec<PathBuf>, SystemError> {
  let list_err = |source: io::Error| SystemError::List {
    path: dir.to_path_buf(),
    source,
  };

  let mut found = Vec::new();
  for entry in fs::read_dir(dir).map_err(list_err)? {
    let entry = entry.map_err(list_err)?;
    let path = entry.path();
    let is_archive = path.extension().is_some_and(|ext| ext == ARCHIVE_EXT);
    if is_archive && entry.file_type().map_err(list_err)?.is_file() {
      found.push(path);
    }
  }
  found.sort();
  Ok(found)
}
