//! Runtime configuration.
//!
//! The command surface only takes positional package parameters, so the
//! remaining knobs come from the environment:
//!
//! - `DEBKIT_MANIFEST`: manifest path (default `scripts/manifest.xml`)
//! - `DEBKIT_BUILD_DIR`: build directory (default `build`)
//! - `DEBKIT_SUDO`: `0`, `false` or `no` runs `dpkg` without `sudo`
//!
//! Relative paths resolve against the working directory.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::{ARCHIVE_EXT, DEFAULT_BUILD_DIR, DEFAULT_MANIFEST};
use crate::context::VariableContext;

pub const MANIFEST_ENV: &str = "DEBKIT_MANIFEST";
pub const BUILD_DIR_ENV: &str = "DEBKIT_BUILD_DIR";
pub const SUDO_ENV: &str = "DEBKIT_SUDO";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
  /// Directory the tool runs in; artifacts land here.
  pub work_dir: PathBuf,
  pub manifest: PathBuf,
  pub build_dir: PathBuf,
  /// Prefix `dpkg` invocations with `sudo`.
  pub sudo: bool,
}

impl Config {
  /// Defaults rooted at `work_dir`.
  pub fn new(work_dir: impl Into<PathBuf>) -> Self {
    Self {
      work_dir: work_dir.into(),
      manifest: PathBuf::from(DEFAULT_MANIFEST),
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      sudo: true,
    }
  }

  /// Defaults rooted at `work_dir`, overridden by `DEBKIT_*` variables.
  pub fn from_env(work_dir: impl Into<PathBuf>) -> Self {
    let mut config = Self::new(work_dir);

    if let Some(manifest) = non_empty_var(MANIFEST_ENV) {
      config.manifest = PathBuf::from(manifest);
    }
    if let Some(build_dir) = non_empty_var(BUILD_DIR_ENV) {
      config.build_dir = PathBuf::from(build_dir);
    }
    if let Some(sudo) = non_empty_var(SUDO_ENV) {
      config.sudo = !matches!(sudo.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
    }

    config
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.work_dir.join(&self.manifest)
  }

  pub fn build_root(&self) -> PathBuf {
    self.work_dir.join(&self.build_dir)
  }

  /// `build/{name}_{version}_{arch}`.
  pub fn build_path(&self, ctx: &VariableContext) -> PathBuf {
    self.build_root().join(ctx.package_dir())
  }

  /// `{name}_{version}_{arch}.deb` in the working directory.
  pub fn artifact_path(&self, ctx: &VariableContext) -> PathBuf {
    self.work_dir.join(ctx.artifact_name(ARCHIVE_EXT))
  }

  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
