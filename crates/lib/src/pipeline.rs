//! The build stages wired together.
//!
//! context → template → manifest → builder → package

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::builder::{self, BuildOptions, BuildReport, Progress};
use crate::config::Config;
use crate::context::VariableContext;
use crate::error::{Error, Result};
use crate::manifest::{self, Node};
use crate::package::{self, ArchiveBackend};
use crate::template;
use crate::util::hash::{self, TreeDigest};

/// Result of a successful `package` run.
#[derive(Debug, Clone, Serialize)]
pub struct PackageOutcome {
  pub artifact: PathBuf,
  pub digest: TreeDigest,
  pub report: BuildReport,
}

/// Read, substitute and parse the configured manifest. Touches nothing on disk.
pub fn load(ctx: &VariableContext, config: &Config) -> Result<Node> {
  let path = config.manifest_path();
  let raw = fs::read_to_string(&path).map_err(|source| Error::ReadManifest {
    path: path.display().to_string(),
    source,
  })?;

  let text = template::render(&raw, ctx)?;
  let root = manifest::parse(&text)?;
  info!(manifest = %path.display(), nodes = root.count(), "manifest loaded");
  Ok(root)
}

/// Materialize the manifest tree under the build directory.
///
/// `build_dir/{name}_{version}_{arch}` is removed first, whether or not the
/// manifest's root uses that name.
pub fn prepare<P: Progress + ?Sized>(ctx: &VariableContext, config: &Config, progress: &mut P) -> Result<BuildReport> {
  let root = load(ctx, config)?;

  if root.name() != ctx.package_dir() {
    warn!(
      root = root.name(),
      expected = ctx.package_dir(),
      "manifest root does not match the package directory"
    );
  }

  builder::clean(&config.build_path(ctx))?;

  let options = BuildOptions::new(config.work_dir());
  let report = builder::materialize(&root, &config.build_root(), &options, progress)?;
  Ok(report)
}

/// Prepare the tree, archive it with `backend` and move the artifact into the
/// working directory as `{name}_{version}_{arch}.<ext>`.
pub fn package<B, P>(ctx: &VariableContext, config: &Config, backend: &B, progress: &mut P) -> Result<PackageOutcome>
where
  B: ArchiveBackend + ?Sized,
  P: Progress + ?Sized,
{
  let report = prepare(ctx, config, progress)?;
  let digest = hash::hash_tree(&report.root)?;

  let produced = backend.archive(&report.root)?;
  let artifact = config.work_dir().join(ctx.artifact_name(backend.extension()));
  package::relocate(&produced, &artifact)?;

  info!(artifact = %artifact.display(), digest = %digest.short(), "package created");
  Ok(PackageOutcome {
    artifact,
    digest,
    report,
  })
}
