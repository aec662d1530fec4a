//! Implementation of the `debkit package` command.
//!
//! Materializes the manifest under the build directory, archives it with
//! `dpkg-deb` and moves the artifact into the working directory.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use debkit_lib::builder::{PlacedFile, Progress};
use debkit_lib::package::DpkgDeb;
use debkit_lib::pipeline;

use crate::PackageArgs;
use crate::output::{format_elapsed, format_size, print_info, print_json, print_placed, print_success, print_summary};

/// Prints one line per placed file, relative to the package root.
struct TermProgress<'a> {
  base: &'a Path,
  quiet: bool,
}

impl Progress for TermProgress<'_> {
  fn file_placed(&mut self, file: &PlacedFile) {
    if !self.quiet {
      print_placed(file, self.base);
    }
  }
}

pub fn cmd_package(args: &PackageArgs, json: bool) -> Result<()> {
  let start = Instant::now();
  let (ctx, config) = super::setup(args)?;

  if !json {
    print_info(&format!("Building {}", ctx.package_dir()));
  }

  let build_root = config.build_root();
  let mut progress = TermProgress {
    base: &build_root,
    quiet: json,
  };
  let outcome = pipeline::package(&ctx, &config, &DpkgDeb::new(), &mut progress)
    .with_context(|| format!("Failed to package {}", ctx.package_dir()))?;

  if json {
    return print_json(&outcome);
  }

  println!();
  print_success(&format!("Package created: {}", outcome.artifact.display()));
  print_summary(&[
    ("Files", outcome.report.files.len().to_string()),
    ("Directories", outcome.report.dirs.len().to_string()),
    ("Size", format_size(outcome.report.total_bytes())),
    ("Tree digest", outcome.digest.short().to_string()),
    ("Elapsed", format_elapsed(start.elapsed())),
  ]);

  Ok(())
}
