use anyhow::{Context, Result};

use debkit_lib::system;

use crate::PackageArgs;
use crate::output::{print_info, print_success};

pub fn cmd_install(args: &PackageArgs) -> Result<()> {
  let (ctx, config) = super::setup(args)?;

  print_info(&format!("Running {}", system::install_invocation(&ctx, &config)));
  system::install(&ctx, &config).with_context(|| format!("Failed to install {}", ctx.package_dir()))?;
  print_success(&format!("Installed {} {}", ctx.name(), ctx.version()));

  Ok(())
}
