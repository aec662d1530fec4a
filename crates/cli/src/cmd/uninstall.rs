use anyhow::{Context, Result};

use debkit_lib::system;

use crate::PackageArgs;
use crate::output::{print_info, print_success};

pub fn cmd_uninstall(args: &PackageArgs) -> Result<()> {
  let (ctx, config) = super::setup(args)?;

  print_info(&format!("Running {}", system::uninstall_invocation(&ctx, &config)));
  system::uninstall(&ctx, &config).with_context(|| format!("Failed to purge {}", ctx.name()))?;
  print_success(&format!("Purged {}", ctx.name()));

  Ok(())
}
