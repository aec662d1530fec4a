mod clean;
mod inspect;
mod install;
mod package;
mod uninstall;

pub use clean::cmd_clean;
pub use inspect::cmd_inspect;
pub use install::cmd_install;
pub use package::cmd_package;
pub use uninstall::cmd_uninstall;

use anyhow::{Context, Result};
use tracing::debug;

use debkit_lib::config::Config;
use debkit_lib::context::VariableContext;

use crate::PackageArgs;

/// Build the variable context and the environment-driven config.
fn setup(args: &PackageArgs) -> Result<(VariableContext, Config)> {
  let ctx = VariableContext::new(&args.name, &args.version, &args.arch).context("Invalid package parameters")?;
  Ok((ctx, config()?))
}

fn config() -> Result<Config> {
  let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
  let config = Config::from_env(work_dir);
  debug!(?config, "configuration loaded");
  Ok(config)
}
