//! Implementation of the `debkit clean` command.

use anyhow::{Context, Result};

use debkit_lib::system;

use crate::output::{print_info, print_removed, print_success};

pub fn cmd_clean() -> Result<()> {
  let config = super::config()?;
  let removed = system::clean(&config).context("Failed to clean build output")?;

  if removed.is_empty() {
    print_info("Nothing to clean");
    return Ok(());
  }

  for path in &removed {
    let shown = path.strip_prefix(config.work_dir()).unwrap_or(path);
    print_removed(shown);
  }
  print_success(&format!("Removed {} path(s)", removed.len()));

  Ok(())
}
