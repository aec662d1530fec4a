//! External tool invocation.
//!
//! Commands are described as data first ([`Invocation`]) so callers can show
//! or test them without spawning anything, then run with [`run`].

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to start `{command}`: {source}")]
  Spawn { command: String, source: io::Error },

  #[error("`{command}` exited with {}", .code.map(|c| format!("status {c}")).unwrap_or_else(|| "a signal".to_string()))]
  Failed { command: String, code: Option<i32>, stderr: String },
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  /// Prefix the invocation with `sudo` when `elevate` is set.
  pub fn elevated(self, elevate: bool) -> Self {
    if !elevate {
      return self;
    }
    let mut args = Vec::with_capacity(self.args.len() + 1);
    args.push(self.program);
    args.extend(self.args);
    Self {
      program: "sudo".to_string(),
      args,
    }
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Run `invocation` in `cwd`, inheriting the environment.
///
/// Returns trimmed stdout. A non-zero exit is an error carrying stderr.
pub fn run(invocation: &Invocation, cwd: &Path) -> Result<String, ProcessError> {
  let command = invocation.to_string();
  info!(command = %command, cwd = %cwd.display(), "running command");

  let output = Command::new(&invocation.program)
    .args(&invocation.args)
    .current_dir(cwd)
    .output()
    .map_err(|source| ProcessError::Spawn {
      command: command.clone(),
      source,
    })?;

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

  if !output.status.success() {
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(ProcessError::Failed {
      command,
      code: output.status.code(),
      stderr,
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }
  Ok(stdout)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn display_joins_arguments() {
    let inv = Invocation::new("dpkg").arg("-i").arg("foo_1.0_amd64.deb");
    assert_eq!(inv.to_string(), "dpkg -i foo_1.0_amd64.deb");
  }

  #[test]
  fn elevation_prefixes_sudo() {
    let inv = Invocation::new("dpkg").arg("-P").arg("foo").elevated(true);
    assert_eq!(inv.program, "sudo");
    assert_eq!(inv.args, vec!["dpkg", "-P", "foo"]);
    assert_eq!(inv.to_string(), "sudo dpkg -P foo");
  }

  #[test]
  fn elevation_can_be_skipped() {
    let inv = Invocation::new("dpkg").arg("-P").arg("foo").elevated(false);
    assert_eq!(inv.to_string(), "dpkg -P foo");
  }

  #[test]
  fn missing_program_fails_to_spawn() {
    let temp = TempDir::new().unwrap();
    let err = run(&Invocation::new("debkit-no-such-program-xyz"), temp.path()).unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
  }

  #[cfg(unix)]
  #[test]
  fn captures_stdout() {
    let temp = TempDir::new().unwrap();
    let inv = Invocation::new("sh").arg("-c").arg("echo hello");
    assert_eq!(run(&inv, temp.path()).unwrap(), "hello");
  }

  #[cfg(unix)]
  #[test]
  fn non_zero_exit_carries_stderr() {
    let temp = TempDir::new().unwrap();
    let inv = Invocation::new("sh").arg("-c").arg("echo broken >&2; exit 3");

    match run(&inv, temp.path()).unwrap_err() {
      ProcessError::Failed { code, stderr, .. } => {
        assert_eq!(code, Some(3));
        assert_eq!(stderr, "broken");
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
