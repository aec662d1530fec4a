//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated working directory with a manifest at the default location.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Copy a fixture to `scripts/manifest.xml`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.write_file("scripts/manifest.xml", &fixture_content(name));
    env
  }

  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the working directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// A `debkit` command running in the working directory with the
  /// `DEBKIT_*` overrides cleared.
  pub fn debkit_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("debkit");
    cmd.current_dir(self.path());
    cmd.env_remove("DEBKIT_MANIFEST");
    cmd.env_remove("DEBKIT_BUILD_DIR");
    cmd.env("DEBKIT_SUDO", "0");
    cmd
  }
}

/// Whether `dpkg-deb` is available on this host.
pub fn has_dpkg_deb() -> bool {
  std::process::Command::new("dpkg-deb")
    .arg("--version")
    .output()
    .map(|o| o.status.success())
    .unwrap_or(false)
}
