//! Permission bits.

use std::path::Path;

use super::BuildError;

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<(), BuildError> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|source| BuildError::Permissions {
    path: path.to_path_buf(),
    mode,
    source,
  })
}

#[cfg(not(unix))]
pub fn set_mode(path: &Path, mode: u32) -> Result<(), BuildError> {
  tracing::debug!(path = %path.display(), mode = %format!("{:04o}", mode), "permission bits not supported, skipping");
  Ok(())
}

#[cfg(unix)]
pub fn current_mode(path: &Path) -> Result<u32, BuildError> {
  use std::os::unix::fs::PermissionsExt;

  let metadata = std::fs::metadata(path).map_err(|source| BuildError::Write {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
pub fn current_mode(_path: &Path) -> Result<u32, BuildError> {
  Ok(0o644)
}

/// Give the owner full access to every directory under `path` so the tree can
/// be removed. Each directory is opened up before it is listed, which covers
/// modes like `0555` and `0000`. Failures are left for the removal to report.
#[cfg(unix)]
pub fn make_removable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;

  let Ok(metadata) = std::fs::symlink_metadata(path) else {
    return;
  };
  if !metadata.is_dir() {
    return;
  }

  let mode = metadata.permissions().mode() & 0o7777;
  if mode & 0o700 != 0o700 {
    let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o700));
  }

  if let Ok(entries) = std::fs::read_dir(path) {
    for entry in entries.flatten() {
      make_removable(&entry.path());
    }
  }
}

#[cfg(not(unix))]
pub fn make_removable(_path: &Path) {}
