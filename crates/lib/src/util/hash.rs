//! Tree digests for reproducibility checks.
//!
//! [`hash_tree`] folds the relative path, kind, permission bits and content
//! hash of every entry under a directory into one SHA-256. Two builds from
//! identical inputs must produce the same digest.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// A 64-character lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TreeDigest(pub String);

impl TreeDigest {
  /// Leading characters, for display.
  pub fn short(&self) -> &str {
    &self.0[..self.0.len().min(12)]
  }
}

impl std::fmt::Display for TreeDigest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
  #[error("failed to walk {path}: {message}")]
  Walk { path: String, message: String },

  #[error("failed to read {path}: {message}")]
  ReadFile { path: String, message: String },
}

/// Digest every entry below `root` (the root itself excluded).
///
/// Entries are visited in file-name order. Each contributes one line:
/// `D:<path>:<mode>`, `F:<path>:<mode>:<sha256>` or `L:<path>:<target>`.
/// Sockets, devices and other special files are skipped.
pub fn hash_tree(root: &Path) -> Result<TreeDigest, DigestError> {
  let mut lines: Vec<(String, String)> = Vec::new();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.map_err(|e| DigestError::Walk {
      path: root.display().to_string(),
      message: e.to_string(),
    })?;
    let path = entry.path();

    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/");
    if rel.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    let line = if file_type.is_symlink() {
      let target = fs::read_link(path).map_err(|e| DigestError::ReadFile {
        path: path.display().to_string(),
        message: e.to_string(),
      })?;
      format!("L:{}:{}", rel, target.to_string_lossy())
    } else if file_type.is_dir() {
      format!("D:{}:{:04o}", rel, mode_bits(path)?)
    } else if file_type.is_file() {
      format!("F:{}:{:04o}:{}", rel, mode_bits(path)?, hash_file(path)?)
    } else {
      continue;
    };

    lines.push((rel, line));
  }

  lines.sort_by(|a, b| a.0.cmp(&b.0));

  let mut hasher = Sha256::new();
  for (_, line) in lines {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }

  Ok(TreeDigest(hex::encode(hasher.finalize())))
}

/// SHA-256 of a file's contents, lowercase hex.
pub fn hash_file(path: &Path) -> Result<String, DigestError> {
  let read_err = |e: std::io::Error| DigestError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let n = file.read(&mut buffer).map_err(read_err)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }

  Ok(hex::encode(hasher.finalize()))
}

#[cfg(unix)]
fn mode_bits(path: &Path) -> Result<u32, DigestError> {
  use std::os::unix::fs::PermissionsExt;

  fs::symlink_metadata(path)
    .map(|m| m.permissions().mode() & 0o7777)
    .map_err(|e| DigestError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })
}

#[cfg(not(unix))]
fn mode_bits(_path: &Path) -> Result<u32, DigestError> {
  Ok(0)
}
