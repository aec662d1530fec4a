//! Content placement: inline text, byte copies and compression.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use tracing::debug;

use super::BuildError;
use crate::manifest::Compression;

/// Normalize inline text the way maintainers write it inside the manifest.
///
/// Surrounding blank space is dropped, every line loses its leading
/// indentation, and the result ends with exactly one newline.
pub fn dedent(text: &str) -> String {
  let mut out = text.trim().lines().map(str::trim_start).collect::<Vec<_>>().join("\n");
  out.push('\n');
  out
}

/// Write dedented inline text to `dest`, returning the number of bytes written.
pub fn write_inline(text: &str, dest: &Path) -> Result<u64, BuildError> {
  let content = dedent(text);
  fs::write(dest, &content).map_err(|source| BuildError::Write {
    path: dest.to_path_buf(),
    source,
  })?;
  Ok(content.len() as u64)
}

/// Copy `src` to `dest` byte-for-byte.
///
/// Only the bytes are copied: `dest` gets default permissions regardless of
/// the source's mode.
pub fn copy_bytes(src: &Path, dest: &Path) -> Result<u64, BuildError> {
  let input = File::open(src).map_err(|source| BuildError::ReadSource {
    path: src.to_path_buf(),
    source,
  })?;
  let output = File::create(dest).map_err(|source| BuildError::Write {
    path: dest.to_path_buf(),
    source,
  })?;

  let mut reader = BufReader::new(input);
  let mut writer = BufWriter::new(output);
  let copied = io::copy(&mut reader, &mut writer)
    .and_then(|n| writer.flush().map(|_| n))
    .map_err(|source| BuildError::Write {
      path: dest.to_path_buf(),
      source,
    })?;

  debug!(src = %src.display(), dest = %dest.display(), bytes = copied, "copied file");
  Ok(copied)
}

/// Compress `src` into `dest` with the given algorithm.
///
/// gzip runs at maximum compression with an empty header (no name, zero
/// mtime), so identical input always yields identical output.
pub fn compress(src: &Path, dest: &Path, algorithm: Compression) -> Result<u64, BuildError> {
  if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let input = File::open(src).map_err(|source| BuildError::ReadSource {
    path: src.to_path_buf(),
    source,
  })?;
  let output = File::create(dest).map_err(|source| BuildError::Compress {
    src: src.to_path_buf(),
    dest: dest.to_path_buf(),
    source,
  })?;

  let result = match algorithm {
    Compression::Gzip => {
      let mut encoder = GzEncoder::new(BufWriter::new(output), flate2::Compression::best());
      io::copy(&mut BufReader::new(input), &mut encoder)
        .and_then(|n| encoder.finish().and_then(|mut w| w.flush()).map(|_| n))
    }
  };

  let read = result.map_err(|source| BuildError::Compress {
    src: src.to_path_buf(),
    dest: dest.to_path_buf(),
    source,
  })?;

  debug!(src = %src.display(), dest = %dest.display(), bytes_in = read, algorithm = ?algorithm, "compressed file");
  Ok(read)
}

#[cfg(test)]
mod tests {
  use super::*;
  use flate2::read::GzDecoder;
  use std::io::Read;
  use tempfile::TempDir;

  #[test]
  fn dedent_strips_indentation_and_terminates() {
    assert_eq!(dedent("  hello\n  world"), "hello\nworld\n");
  }

  #[test]
  fn dedent_trims_surrounding_blank_lines() {
    let text = "\n      Package: foo\n      Depends: libc6\n    ";
    assert_eq!(dedent(text), "Package: foo\nDepends: libc6\n");
  }

  #[test]
  fn dedent_keeps_inner_blank_lines_and_trailing_spaces() {
    assert_eq!(dedent("a  \n\n   b"), "a  \n\nb\n");
  }

  #[test]
  fn dedent_flattens_nested_indentation() {
    let script = "#!/bin/sh\n    set -e\n    if true; then\n        echo ok\n    fi";
    assert_eq!(dedent(script), "#!/bin/sh\nset -e\nif true; then\necho ok\nfi\n");
  }

  #[test]
  fn copy_preserves_bytes() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.bin");
    let dest = temp.path().join("dest.bin");
    let bytes: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    fs::write(&src, &bytes).unwrap();

    let n = copy_bytes(&src, &dest).unwrap();

    assert_eq!(n, 10_000);
    assert_eq!(fs::read(&dest).unwrap(), bytes);
  }

  #[test]
  fn copy_missing_source() {
    let temp = TempDir::new().unwrap();
    let err = copy_bytes(&temp.path().join("nope"), &temp.path().join("out")).unwrap_err();
    assert!(matches!(err, BuildError::ReadSource { .. }));
    assert!(!temp.path().join("out").exists());
  }

  #[test]
  fn gzip_round_trips_and_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("changelog");
    fs::write(&src, "foo (1.0) unstable; urgency=low\n".repeat(50)).unwrap();

    let first = temp.path().join("a/changelog.gz");
    let second = temp.path().join("b/changelog.gz");
    compress(&src, &first, Compression::Gzip).unwrap();
    compress(&src, &second, Compression::Gzip).unwrap();

    let compressed = fs::read(&first).unwrap();
    assert_eq!(compressed, fs::read(&second).unwrap());
    assert!(compressed.len() < fs::metadata(&src).unwrap().len() as usize);

    let mut decoded = String::new();
    GzDecoder::new(&compressed[..]).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, fs::read_to_string(&src).unwrap());
  }
}
