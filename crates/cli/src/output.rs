//! Terminal output for debkit commands.
//!
//! Status lines go to stdout except failures, which go to stderr. Colors are
//! only used when the stream supports them.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use debkit_lib::builder::PlacedFile;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const INFO: &str = "•";
  pub const ERROR: &str = "✗";
  pub const PLACED: &str = "+";
  pub const REMOVED: &str = "-";
}

/// Size with a binary unit, one decimal above bytes: `512 B`, `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit + 1 < UNITS.len() {
    value /= 1024.0;
    unit += 1;
  }
  format!("{value:.1} {}", UNITS[unit])
}

/// Milliseconds below one second, fractional seconds above.
pub fn format_elapsed(elapsed: Duration) -> String {
  if elapsed < Duration::from_secs(1) {
    format!("{}ms", elapsed.as_millis())
  } else {
    format!("{:.2}s", elapsed.as_secs_f64())
  }
}

/// Octal permission bits, e.g. `0755`.
pub fn format_mode(mode: u32) -> String {
  format!("{mode:04o}")
}

/// `path (source, size) mode` for one placed file, path relative to `base`.
pub fn placed_line(file: &PlacedFile, base: &Path) -> String {
  let rel = file.path.strip_prefix(base).unwrap_or(&file.path);
  let mut line = format!("{} ({}, {})", rel.display(), file.source, format_size(file.size));
  if let Some(mode) = file.mode {
    line.push(' ');
    line.push_str(&format_mode(mode));
  }
  line
}

pub fn print_success(message: &str) {
  println!(
    "{} {message}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

pub fn print_info(message: &str) {
  println!("{} {message}", symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()));
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.bold())
  );
}

pub fn print_placed(file: &PlacedFile, base: &Path) {
  println!(
    "  {} {}",
    symbols::PLACED.if_supports_color(Stream::Stdout, |s| s.green()),
    placed_line(file, base)
  );
}

pub fn print_removed(path: &Path) {
  println!(
    "  {} {}",
    symbols::REMOVED.if_supports_color(Stream::Stdout, |s| s.red()),
    path.display()
  );
}

/// Label/value pairs with the values lined up.
pub fn print_summary(rows: &[(&str, String)]) {
  let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
  for (label, value) in rows {
    let padded = format!("{label:<width$}");
    println!("  {}  {value}", padded.if_supports_color(Stream::Stdout, |s| s.dimmed()));
  }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use debkit_lib::manifest::SourceKind;
  use std::path::PathBuf;

  fn placed(path: &str, size: u64, mode: Option<u32>) -> PlacedFile {
    PlacedFile {
      path: PathBuf::from(path),
      source: SourceKind::Inline,
      size,
      mode,
    }
  }

  #[test]
  fn sizes_use_binary_units() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(1023), "1023 B");
    assert_eq!(format_size(1536), "1.5 KiB");
    assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
  }

  #[test]
  fn elapsed_switches_to_seconds() {
    assert_eq!(format_elapsed(Duration::from_millis(42)), "42ms");
    assert_eq!(format_elapsed(Duration::from_millis(1250)), "1.25s");
    assert_eq!(format_elapsed(Duration::from_secs(90)), "90.00s");
  }

  #[test]
  fn modes_are_four_octal_digits() {
    assert_eq!(format_mode(0o755), "0755");
    assert_eq!(format_mode(0o4755), "4755");
  }

  #[test]
  fn placed_line_is_relative_to_package_root() {
    let base = Path::new("/w/build/foo_1.0_amd64");
    let file = placed("/w/build/foo_1.0_amd64/DEBIAN/postinst", 2048, Some(0o755));
    assert_eq!(placed_line(&file, base), "DEBIAN/postinst (inline, 2.0 KiB) 0755");
  }

  #[test]
  fn placed_line_omits_unset_mode() {
    let file = placed("elsewhere/readme", 12, None);
    assert_eq!(placed_line(&file, Path::new("/w/build")), "elsewhere/readme (inline, 12 B)");
  }
}
