//! Build parameters available to manifest templates.
//!
//! A [`VariableContext`] is built once from the three positional parameters
//! of a build and never changes afterwards. Besides `name`, `version` and
//! `arch` it exposes the derived package directory identifier
//! `{name}_{version}_{arch}` under the `DEB_DIR` key.

use serde::Serialize;
use thiserror::Error;

use crate::consts::DEB_DIR_KEY;
use crate::error::ErrorKind;

/// Characters that would corrupt the build path or the substituted manifest.
const FORBIDDEN_CHARS: [char; 9] = ['/', '\\', '{', '}', '<', '>', '&', '"', '\''];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
  #[error("{0} must not be empty")]
  Empty(&'static str),

  #[error("invalid {key} '{value}': {reason}")]
  InvalidValue {
    key: &'static str,
    value: String,
    reason: String,
  },
}

impl ContextError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::Usage
  }
}

/// Immutable name → value mapping used for template substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableContext {
  name: String,
  version: String,
  arch: String,
  package_dir: String,
}

impl VariableContext {
  /// Build a context from the package name, version and architecture.
  ///
  /// # Errors
  ///
  /// Returns [`ContextError`] when a value is empty or contains whitespace,
  /// path separators, braces, or XML markup characters.
  pub fn new(
    name: impl Into<String>,
    version: impl Into<String>,
    arch: impl Into<String>,
  ) -> Result<Self, ContextError> {
    let name = validate("name", name.into())?;
    let version = validate("version", version.into())?;
    let arch = validate("arch", arch.into())?;
    let package_dir = format!("{}_{}_{}", name, version, arch);

    Ok(Self {
      name,
      version,
      arch,
      package_dir,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn arch(&self) -> &str {
    &self.arch
  }

  /// The derived `{name}_{version}_{arch}` identifier.
  pub fn package_dir(&self) -> &str {
    &self.package_dir
  }

  /// Conventional artifact file name, e.g. `foo_1.0_amd64.deb`.
  pub fn artifact_name(&self, ext: &str) -> String {
    format!("{}.{}", self.package_dir, ext)
  }

  /// Look up a variable by key.
  pub fn get(&self, key: &str) -> Option<&str> {
    match key {
      "name" => Some(&self.name),
      "version" => Some(&self.version),
      "arch" => Some(&self.arch),
      DEB_DIR_KEY => Some(&self.package_dir),
      _ => None,
    }
  }

  /// All variables in a stable order.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    [
      ("name", self.name.as_str()),
      ("version", self.version.as_str()),
      ("arch", self.arch.as_str()),
      (DEB_DIR_KEY, self.package_dir.as_str()),
    ]
    .into_iter()
  }
}

fn validate(key: &'static str, value: String) -> Result<String, ContextError> {
  if value.is_empty() {
    return Err(ContextError::Empty(key));
  }

  if let Some(c) = value.chars().find(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(c)) {
    return Err(ContextError::InvalidValue {
      key,
      value: value.clone(),
      reason: format!("character {:?} is not allowed", c),
    });
  }

  Ok(value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn derives_package_dir() {
    let ctx = VariableContext::new("demo", "1.0", "amd64").unwrap();
    assert_eq!(ctx.package_dir(), "demo_1.0_amd64");
    assert_eq!(ctx.get("DEB_DIR"), Some("demo_1.0_amd64"));
    assert_eq!(ctx.artifact_name("deb"), "demo_1.0_amd64.deb");
  }

  #[test]
  fn lookup_known_and_unknown_keys() {
    let ctx = VariableContext::new("foo", "2.0", "arm64").unwrap();
    assert_eq!(ctx.get("name"), Some("foo"));
    assert_eq!(ctx.get("version"), Some("2.0"));
    assert_eq!(ctx.get("arch"), Some("arm64"));
    assert_eq!(ctx.get("maintainer"), None);
  }

  #[test]
  fn iter_yields_all_four_keys() {
    let ctx = VariableContext::new("foo", "2.0", "arm64").unwrap();
    let keys: Vec<_> = ctx.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["name", "version", "arch", "DEB_DIR"]);
    assert!(ctx.iter().all(|(_, v)| !v.is_empty()));
  }

  #[test]
  fn rejects_empty_values() {
    assert_eq!(
      VariableContext::new("", "1.0", "amd64").unwrap_err(),
      ContextError::Empty("name")
    );
    assert_eq!(
      VariableContext::new("demo", "1.0", "").unwrap_err(),
      ContextError::Empty("arch")
    );
  }

  #[test]
  fn rejects_path_and_markup_characters() {
    for bad in ["../etc", "a b", "{name}", "a<b", "x&y"] {
      let err = VariableContext::new(bad, "1.0", "amd64").unwrap_err();
      assert!(matches!(err, ContextError::InvalidValue { key: "name", .. }), "{bad}");
      assert_eq!(err.kind(), ErrorKind::Usage);
    }
  }

  #[test]
  fn accepts_debian_style_versions() {
    let ctx = VariableContext::new("libfoo-dev", "1:2.3.4-1+deb12u1~bpo", "all").unwrap();
    assert_eq!(ctx.package_dir(), "libfoo-dev_1:2.3.4-1+deb12u1~bpo_all");
  }
}
