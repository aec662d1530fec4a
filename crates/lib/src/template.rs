//! Placeholder substitution over raw manifest text.
//!
//! Substitution runs before the manifest is parsed, so variables may appear
//! anywhere in the document: element text, attribute values, even tag names.
//!
//! # Passes
//!
//! 1. The reserved sentinel `{DEB_DIR}` is replaced literally with the package
//!    directory identifier.
//! 2. Every remaining `{key}` is replaced with the context value for `key`.
//!
//! The second pass is a single scan: substituted values are never re-scanned,
//! and a key without a value aborts the whole substitution.
//!
//! # Escaping
//!
//! `{{` produces a literal `{` and `}}` a literal `}`. A lone `}` passes
//! through unchanged. Shell snippets in maintainer scripts therefore write
//! `${{HOME}}` to get `${HOME}`.
//!
//! # Example
//!
//! ```
//! use debkit_lib::context::VariableContext;
//! use debkit_lib::template::render;
//!
//! let ctx = VariableContext::new("foo", "2.0", "arm64").unwrap();
//! let out = render("<dir name=\"{DEB_DIR}\">Package: {name}</dir>", &ctx).unwrap();
//! assert_eq!(out, "<dir name=\"foo_2.0_arm64\">Package: foo</dir>");
//! ```

use thiserror::Error;

use crate::consts::DEB_DIR_SENTINEL;
use crate::context::VariableContext;
use crate::error::ErrorKind;

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text, escapes already collapsed.
  Literal(String),

  /// A `{key}` reference; `position` is the byte offset of the opening brace.
  Variable { key: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("undefined variable '{key}' at position {position}")]
  UndefinedVariable { key: String, position: usize },

  #[error("unterminated placeholder at position {0}")]
  Unterminated(usize),
}

impl TemplateError {
  pub fn kind(&self) -> ErrorKind {
    ErrorKind::UndefinedVariable
  }
}

/// Source of values for `{key}` placeholders.
pub trait Variables {
  fn lookup(&self, key: &str) -> Option<&str>;
}

impl Variables for VariableContext {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key)
  }
}

/// Parse template text into literal and variable segments.
///
/// # Errors
///
/// Returns [`TemplateError::Unterminated`] if a `{` has no closing `}`.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    match ch {
      '{' => {
        if let Some((_, '{')) = chars.peek() {
          chars.next();
          literal.push('{');
          continue;
        }

        let mut key = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          key.push(c);
        }

        if !closed {
          return Err(TemplateError::Unterminated(pos));
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable { key, position: pos });
      }
      '}' => {
        if let Some((_, '}')) = chars.peek() {
          chars.next();
        }
        literal.push('}');
      }
      _ => literal.push(ch),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Substitute pre-parsed segments.
///
/// Keys that are not identifiers (`{ }`, `{a b}`) can never have a value and
/// are reported as undefined like any other missing key.
pub fn substitute_segments(segments: &[Segment], vars: &impl Variables) -> Result<String, TemplateError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Variable { key, position } => {
        let value = vars
          .lookup(key)
          .ok_or_else(|| TemplateError::UndefinedVariable {
            key: key.clone(),
            position: *position,
          })?;
        result.push_str(value);
      }
    }
  }

  Ok(result)
}

/// Parse and substitute in one step.
pub fn substitute(input: &str, vars: &impl Variables) -> Result<String, TemplateError> {
  let segments = parse(input)?;
  substitute_segments(&segments, vars)
}

/// Run both passes over a raw manifest document.
///
/// Error positions refer to the text after the sentinel pass.
pub fn render(raw: &str, ctx: &VariableContext) -> Result<String, TemplateError> {
  let expanded = raw.replace(DEB_DIR_SENTINEL, ctx.package_dir());
  substitute(&expanded, ctx)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  struct TestVars(HashMap<&'static str, &'static str>);

  impl Variables for TestVars {
    fn lookup(&self, key: &str) -> Option<&str> {
      self.0.get(key).copied()
    }
  }

  fn ctx() -> VariableContext {
    VariableContext::new("foo", "2.0", "arm64").unwrap()
  }

  // ==========================================================================
  // Realistic Scenario Tests
  // ==========================================================================

  #[test]
  fn control_file_fields() {
    let out = render("Package: {name}\nVersion: {version}\nArchitecture: {arch}", &ctx()).unwrap();
    assert_eq!(out, "Package: foo\nVersion: 2.0\nArchitecture: arm64");
  }

  #[test]
  fn sentinel_in_attribute() {
    let out = render(r#"<package name="{DEB_DIR}"/>"#, &ctx()).unwrap();
    assert_eq!(out, r#"<package name="foo_2.0_arm64"/>"#);
  }

  #[test]
  fn shell_variables_use_escaped_braces() {
    let script = "#!/bin/sh\nmkdir -p \"${{HOME}}/.config/{name}\"";
    let out = render(script, &ctx()).unwrap();
    assert_eq!(out, "#!/bin/sh\nmkdir -p \"${HOME}/.config/foo\"");
  }

  #[test]
  fn substituted_values_are_not_rescanned() {
    let vars = TestVars(HashMap::from([("a", "{b}"), ("b", "nope")]));
    assert_eq!(substitute("x{a}y", &vars).unwrap(), "x{b}y");
  }

  #[test]
  fn adjacent_placeholders() {
    let out = render("{name}{version}{arch}", &ctx()).unwrap();
    assert_eq!(out, "foo2.0arm64");
  }

  // ==========================================================================
  // Parsing
  // ==========================================================================

  #[test]
  fn parse_mixed_segments() {
    let segments = parse("a{name}b").unwrap();
    assert_eq!(
      segments,
      vec![
        Segment::Literal("a".to_string()),
        Segment::Variable {
          key: "name".to_string(),
          position: 1
        },
        Segment::Literal("b".to_string()),
      ]
    );
  }

  #[test]
  fn parse_collapses_escapes() {
    assert_eq!(parse("{{x}}").unwrap(), vec![Segment::Literal("{x}".to_string())]);
  }

  #[test]
  fn lone_closing_brace_preserved() {
    assert_eq!(substitute("a } b", &ctx()).unwrap(), "a } b");
  }

  #[test]
  fn empty_input() {
    assert!(parse("").unwrap().is_empty());
    assert_eq!(render("", &ctx()).unwrap(), "");
  }

  // ==========================================================================
  // Errors
  // ==========================================================================

  #[test]
  fn error_undefined_variable() {
    let err = render("Maintainer: {maintainer}", &ctx()).unwrap_err();
    assert_eq!(
      err,
      TemplateError::UndefinedVariable {
        key: "maintainer".to_string(),
        position: 12
      }
    );
    assert_eq!(err.kind(), ErrorKind::UndefinedVariable);
  }

  #[test]
  fn error_unescaped_shell_variable() {
    let err = render("echo ${HOME}", &ctx()).unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedVariable { ref key, .. } if key == "HOME"));
  }

  #[test]
  fn error_unterminated() {
    assert_eq!(render("abc {name", &ctx()).unwrap_err(), TemplateError::Unterminated(4));
    assert_eq!(TemplateError::Unterminated(0).kind(), ErrorKind::UndefinedVariable);
  }

  #[test]
  fn error_non_identifier_key() {
    let err = render("awk '{ print $1 }'", &ctx()).unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedVariable { ref key, .. } if key == " print $1 "));
  }
}
