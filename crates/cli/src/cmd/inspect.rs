//! Implementation of the `debkit inspect` command.
//!
//! Substitutes and parses the manifest, then prints the node tree without
//! touching the build directory.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use debkit_lib::manifest::{self, Node};
use debkit_lib::pipeline;

use crate::PackageArgs;
use crate::output::{OutputFormat, print_json, print_summary};

pub fn cmd_inspect(args: &PackageArgs, id: Option<&str>, format: OutputFormat) -> Result<()> {
  let (ctx, config) = super::setup(args)?;

  let root = pipeline::load(&ctx, &config)
    .with_context(|| format!("Failed to load manifest: {}", config.manifest_path().display()))?;
  let node = match id {
    Some(id) => manifest::find_by_id(&root, id)?,
    None => &root,
  };

  if format.is_json() {
    return print_json(node);
  }

  for line in render_tree(node) {
    println!("{}", line);
  }
  println!();
  print_summary(&[("Nodes", node.count().to_string())]);

  Ok(())
}

/// One line per node, two spaces of indentation per level.
fn render_tree(root: &Node) -> Vec<String> {
  let mut lines = Vec::new();
  walk(root, 0, &mut lines);
  lines
}

fn walk(node: &Node, depth: usize, lines: &mut Vec<String>) {
  let indent = "  ".repeat(depth);
  let mut line = match node {
    Node::Dir(dir) => format!("{}{}/", indent, dir.name),
    Node::File(file) => format!("{}{} ({})", indent, file.name, file.source.kind()),
  };
  if let Some(mode) = node.mode() {
    line.push_str(&format!(" [{}]", mode));
  }
  if let Some(id) = node.id() {
    let tag = format!("#{}", id);
    line.push_str(&format!(" {}", tag.if_supports_color(Stream::Stdout, |s| s.dimmed())));
  }
  lines.push(line);

  if let Node::Dir(dir) = node {
    for child in &dir.children {
      walk(child, depth + 1, lines);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_nested_tree() {
    let root = manifest::parse(
      r#"<pkg><DEBIAN mode="0755"><file type="file" name="control">Package: x</file></DEBIAN><file type="file" name="bin" src="target/x"/></pkg>"#,
    )
    .unwrap();

    let lines = render_tree(&root);

    assert_eq!(lines[0], "pkg/");
    assert_eq!(lines[1], "  DEBIAN/ [0755]");
    assert_eq!(lines[2], "    control (inline)");
    assert_eq!(lines[3], "  bin (copy)");
  }
}
