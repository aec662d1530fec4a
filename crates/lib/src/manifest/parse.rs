//! XML → [`Node`] tree.
//!
//! Uses the `quick-xml` event reader and keeps a stack of open elements.
//! Each element is turned into a typed node when its end tag is seen, which
//! is where all attribute validation happens.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use super::types::{Compression, ContentSource, DirNode, FileNode, Mode, Node};
use super::ManifestError;

const COMMON_ATTRS: [&str; 4] = ["type", "name", "id", "mode"];
const FILE_ATTRS: [&str; 4] = ["src", "src-before", "src-after", "compress"];

/// Parse a substituted manifest into its root node.
///
/// # Errors
///
/// - [`ManifestError::Xml`] / [`ManifestError::Malformed`] for documents that
///   are not well-formed or describe an invalid tree
/// - [`ManifestError::UnknownNodeType`] for a `type` other than `dir`/`file`
/// - [`ManifestError::ConflictingSources`] for file nodes with several sources
/// - [`ManifestError::EmptyFileNode`] for file nodes with none
/// - [`ManifestError::UnsupportedCompression`] for algorithms other than gzip
pub fn parse(text: &str) -> Result<Node, ManifestError> {
  let mut reader = Reader::from_str(text);
  let mut stack: Vec<Element> = Vec::new();
  let mut root: Option<Node> = None;

  loop {
    let position = reader.buffer_position() as u64;
    let event = reader.read_event().map_err(|e| ManifestError::Xml {
      position,
      message: e.to_string(),
    })?;

    match event {
      Event::Start(start) => {
        stack.push(Element::open(&start, position)?);
      }
      Event::Empty(start) => {
        let node = Element::open(&start, position)?.finish()?;
        attach(node, &mut stack, &mut root)?;
      }
      Event::End(_) => {
        let element = stack
          .pop()
          .ok_or_else(|| ManifestError::Malformed(format!("unexpected end tag at position {}", position)))?;
        let node = element.finish()?;
        attach(node, &mut stack, &mut root)?;
      }
      Event::Text(text) => {
        let text = text.unescape().map_err(|e| ManifestError::Xml {
          position,
          message: e.to_string(),
        })?;
        push_text(&text, &mut stack, position)?;
      }
      Event::CData(cdata) => {
        let text = std::str::from_utf8(&cdata).map_err(|e| ManifestError::Xml {
          position,
          message: e.to_string(),
        })?;
        push_text(text, &mut stack, position)?;
      }
      Event::Eof => break,
      // Declarations, comments, processing instructions and doctypes carry
      // nothing for the tree.
      _ => {}
    }
  }

  if let Some(open) = stack.last() {
    return Err(ManifestError::Malformed(format!(
      "element <{}> opened at position {} is never closed",
      open.tag, open.position
    )));
  }

  let root = root.ok_or_else(|| ManifestError::Malformed("document has no root element".to_string()))?;

  if let Node::File(f) = &root {
    return Err(ManifestError::Malformed(format!(
      "root element must be a directory, found file node '{}'",
      f.name
    )));
  }

  debug!(root = %root.name(), nodes = root.count(), "parsed manifest");
  Ok(root)
}

fn attach(node: Node, stack: &mut [Element], root: &mut Option<Node>) -> Result<(), ManifestError> {
  if let Some(parent) = stack.last_mut() {
    parent.children.push(node);
    return Ok(());
  }

  if root.is_some() {
    return Err(ManifestError::Malformed(format!(
      "multiple root elements (second root '{}')",
      node.name()
    )));
  }

  *root = Some(node);
  Ok(())
}

fn push_text(text: &str, stack: &mut [Element], position: u64) -> Result<(), ManifestError> {
  match stack.last_mut() {
    Some(element) => {
      element.text.push_str(text);
      Ok(())
    }
    None if text.trim().is_empty() => Ok(()),
    None => Err(ManifestError::Malformed(format!(
      "text outside the root element at position {}",
      position
    ))),
  }
}

/// An element whose end tag has not been seen yet.
struct Element {
  tag: String,
  attrs: BTreeMap<String, String>,
  text: String,
  children: Vec<Node>,
  position: u64,
}

impl Element {
  fn open(start: &BytesStart<'_>, position: u64) -> Result<Self, ManifestError> {
    let tag = utf8(start.name().as_ref(), position)?;
    let mut attrs = BTreeMap::new();

    for attr in start.attributes() {
      let attr = attr.map_err(|e| ManifestError::Xml {
        position,
        message: e.to_string(),
      })?;
      let key = utf8(attr.key.as_ref(), position)?;
      let value = attr
        .unescape_value()
        .map_err(|e| ManifestError::Xml {
          position,
          message: e.to_string(),
        })?
        .into_owned();
      attrs.insert(key, value);
    }

    Ok(Self {
      tag,
      attrs,
      text: String::new(),
      children: Vec::new(),
      position,
    })
  }

  fn finish(self) -> Result<Node, ManifestError> {
    let is_file = match self.attrs.get("type").map(String::as_str) {
      None | Some("dir") | Some("directory") => false,
      Some("file") => true,
      Some(other) => {
        return Err(ManifestError::UnknownNodeType {
          element: self.tag.clone(),
          value: other.to_string(),
        });
      }
    };

    let name = match self.attrs.get("name") {
      Some(name) => name.trim().to_string(),
      None => self.tag.clone(),
    };
    validate_name(&name, &self.tag)?;

    for key in self.attrs.keys() {
      let known = COMMON_ATTRS.contains(&key.as_str()) || FILE_ATTRS.contains(&key.as_str());
      if !known && !key.starts_with("xmlns") {
        return Err(ManifestError::Malformed(format!("unknown attribute '{}' on '{}'", key, name)));
      }
    }

    let id = self.attrs.get("id").cloned();
    let mode = match self.attrs.get("mode") {
      Some(raw) => Some(
        Mode::parse(raw)
          .ok_or_else(|| ManifestError::Malformed(format!("invalid octal mode '{}' on '{}'", raw, name)))?,
      ),
      None => None,
    };

    if is_file {
      self.finish_file(name, id, mode)
    } else {
      self.finish_dir(name, id, mode)
    }
  }

  fn finish_dir(self, name: String, id: Option<String>, mode: Option<Mode>) -> Result<Node, ManifestError> {
    if let Some(attr) = FILE_ATTRS.iter().find(|a| self.attrs.contains_key(**a)) {
      return Err(ManifestError::Malformed(format!(
        "directory '{}' carries file attribute '{}' (missing type=\"file\"?)",
        name, attr
      )));
    }

    if !self.text.trim().is_empty() {
      return Err(ManifestError::Malformed(format!(
        "directory '{}' contains text (missing type=\"file\"?)",
        name
      )));
    }

    Ok(Node::Dir(DirNode {
      name,
      id,
      mode,
      children: self.children,
    }))
  }

  fn finish_file(self, name: String, id: Option<String>, mode: Option<Mode>) -> Result<Node, ManifestError> {
    if !self.children.is_empty() {
      return Err(ManifestError::Malformed(format!(
        "file '{}' contains child elements",
        name
      )));
    }

    let mut found: Vec<(&'static str, ContentSource)> = Vec::new();

    if let Some(source) = compressed_source(&self.attrs, &name)? {
      found.push(("src-before/src-after/compress", source));
    }
    if let Some(src) = self.attrs.get("src") {
      found.push(("src", ContentSource::Copy {
        src: path_attr(src, "src", &name)?,
      }));
    }
    if !self.text.trim().is_empty() {
      found.push(("inline text", ContentSource::Inline { text: self.text }));
    }

    if found.len() > 1 {
      return Err(ManifestError::ConflictingSources {
        name,
        sources: found.iter().map(|(label, _)| *label).collect(),
      });
    }

    let (_, source) = found.pop().ok_or_else(|| ManifestError::EmptyFileNode(name.clone()))?;

    Ok(Node::File(FileNode { name, id, mode, source }))
  }
}

fn compressed_source(attrs: &BTreeMap<String, String>, name: &str) -> Result<Option<ContentSource>, ManifestError> {
  let before = attrs.get("src-before");
  let after = attrs.get("src-after");
  let algorithm = attrs.get("compress");

  match (before, after, algorithm) {
    (None, None, None) => Ok(None),
    (Some(before), Some(after), Some(algorithm)) => {
      let algorithm = algorithm.trim();
      let algo = Compression::from_name(algorithm).ok_or_else(|| ManifestError::UnsupportedCompression {
        name: name.to_string(),
        algorithm: algorithm.to_string(),
      })?;
      Ok(Some(ContentSource::Compressed {
        src: path_attr(before, "src-before", name)?,
        intermediate: path_attr(after, "src-after", name)?,
        algorithm: algo,
      }))
    }
    _ => {
      let missing: Vec<&str> = [("src-before", before), ("src-after", after), ("compress", algorithm)]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k)
        .collect();
      Err(ManifestError::Malformed(format!(
        "file '{}' has an incomplete compression source (missing {})",
        name,
        missing.join(", ")
      )))
    }
  }
}

fn path_attr(value: &str, attr: &str, name: &str) -> Result<PathBuf, ManifestError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ManifestError::Malformed(format!("file '{}' has an empty '{}' attribute", name, attr)));
  }
  Ok(PathBuf::from(value))
}

/// Names are relative paths that stay inside their parent directory.
fn validate_name(name: &str, tag: &str) -> Result<(), ManifestError> {
  if name.is_empty() {
    return Err(ManifestError::Malformed(format!("<{}> has an empty name", tag)));
  }

  let path = Path::new(name);
  let mut normal = 0;
  for component in path.components() {
    match component {
      Component::Normal(_) => normal += 1,
      Component::CurDir => {}
      _ => {
        return Err(ManifestError::Malformed(format!(
          "name '{}' on <{}> must be a relative path without '..'",
          name, tag
        )));
      }
    }
  }

  if normal == 0 {
    return Err(ManifestError::Malformed(format!("name '{}' on <{}> names no entry", name, tag)));
  }

  Ok(())
}

fn utf8(bytes: &[u8], position: u64) -> Result<String, ManifestError> {
  std::str::from_utf8(bytes)
    .map(str::to_string)
    .map_err(|e| ManifestError::Xml {
      position,
      message: e.to_string(),
    })
}
