//! debkit-lib: manifest-driven package tree builder
//!
//! This crate turns a declarative XML manifest into a concrete filesystem tree
//! and hands the result to `dpkg-deb`:
//! - `context`: the build parameters (`name`, `version`, `arch`)
//! - `template`: `{key}` substitution over the raw manifest text
//! - `manifest`: parsing into a typed tree of directory and file nodes
//! - `builder`: recursive materialization of that tree on disk
//! - `package`: the archiving backend and artifact relocation
//! - `pipeline`: the stages above wired together
//! - `system`: install, uninstall and clean via `dpkg` and the filesystem
//! - `config`: environment-driven paths and flags

pub mod builder;
pub mod config;
pub mod consts;
pub mod context;
pub mod error;
pub mod manifest;
pub mod package;
pub mod pipeline;
pub mod system;
pub mod template;
pub mod util;

pub use error::{Error, ErrorKind, Result};
