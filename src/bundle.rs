//! The bundler abstraction consumed by [`normalize`](crate::normalize).
//!
//! The normalizer never reads files itself. It works against a parser that
//! has already bundled one root document — inlining external `$ref` targets
//! by splicing the loaded node into every use site — and can parse further
//! files on demand (discriminator mappings routinely name files the bundler
//! never touched).

use serde::{Deserialize, Serialize};

use crate::dom::Node;
use crate::error::NormalizeError;

/// Options forwarded to [`BundledParser::parse`] for on-demand loads.
///
/// Serialized in `kebab-case`; the field names are part of the public
/// contract for config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParseOptions {
    /// Dereference external file refs while parsing. Leaving this off keeps
    /// loaded files as raw templates, which lets the source-template pass
    /// rewrite their file refs into component pointers.
    pub dereference: bool,
    /// Maximum dereference depth (guard against pathological ref chains).
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dereference: true,
            max_depth: 100,
        }
    }
}

/// A bundled document plus access to the files behind it.
pub trait BundledParser {
    /// Handle to the mutable document tree. The normalizer mutates it in
    /// place.
    fn document(&self) -> Node;

    /// The ordered list of resources the bundler touched; the first entry is
    /// the root document. `None` means the metadata is unavailable, which
    /// makes [`normalize`](crate::normalize) a no-op.
    fn loaded_paths(&self) -> Option<Vec<String>>;

    /// The already-parsed value for a path the bundler (or a later
    /// [`parse`](Self::parse) call) loaded.
    fn get_loaded(&self, path: &str) -> Option<Node>;

    /// Parse a previously-untouched file.
    fn parse(&mut self, path: &str, options: &ParseOptions) -> Result<Node, NormalizeError>;
}
