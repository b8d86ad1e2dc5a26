//! Test-support bundler.
//!
//! [`FixtureBundler`] plays the role the normalizer assumes an upstream
//! bundler plays: it loads a root YAML/JSON document from the fixture tree,
//! dereferences whole-file external `$ref`s by splicing the *shared* loaded
//! node into every use site (establishing the identity aliasing the
//! normalizer relies on), leaves fragment refs (`./X.yaml#/...`) and local
//! pointers unresolved, and records the paths it touched in encounter
//! order. `parse` serves files the bundle never reached.

use std::collections::HashSet;
use std::fs;

use indexmap::IndexMap;
use oas_normalizer::{BundledParser, Node, NodeId, NormalizeError, ParseOptions};

pub struct FixtureBundler {
    document: Node,
    bundle_paths: Vec<String>,
    loaded: IndexMap<String, Node>,
    parsed: IndexMap<String, Node>,
    sealed: bool,
    loaded_paths_override: Option<Option<Vec<String>>>,
}

impl FixtureBundler {
    /// Bundle the document at `root_path` (relative to the crate root).
    pub fn bundle(root_path: &str) -> FixtureBundler {
        let mut bundler = FixtureBundler {
            document: Node::Null,
            bundle_paths: Vec::new(),
            loaded: IndexMap::new(),
            parsed: IndexMap::new(),
            sealed: false,
            loaded_paths_override: None,
        };
        bundler.document = bundler
            .load_file(root_path)
            .unwrap_or_else(|e| panic!("fixture {root_path} should bundle: {e}"));
        bundler.sealed = true;
        bundler
    }

    /// Simulate a parser without loaded-paths metadata.
    pub fn without_loaded_paths(mut self) -> Self {
        self.loaded_paths_override = Some(None);
        self
    }

    /// Simulate a parser reporting an empty loaded-paths list.
    pub fn with_empty_loaded_paths(mut self) -> Self {
        self.loaded_paths_override = Some(Some(Vec::new()));
        self
    }

    fn load_file(&mut self, path: &str) -> Result<Node, NormalizeError> {
        if let Some(existing) = self.loaded.get(path) {
            return Ok(existing.clone());
        }
        let node = read_node(path)?;
        self.loaded.insert(path.to_string(), node.clone());
        if !self.sealed {
            self.bundle_paths.push(path.to_string());
        }
        let mut visited = HashSet::new();
        self.dereference(&node, &directory(path), &mut visited)?;
        Ok(node)
    }

    /// Replace whole-file external refs with the shared loaded node.
    fn dereference(
        &mut self,
        node: &Node,
        dir: &str,
        visited: &mut HashSet<NodeId>,
    ) -> Result<(), NormalizeError> {
        match node {
            Node::Object(map) => {
                if let Some(id) = node.id() {
                    if !visited.insert(id) {
                        return Ok(());
                    }
                }
                let keys: Vec<String> = map.borrow().keys().cloned().collect();
                for key in keys {
                    let Some(child) = map.borrow().get(&key).cloned() else {
                        continue;
                    };
                    if let Some(replacement) = self.resolve_whole_file_ref(&child, dir)? {
                        map.borrow_mut().insert(key, replacement);
                        continue;
                    }
                    self.dereference(&child, dir, visited)?;
                }
            }
            Node::Array(arr) => {
                if let Some(id) = node.id() {
                    if !visited.insert(id) {
                        return Ok(());
                    }
                }
                let len = arr.borrow().len();
                for index in 0..len {
                    let Some(child) = arr.borrow().get(index).cloned() else {
                        continue;
                    };
                    if let Some(replacement) = self.resolve_whole_file_ref(&child, dir)? {
                        if let Some(slot) = arr.borrow_mut().get_mut(index) {
                            *slot = replacement;
                        }
                        continue;
                    }
                    self.dereference(&child, dir, visited)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolve_whole_file_ref(
        &mut self,
        child: &Node,
        dir: &str,
    ) -> Result<Option<Node>, NormalizeError> {
        let Some(reference) = child.str_field("$ref") else {
            return Ok(None);
        };
        if !is_whole_file_ref(&reference) {
            return Ok(None);
        }
        let target = join(dir, &reference);
        Ok(Some(self.load_file(&target)?))
    }
}

impl BundledParser for FixtureBundler {
    fn document(&self) -> Node {
        self.document.clone()
    }

    fn loaded_paths(&self) -> Option<Vec<String>> {
        match &self.loaded_paths_override {
            Some(forced) => forced.clone(),
            None => Some(self.bundle_paths.clone()),
        }
    }

    fn get_loaded(&self, path: &str) -> Option<Node> {
        self.loaded
            .get(path)
            .or_else(|| self.parsed.get(path))
            .cloned()
    }

    fn parse(&mut self, path: &str, options: &ParseOptions) -> Result<Node, NormalizeError> {
        if let Some(existing) = self.parsed.get(path) {
            return Ok(existing.clone());
        }
        let node = read_node(path)?;
        self.parsed.insert(path.to_string(), node.clone());
        if options.dereference {
            let mut visited = HashSet::new();
            self.dereference(&node, &directory(path), &mut visited)?;
        }
        Ok(node)
    }
}

fn read_node(path: &str) -> Result<Node, NormalizeError> {
    let text = fs::read_to_string(path).map_err(|source| NormalizeError::Io {
        path: path.to_string(),
        source,
    })?;
    if path.ends_with(".json") {
        Node::from_json_str(&text)
    } else {
        Node::from_yaml_str(&text)
    }
}

/// A ref the bundler resolves: a relative file path with a known extension
/// and no fragment.
fn is_whole_file_ref(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    !reference.contains('#')
        && !reference.contains(':')
        && (lower.ends_with(".yaml") || lower.ends_with(".yml") || lower.ends_with(".json"))
}

fn directory(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[..i].to_string(),
        None => String::new(),
    }
}

fn join(dir: &str, relative: &str) -> String {
    let relative = relative.strip_prefix("./").unwrap_or(relative);
    let combined = if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{dir}/{relative}")
    };
    let mut parts: Vec<&str> = Vec::new();
    for segment in combined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if combined.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}
