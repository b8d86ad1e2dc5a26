//! External-schema identity resolution.
//!
//! The resolver ties objects that came from external files to candidate
//! component names and back to the paths they were loaded from. It answers
//! three questions for the rewrite passes:
//!
//! 1. *Is this object (or an exact structural clone of it) a known external
//!    schema, and under what name?* — identity first, fingerprint second.
//! 2. *Which file does this path-like string refer to?* — by unique
//!    basename, by path suffix, or relative to the schema that mentions it.
//! 3. *Which file produced this component?* — for source-template
//!    reconstruction.
//!
//! Ambiguity is a signal, not a bug: whenever a lookup produces more than
//! one candidate, the resolver answers `None` and the caller leaves the
//! document untouched. Mis-merging two distinct schemas that happen to share
//! a shape is worse than leaving an inline copy behind.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Node, NodeId};
use crate::fingerprint::fingerprint;
use crate::pointer::{is_component_schema_root, last_token};
use crate::schema_utils::is_likely_schema;

#[derive(Default)]
pub(crate) struct ExternalResolver {
    /// Identity → (pinned handle, preferred name).
    name_by_object: HashMap<NodeId, (Node, String)>,
    /// Name → the one object representing that name (first wins).
    canonical_by_name: HashMap<String, Node>,
    /// Fingerprint → name → canonical object for that (fingerprint, name).
    canonical_by_fingerprint: HashMap<String, BTreeMap<String, Node>>,
    /// Fingerprint → every name registered with it; >1 means ambiguous.
    names_by_fingerprint: HashMap<String, BTreeSet<String>>,
    /// Source path → loaded object.
    schema_by_source_path: HashMap<String, Node>,
    /// Identity → (pinned handle, source path).
    source_path_by_object: HashMap<NodeId, (Node, String)>,
    /// Lowercased basename → full paths carrying it.
    source_paths_by_base_name: HashMap<String, BTreeSet<String>>,
    /// Source path → component name assigned to it (BTreeMap so the
    /// source-template pass iterates deterministically).
    component_name_by_source_path: BTreeMap<String, String>,
    source_path_by_component_name: HashMap<String, String>,
    /// Paths currently being parsed; re-entry guard for cyclic file graphs.
    loading_source_paths: HashSet<String>,
}

impl ExternalResolver {
    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Record `name` as a candidate component name for `obj`. Gated on the
    /// likely-schema test; first registration wins per key.
    pub(crate) fn add_external_name_candidate(&mut self, obj: &Node, name: &str) {
        if !is_likely_schema(obj) {
            return;
        }
        let Some(id) = obj.id() else { return };

        self.name_by_object
            .entry(id)
            .or_insert_with(|| (obj.clone(), name.to_string()));
        self.canonical_by_name
            .entry(name.to_string())
            .or_insert_with(|| obj.clone());

        let fp = fingerprint(obj);
        self.canonical_by_fingerprint
            .entry(fp.clone())
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| obj.clone());
        self.names_by_fingerprint
            .entry(fp)
            .or_default()
            .insert(name.to_string());
    }

    /// Record the file a schema object was loaded from. Same gate as name
    /// candidates.
    pub(crate) fn register_external_source_path(&mut self, path: &str, obj: &Node) {
        if !is_likely_schema(obj) {
            return;
        }
        let Some(id) = obj.id() else { return };

        self.schema_by_source_path
            .entry(path.to_string())
            .or_insert_with(|| obj.clone());
        self.source_path_by_object
            .entry(id)
            .or_insert_with(|| (obj.clone(), path.to_string()));
        self.source_paths_by_base_name
            .entry(lower_base_name(path))
            .or_default()
            .insert(path.to_string());
    }

    /// Record which component name was assigned to a source file.
    pub(crate) fn assign_component_source_path(&mut self, path: &str, name: &str) {
        self.component_name_by_source_path
            .insert(path.to_string(), name.to_string());
        self.source_path_by_component_name
            .insert(name.to_string(), path.to_string());
    }

    // -----------------------------------------------------------------------
    // Candidate resolution
    // -----------------------------------------------------------------------

    /// Resolve an object to `(candidate name, canonical object)`.
    ///
    /// Identity wins: a known external object resolves to itself under its
    /// own preferred name. Otherwise the fingerprint is consulted, but only
    /// when exactly one name maps to it — two names with the same shape is
    /// an ambiguity and resolves to `None`.
    pub(crate) fn resolve_external_schema_candidate(
        &self,
        obj: &Node,
    ) -> Option<(String, Node)> {
        if let Some((node, name)) = obj.id().and_then(|id| self.name_by_object.get(&id)) {
            return Some((name.clone(), node.clone()));
        }
        if !is_likely_schema(obj) {
            return None;
        }

        let fp = fingerprint(obj);
        let names = self.names_by_fingerprint.get(&fp)?;
        if names.len() != 1 {
            return None;
        }
        let name = names.iter().next()?;
        let canonical = self.canonical_by_fingerprint.get(&fp)?.get(name)?;
        Some((name.clone(), canonical.clone()))
    }

    /// Resolve an object against a fingerprint index over already-hoisted
    /// components. `None` on zero or multiple matches.
    pub(crate) fn resolve_external_component_candidate(
        &self,
        obj: &Node,
        fp_index: &HashMap<String, BTreeSet<String>>,
    ) -> Option<String> {
        if !is_likely_schema(obj) {
            return None;
        }
        let names = fp_index.get(&fingerprint(obj))?;
        if names.len() != 1 {
            return None;
        }
        names.iter().next().cloned()
    }

    /// Whether a component name is backed by a known external candidate.
    pub(crate) fn is_candidate_name(&self, name: &str) -> bool {
        self.canonical_by_name.contains_key(name)
    }

    // -----------------------------------------------------------------------
    // Source-path resolution
    // -----------------------------------------------------------------------

    /// The source path an object was loaded from, by identity.
    pub(crate) fn source_path_of(&self, obj: &Node) -> Option<String> {
        let id = obj.id()?;
        self.source_path_by_object
            .get(&id)
            .map(|(_, path)| path.clone())
    }

    /// The already-loaded object for a source path.
    pub(crate) fn cached_schema(&self, path: &str) -> Option<Node> {
        self.schema_by_source_path.get(path).cloned()
    }

    pub(crate) fn component_name_for_source_path(&self, path: &str) -> Option<String> {
        self.component_name_by_source_path.get(path).cloned()
    }

    /// Snapshot of `(component name, source path)` pairs, ordered by path.
    pub(crate) fn component_source_pairs(&self) -> Vec<(String, String)> {
        self.component_name_by_source_path
            .iter()
            .map(|(path, name)| (name.clone(), path.clone()))
            .collect()
    }

    /// Resolve a path-like reference to a known source path by basename.
    ///
    /// A unique basename match wins outright; with several candidates, only
    /// a unique full-path suffix match (`…/<path_ref>`) is accepted.
    pub(crate) fn resolve_matching_source_path(
        &self,
        path_ref: &str,
        base_name: &str,
    ) -> Option<String> {
        let candidates = self.source_paths_by_base_name.get(base_name)?;
        if candidates.len() == 1 {
            return candidates.iter().next().cloned();
        }

        let normalized = path_ref.strip_prefix("./").unwrap_or(path_ref);
        let needle = format!("/{}", normalized.to_lowercase());
        let mut matches = candidates
            .iter()
            .filter(|candidate| candidate.to_lowercase().ends_with(&needle));
        let hit = matches.next()?;
        if matches.next().is_some() {
            tracing::debug!(path_ref, "multiple basename candidates; leaving unresolved");
            return None;
        }
        Some(hit.clone())
    }

    /// Resolve a path-like reference relative to the schema that mentions it.
    ///
    /// The containing schema's own source path is found by identity, by its
    /// component-root name, or by unique fingerprint; the reference is then
    /// joined against that path's directory.
    pub(crate) fn resolve_source_path_from_schema_context(
        &self,
        path_ref: &str,
        schema: &Node,
        pointer: &str,
    ) -> Option<String> {
        let base = self
            .source_path_of(schema)
            .or_else(|| {
                if !is_component_schema_root(pointer) {
                    return None;
                }
                let name = last_token(pointer)?;
                self.source_path_by_component_name.get(&name).cloned()
            })
            .or_else(|| {
                let fp = fingerprint(schema);
                let names = self.names_by_fingerprint.get(&fp)?;
                if names.len() != 1 {
                    return None;
                }
                let canonical = self.canonical_by_fingerprint.get(&fp)?.get(names.iter().next()?)?;
                self.source_path_of(canonical)
            })?;
        Some(resolve_relative(&base, path_ref))
    }

    // -----------------------------------------------------------------------
    // Loading guard
    // -----------------------------------------------------------------------

    /// Mark a path as being parsed. `false` means a load of this path is
    /// already in flight and the caller must back off.
    pub(crate) fn begin_loading(&mut self, path: &str) -> bool {
        self.loading_source_paths.insert(path.to_string())
    }

    pub(crate) fn finish_loading(&mut self, path: &str) {
        self.loading_source_paths.remove(path);
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Lowercased basename of a path.
pub(crate) fn lower_base_name(path: &str) -> String {
    crate::naming::base_name(path).to_ascii_lowercase()
}

/// Resolve `path_ref` against the directory of `base_path`, collapsing `.`
/// and `..` segments lexically. Absolute references are normalized as-is.
pub(crate) fn resolve_relative(base_path: &str, path_ref: &str) -> String {
    let path_ref = path_ref.strip_prefix("./").unwrap_or(path_ref);
    if path_ref.starts_with('/') {
        return normalize_segments(path_ref, true);
    }
    let dir = match base_path.rfind('/') {
        Some(i) => &base_path[..i],
        None => "",
    };
    let combined = if dir.is_empty() {
        path_ref.to_string()
    } else {
        format!("{dir}/{path_ref}")
    };
    normalize_segments(&combined, base_path.starts_with('/'))
}

fn normalize_segments(path: &str, absolute: bool) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

// ---------------------------------------------------------------------------
// External-file-reference predicate
// ---------------------------------------------------------------------------

/// Whether a string refers to an external schema file: no URI scheme, not a
/// local pointer, and a `.yaml`/`.yml`/`.json` extension (case-insensitive)
/// optionally followed by a fragment.
pub(crate) fn is_external_file_ref(value: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    static FILE: OnceLock<Regex> = OnceLock::new();

    let scheme = SCHEME.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("scheme pattern is valid")
    });
    let file = FILE.get_or_init(|| {
        Regex::new(r"(?i)\.(yaml|yml|json)(#.*)?$").expect("file pattern is valid")
    });

    !value.starts_with("#/") && !scheme.is_match(value) && file.is_match(value)
}

// ===========================================================================
// Tests
// ===========================================================================
