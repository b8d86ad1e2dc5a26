//! Pass 1: hoist declared externals.
//!
//! Every file the bundler touched (beyond the root document) is
//! pre-registered with the resolver as a name candidate and source path.
//! The document is then swept once for those objects — the bundler spliced
//! them in by identity — and each one found in a schema context is hoisted
//! under `components.schemas`, in lexicographic source-path order so name
//! assignment is deterministic for a given input.

use std::collections::HashSet;

use crate::dom::{Node, NodeId};
use crate::naming::name_from_source_path;
use crate::pointer::is_component_schema_root;
use crate::walk::{walk, WalkAction};

use super::PassContext;

pub(crate) fn run(ctx: &mut PassContext<'_>) {
    let paths = ctx.parser.loaded_paths().unwrap_or_default();
    for path in paths.iter().skip(1) {
        if let Some(obj) = ctx.parser.get_loaded(path) {
            ctx.resolver
                .add_external_name_candidate(&obj, &name_from_source_path(path));
            ctx.resolver.register_external_source_path(path, &obj);
        }
    }

    // Collect externals appearing in schema positions before registering
    // anything, so the sweep sees the document exactly as bundled.
    let root = ctx.doc.clone();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut found: Vec<(String, Node)> = Vec::new();
    walk(&root, &mut |node, pointer, in_schema, _slot| {
        if !in_schema || !node.is_object() || is_component_schema_root(pointer) {
            return WalkAction::Continue;
        }
        if let Some(path) = ctx.resolver.source_path_of(node) {
            if let Some(id) = node.id() {
                if seen.insert(id) {
                    found.push((path, node.clone()));
                }
            }
        }
        WalkAction::Continue
    });

    found.sort_by(|a, b| a.0.cmp(&b.0));
    for (path, obj) in &found {
        ctx.register_component(obj, &name_from_source_path(path));
    }
    tracing::debug!(hoisted = found.len(), "hoisted declared externals");
}
