//! Pass 4: resolve discriminator mapping file refs (fixpoint).
//!
//! `discriminator.mapping` values frequently name sibling files
//! (`card: CardEvent.yaml`) that the bundler never loaded, because mapping
//! values are plain strings, not `$ref`s. Each such value is resolved to a
//! source file — by unique basename among known files, else relative to the
//! schema that carries the discriminator — loaded on demand, registered as
//! a component, and rewritten to the component pointer. Values that stay
//! unresolved are left alone; loading one file can make another value
//! resolvable, hence the loop.

use crate::dom::{Node, ObjectRef};
use crate::naming::{base_name, name_from_source_path};
use crate::pointer::{component_pointer, COMPONENT_SCHEMAS_PREFIX};
use crate::resolver::is_external_file_ref;
use crate::walk::{walk, WalkAction};

use super::PassContext;

struct MappingSite {
    /// The schema object carrying the discriminator.
    schema: Node,
    /// Pointer of that schema at its first-visited site.
    pointer: String,
    mapping: ObjectRef,
    key: String,
    value: String,
}

pub(crate) fn run(ctx: &mut PassContext<'_>) {
    loop {
        let mut changed = false;
        for site in collect_sites(ctx) {
            if site.value.starts_with(COMPONENT_SCHEMAS_PREFIX) {
                continue;
            }
            let path_part = site.value.split('#').next().unwrap_or(&site.value);
            let base = base_name(path_part).to_ascii_lowercase();

            let source_path = ctx
                .resolver
                .resolve_matching_source_path(path_part, &base)
                .or_else(|| {
                    ctx.resolver.resolve_source_path_from_schema_context(
                        path_part,
                        &site.schema,
                        &site.pointer,
                    )
                });

            let Some(source_path) = source_path else {
                // No file found, but a component may already exist under the
                // name this file would have produced.
                let derived = name_from_source_path(path_part);
                if ctx.registry.contains_name(&derived) {
                    site.mapping.borrow_mut().insert(
                        site.key.clone(),
                        Node::String(component_pointer(&derived)),
                    );
                    changed = true;
                }
                continue;
            };

            let Some(schema) = ctx.ensure_external(&source_path) else {
                continue;
            };
            let preferred = ctx
                .resolver
                .component_name_for_source_path(&source_path)
                .unwrap_or_else(|| name_from_source_path(&source_path));
            if let Some(pointer) = ctx.register_component(&schema, &preferred) {
                site.mapping
                    .borrow_mut()
                    .insert(site.key.clone(), Node::String(pointer));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// Every `discriminator.mapping` entry in a schema context whose value is an
/// external file reference. Collected up front because processing a site
/// loads files and mutates the tree.
fn collect_sites(ctx: &PassContext<'_>) -> Vec<MappingSite> {
    let mut sites = Vec::new();
    walk(&ctx.doc, &mut |node, pointer, in_schema, _slot| {
        if !in_schema || !node.is_object() {
            return WalkAction::Continue;
        }
        let Some(mapping) = node
            .get("discriminator")
            .and_then(|d| d.get("mapping"))
            .and_then(|m| m.as_object().cloned())
        else {
            return WalkAction::Continue;
        };
        for (key, value) in mapping.borrow().iter() {
            let Some(value) = value.as_str() else { continue };
            if is_external_file_ref(value) {
                sites.push(MappingSite {
                    schema: node.clone(),
                    pointer: pointer.to_string(),
                    mapping: mapping.clone(),
                    key: key.clone(),
                    value: value.to_string(),
                });
            }
        }
        WalkAction::Continue
    });
    sites
}
