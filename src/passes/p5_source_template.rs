//! Pass 5: source-template reconstruction.
//!
//! The bundler flattens ref-based composition: where a source file said
//! `$ref: ./PetBase.yaml#/allOf/0`, the bundled tree holds an anonymous
//! inline copy (or an unresolved file-ref record). Walking the source file
//! and the bundled component in parallel restores the composition: wherever
//! the source has a `$ref` to an external file, the corresponding bundled
//! node becomes a ref to that file's component — loading and registering the
//! file on demand. Fragments select the file, not the sub-node.
//!
//! Objects recurse over the keys both sides share; arrays recurse
//! positionally, truncated to the shorter side; mismatched shapes keep the
//! bundled value.

use std::collections::HashSet;

use crate::dom::{Node, NodeId};
use crate::naming::name_from_source_path;
use crate::resolver::{is_external_file_ref, resolve_relative};
use crate::schema_utils::ref_record;
use crate::walk::Slot;

use super::PassContext;

pub(crate) fn run(ctx: &mut PassContext<'_>) {
    for (name, source_path) in ctx.resolver.component_source_pairs() {
        let Some(source) = ctx.ensure_external(&source_path) else {
            continue;
        };
        let Some(bundled) = ctx.registry.component(&name) else {
            continue;
        };
        let slot = Slot::Entry {
            map: ctx.registry.schemas().clone(),
            key: name.clone(),
        };
        let mut entered = HashSet::new();
        apply_template(ctx, &source, &source_path, &bundled, &slot, &mut entered);
    }
}

fn apply_template(
    ctx: &mut PassContext<'_>,
    source: &Node,
    source_path: &str,
    bundled: &Node,
    slot: &Slot,
    entered: &mut HashSet<NodeId>,
) {
    if let Some(id) = source.id() {
        if !entered.insert(id) {
            return;
        }
    }

    if let Some(ref_str) = source.str_field("$ref") {
        if is_external_file_ref(&ref_str) {
            let path_part = ref_str.split('#').next().unwrap_or(&ref_str);
            let target_path = resolve_relative(source_path, path_part);
            if let Some(target) = ctx.ensure_external(&target_path) {
                let preferred = ctx
                    .resolver
                    .component_name_for_source_path(&target_path)
                    .unwrap_or_else(|| name_from_source_path(&target_path));
                if let Some(pointer) = ctx.register_component(&target, &preferred) {
                    slot.replace(ref_record(&pointer, Some(bundled)));
                }
            }
            return;
        }
    }

    match (source, bundled) {
        (Node::Object(source_map), Node::Object(bundled_map)) => {
            let source_entries: Vec<(String, Node)> = source_map
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            for (key, source_child) in source_entries {
                let Some(bundled_child) = bundled_map.borrow().get(&key).cloned() else {
                    continue;
                };
                let child_slot = Slot::Entry {
                    map: bundled_map.clone(),
                    key,
                };
                apply_template(
                    ctx,
                    &source_child,
                    source_path,
                    &bundled_child,
                    &child_slot,
                    entered,
                );
            }
        }
        (Node::Array(source_arr), Node::Array(bundled_arr)) => {
            let source_items: Vec<Node> = source_arr.borrow().clone();
            let shared_len = source_items.len().min(bundled_arr.borrow().len());
            // Trailing bundled elements beyond the source's length are left
            // untouched.
            for (index, source_child) in source_items.iter().take(shared_len).enumerate() {
                let Some(bundled_child) = bundled_arr.borrow().get(index).cloned() else {
                    continue;
                };
                let child_slot = Slot::Element {
                    array: bundled_arr.clone(),
                    index,
                };
                apply_template(
                    ctx,
                    source_child,
                    source_path,
                    &bundled_child,
                    &child_slot,
                    entered,
                );
            }
        }
        _ => {}
    }
}
