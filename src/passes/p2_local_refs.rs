//! Pass 2: rewrite local deep refs to component refs.
//!
//! Bundlers resolve what they can and leave root-relative pointers like
//! `#/paths/~1pets/get/.../schema` behind. Any such ref in a schema context
//! is resolved against the document; the target object is registered as a
//! component — under its external candidate name when it has one, otherwise
//! under a name derived from the pointer — and the `$ref` string is
//! rewritten in place, keeping whatever siblings the record carried.

use crate::dom::Node;
use crate::naming::name_from_pointer;
use crate::pointer::{resolve_local, COMPONENT_SCHEMAS_PREFIX};
use crate::walk::{walk, WalkAction};

use super::PassContext;

pub(crate) fn run(ctx: &mut PassContext<'_>) {
    let root = ctx.doc.clone();
    walk(&root, &mut |node, _pointer, in_schema, _slot| {
        if !in_schema {
            return WalkAction::Continue;
        }
        let Some(ref_str) = node.str_field("$ref") else {
            return WalkAction::Continue;
        };
        if !ref_str.starts_with("#/") || ref_str.starts_with(COMPONENT_SCHEMAS_PREFIX) {
            return WalkAction::Continue;
        }
        let Some(target) = resolve_local(&root, &ref_str) else {
            tracing::debug!(reference = %ref_str, "local ref does not resolve; leaving as-is");
            return WalkAction::Continue;
        };
        if !target.is_object() {
            return WalkAction::Continue;
        }

        let preferred = match ctx.resolver.resolve_external_schema_candidate(&target) {
            Some((name, _)) => name,
            None => name_from_pointer(&ref_str),
        };
        if let Some(pointer) = ctx.register_component(&target, &preferred) {
            if let Some(map) = node.as_object() {
                map.borrow_mut()
                    .insert("$ref".to_string(), Node::String(pointer));
            }
        }
        WalkAction::Continue
    });
}
