//! Pass 3: collapse inline externals to refs (fixpoint).
//!
//! The bundler leaves two kinds of inline copies behind: shared nodes (same
//! identity as a hoisted external) and clones (structurally equal, distinct
//! identity). Both are replaced with `{ $ref }` records. Clones are matched
//! by fingerprint twice over — against the resolver's candidates as they
//! looked at registration time, and against the components as they look
//! *now* — because rewriting a component's children changes its shape, and
//! a clone whose children were already rewritten only matches the fresh
//! index. That is also why this pass loops: each sweep's replacements can
//! make the next sweep's matches possible, until one full traversal changes
//! nothing.

use std::collections::{BTreeSet, HashMap};

use crate::fingerprint::fingerprint;
use crate::pointer::is_component_schema_root;
use crate::schema_utils::{is_plain_ref_shape, ref_record};
use crate::walk::{walk, WalkAction};

use super::PassContext;

pub(crate) fn run(ctx: &mut PassContext<'_>) {
    let root = ctx.doc.clone();
    loop {
        let fp_index = component_fingerprint_index(ctx);
        let mut changed = false;

        walk(&root, &mut |node, pointer, in_schema, slot| {
            if !in_schema || !node.is_object() || is_component_schema_root(pointer) {
                return WalkAction::Continue;
            }
            // Already a bare ref: replacing it again would loop forever.
            if is_plain_ref_shape(node) {
                return WalkAction::Continue;
            }

            let canonical = match ctx.resolver.resolve_external_schema_candidate(node) {
                Some((name, canonical)) => Some((name, Some(canonical))),
                None => ctx
                    .resolver
                    .resolve_external_component_candidate(node, &fp_index)
                    .map(|name| (name, None)),
            };
            let Some((name, canonical)) = canonical else {
                return WalkAction::Continue;
            };
            let canonical = match canonical {
                Some(node) => node,
                None => match ctx.registry.component(&name) {
                    Some(node) => node,
                    None => return WalkAction::Continue,
                },
            };

            let Some(target) = ctx.register_component(&canonical, &name) else {
                return WalkAction::Continue;
            };
            slot.replace(ref_record(&target, Some(node)));
            changed = true;
            WalkAction::SkipChildren
        });

        if !changed {
            break;
        }
    }
}

/// Fingerprints of the components whose names are known external
/// candidates, as they currently stand.
fn component_fingerprint_index(ctx: &PassContext<'_>) -> HashMap<String, BTreeSet<String>> {
    let mut index: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (name, node) in ctx.registry.schemas().borrow().iter() {
        if node.is_object() && ctx.resolver.is_candidate_name(name) {
            index
                .entry(fingerprint(node))
                .or_default()
                .insert(name.clone());
        }
    }
    index
}
