//! Document traversal with schema-context tracking.
//!
//! The rewrite passes must only touch schema-shaped values, never `example`
//! payloads that happen to look like schemas. The walker makes that cheap:
//! it tracks whether the current node was reached through a keyword that
//! takes a schema as its child, and hands every visitor the [`Slot`] it
//! would need to replace the node in its parent.

use std::collections::HashSet;
use std::rc::Rc;

use crate::dom::{ArrayRef, Node, NodeId, ObjectRef};
use crate::pointer::append_token;

/// Keys whose children are schemas. Reaching a child through one of these
/// turns schema context on; once on, it stays on for all descendants.
pub(crate) const SCHEMA_CONTEXT_KEYS: &[&str] = &[
    "$defs",
    "additionalProperties",
    "allOf",
    "anyOf",
    "contains",
    "definitions",
    "dependentSchemas",
    "else",
    "if",
    "items",
    "not",
    "oneOf",
    "patternProperties",
    "prefixItems",
    "properties",
    "propertyNames",
    "schema",
    "schemas",
    "then",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Instruction returned by a visitor to control traversal.
#[derive(Debug)]
pub(crate) enum WalkAction {
    /// Descend into this node's children.
    Continue,
    /// Do not descend — used after the visitor replaced the node in-parent.
    SkipChildren,
}

/// The parent slot holding the visited node, for in-place replacement.
#[derive(Clone)]
pub(crate) enum Slot {
    /// The document root; cannot be replaced.
    Root,
    /// An object entry.
    Entry { map: ObjectRef, key: String },
    /// An array element.
    Element { array: ArrayRef, index: usize },
}

impl Slot {
    /// Replace the node held by this slot. A no-op at the root.
    pub(crate) fn replace(&self, value: Node) {
        match self {
            Slot::Root => {}
            Slot::Entry { map, key } => {
                // IndexMap keeps the entry's position on re-insert.
                map.borrow_mut().insert(key.clone(), value);
            }
            Slot::Element { array, index } => {
                if let Some(slot) = array.borrow_mut().get_mut(*index) {
                    *slot = value;
                }
            }
        }
    }
}

/// Walk a document, invoking `visitor` with
/// `(node, pointer, in_schema_context, slot)` before descending.
///
/// Children are snapshotted before descent, so visitors may mutate the
/// parent (including replacing the visited node through its slot) without
/// invalidating the traversal. A set of already-entered objects and arrays
/// suppresses re-recursion into shared subtrees and cycles; the visitor is
/// still invoked on repeat entries so callers can observe every site.
pub(crate) fn walk<F>(root: &Node, visitor: &mut F)
where
    F: FnMut(&Node, &str, bool, &Slot) -> WalkAction,
{
    let mut entered = HashSet::new();
    walk_node(root, "#", false, &Slot::Root, &mut entered, visitor);
}

fn walk_node<F>(
    node: &Node,
    pointer: &str,
    in_schema: bool,
    slot: &Slot,
    entered: &mut HashSet<NodeId>,
    visitor: &mut F,
) where
    F: FnMut(&Node, &str, bool, &Slot) -> WalkAction,
{
    match visitor(node, pointer, in_schema, slot) {
        WalkAction::SkipChildren => return,
        WalkAction::Continue => {}
    }

    match node {
        Node::Object(map) => {
            if let Some(id) = node.id() {
                if !entered.insert(id) {
                    return;
                }
            }
            let snapshot: Vec<(String, Node)> = map
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            for (key, child) in snapshot {
                let child_pointer = append_token(pointer, &key);
                let child_in_schema = in_schema || SCHEMA_CONTEXT_KEYS.contains(&key.as_str());
                let child_slot = Slot::Entry {
                    map: Rc::clone(map),
                    key,
                };
                walk_node(
                    &child,
                    &child_pointer,
                    child_in_schema,
                    &child_slot,
                    entered,
                    visitor,
                );
            }
        }
        Node::Array(arr) => {
            if let Some(id) = node.id() {
                if !entered.insert(id) {
                    return;
                }
            }
            let snapshot: Vec<Node> = arr.borrow().clone();
            for (index, child) in snapshot.iter().enumerate() {
                let child_pointer = format!("{}/{}", pointer, index);
                let child_slot = Slot::Element {
                    array: Rc::clone(arr),
                    index,
                };
                walk_node(child, &child_pointer, in_schema, &child_slot, entered, visitor);
            }
        }
        _ => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================
