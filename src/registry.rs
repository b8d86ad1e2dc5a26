//! The `components.schemas` registry.
//!
//! One registry exists per normalization run. It owns the namespace (which
//! names are taken), the inverse map from object identity to component
//! pointer, and a handle to the live `components.schemas` object. Because
//! registration is keyed by identity, registering the same shared node twice
//! is free and returns the original pointer — while two structurally equal
//! but distinct objects get two components, which is the inline-dedupe
//! pass's problem to avoid.

use std::collections::{HashMap, HashSet};

use crate::dom::{Node, NodeId, ObjectRef};
use crate::naming::unique_name;
use crate::pointer::{component_pointer, is_component_schema_root};
use crate::schema_utils::ref_record;
use crate::walk::{walk, Slot, WalkAction};

pub(crate) struct SchemaRegistry {
    names: HashSet<String>,
    /// Identity → (pinned handle, component pointer). The handle keeps the
    /// allocation alive so the id cannot be reused within a run.
    pointer_by_object: HashMap<NodeId, (Node, String)>,
    schemas: ObjectRef,
}

impl SchemaRegistry {
    /// Build a registry over `doc`, creating `components.schemas` if absent
    /// and seeding the namespace from whatever is already there.
    ///
    /// Returns `None` when the document (or an existing `components` /
    /// `components.schemas` value) is not an object; the caller treats that
    /// as an unrecognized document and skips normalization.
    pub(crate) fn create(doc: &Node) -> Option<SchemaRegistry> {
        let root = doc.as_object()?;

        let components = match doc.get("components") {
            Some(existing) => existing,
            None => {
                let fresh = Node::object();
                root.borrow_mut()
                    .insert("components".to_string(), fresh.clone());
                fresh
            }
        };
        let components_map = components.as_object()?;

        let schemas = match components.get("schemas") {
            Some(existing) => existing,
            None => {
                let fresh = Node::object();
                components_map
                    .borrow_mut()
                    .insert("schemas".to_string(), fresh.clone());
                fresh
            }
        };
        let schemas_ref = schemas.as_object()?.clone();

        let mut names = HashSet::new();
        let mut pointer_by_object = HashMap::new();
        for (name, value) in schemas_ref.borrow().iter() {
            names.insert(name.clone());
            if let Some(id) = value.as_object().and_then(|_| value.id()) {
                pointer_by_object.insert(id, (value.clone(), component_pointer(name)));
            }
        }

        Some(SchemaRegistry {
            names,
            pointer_by_object,
            schemas: schemas_ref,
        })
    }

    /// Register an object under `components.schemas`, preferring
    /// `preferred_name`, and return its component pointer.
    ///
    /// Idempotent per identity: an already-registered object keeps its
    /// pointer regardless of the preferred name. Returns `None` for
    /// non-object nodes.
    pub(crate) fn register(&mut self, obj: &Node, preferred_name: &str) -> Option<String> {
        obj.as_object()?;
        let id = obj.id()?;
        if let Some((_, pointer)) = self.pointer_by_object.get(&id) {
            return Some(pointer.clone());
        }

        let name = unique_name(&mut self.names, preferred_name);
        self.schemas.borrow_mut().insert(name.clone(), obj.clone());
        let pointer = component_pointer(&name);
        self.pointer_by_object
            .insert(id, (obj.clone(), pointer.clone()));
        Some(pointer)
    }

    /// The component pointer a node is registered under, if any.
    pub(crate) fn pointer_for(&self, obj: &Node) -> Option<String> {
        let id = obj.id()?;
        self.pointer_by_object
            .get(&id)
            .map(|(_, pointer)| pointer.clone())
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Handle to the live `components.schemas` object.
    pub(crate) fn schemas(&self) -> &ObjectRef {
        &self.schemas
    }

    /// The registered component with the given name.
    pub(crate) fn component(&self, name: &str) -> Option<Node> {
        self.schemas.borrow().get(name).cloned()
    }

    /// Sweep the document, replacing every schema-context occurrence of a
    /// registered object that is not sitting at its canonical component
    /// location with a `{ $ref }` record. Returns the number of sites
    /// rewritten.
    pub(crate) fn replace_hoisted_inlines_with_refs(&self, root: &Node) -> usize {
        let mut replaced = 0usize;
        walk(root, &mut |node, pointer, in_schema, slot| {
            if !in_schema {
                return WalkAction::Continue;
            }
            let Some(canonical) = self.pointer_for(node) else {
                return WalkAction::Continue;
            };
            if canonical != pointer && !is_component_schema_root(pointer) {
                if let Slot::Root = slot {
                    return WalkAction::Continue;
                }
                slot.replace(ref_record(&canonical, None));
                replaced += 1;
                return WalkAction::SkipChildren;
            }
            WalkAction::Continue
        });
        replaced
    }
}

// ===========================================================================
// Tests
// ===========================================================================
