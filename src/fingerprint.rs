//! Structural schema fingerprints.
//!
//! Bundlers clone subtrees, so identity alone cannot equate every copy of a
//! schema. The fingerprint recovers structural equality: a deterministic
//! stringification with object keys sorted, arrays in order, and — at the
//! root only — `summary`/`description` omitted, since two copies of one
//! schema may carry different doc strings at their hoisting site. Nested
//! doc strings are kept: they distinguish semantically different nested
//! schemas.

use std::collections::HashSet;

use serde_json::Value;

use crate::dom::{Node, NodeId};

/// Sentinel emitted for back-edges. Must never change: equal fingerprints
/// across runs depend on it.
pub(crate) const CIRCULAR_SENTINEL: &str = "[Circular]";

/// Compute the structural fingerprint of a node.
///
/// Equal fingerprints mean structurally equal schemas modulo root
/// `summary`/`description` and object key order.
pub fn fingerprint(node: &Node) -> String {
    let mut out = String::new();
    let mut on_stack = HashSet::new();
    write_node(node, 0, &mut on_stack, &mut out);
    out
}

fn write_node(node: &Node, depth: usize, on_stack: &mut HashSet<NodeId>, out: &mut String) {
    match node {
        Node::Null => out.push_str("null"),
        Node::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Node::Number(n) => out.push_str(&n.to_string()),
        Node::String(s) => write_string(s, out),
        Node::Array(arr) => {
            let id = node.id().expect("arrays always have an id");
            if !on_stack.insert(id) {
                write_string(CIRCULAR_SENTINEL, out);
                return;
            }
            out.push('[');
            for (i, item) in arr.borrow().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_node(item, depth + 1, on_stack, out);
            }
            out.push(']');
            on_stack.remove(&id);
        }
        Node::Object(map) => {
            let id = node.id().expect("objects always have an id");
            if !on_stack.insert(id) {
                write_string(CIRCULAR_SENTINEL, out);
                return;
            }
            let map = map.borrow();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            let mut first = true;
            for key in keys {
                if depth == 0 && (key == "summary" || key == "description") {
                    continue;
                }
                if !first {
                    out.push(',');
                }
                first = false;
                write_string(key, out);
                out.push(':');
                write_node(&map[key.as_str()], depth + 1, on_stack, out);
            }
            out.push('}');
            drop(map);
            on_stack.remove(&id);
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // JSON string escaping via serde_json's Display for string values.
    out.push_str(&Value::String(s.to_string()).to_string());
}

// ===========================================================================
// Tests
// ===========================================================================
