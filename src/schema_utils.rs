//! Schema-shape predicates and ref-record construction.

use crate::dom::Node;

/// Keywords whose presence marks an object as a plausible schema. A cheap
/// gate so the resolver never fingerprints arbitrary metadata objects.
pub(crate) const LIKELY_SCHEMA_KEYWORDS: &[&str] = &[
    "$ref",
    "additionalProperties",
    "allOf",
    "anyOf",
    "const",
    "discriminator",
    "enum",
    "format",
    "items",
    "not",
    "oneOf",
    "patternProperties",
    "properties",
    "required",
    "type",
];

/// Whether a node is an object carrying at least one recognized
/// JSON-Schema/OpenAPI keyword.
pub(crate) fn is_likely_schema(node: &Node) -> bool {
    let Some(map) = node.as_object() else {
        return false;
    };
    map.borrow()
        .keys()
        .any(|key| LIKELY_SCHEMA_KEYWORDS.contains(&key.as_str()))
}

/// Whether a node is already a bare reference record: `$ref` plus at most
/// `summary` and `description`. Replacing such a record with another ref
/// record would never terminate the fixpoint passes, so they skip it.
pub(crate) fn is_plain_ref_shape(node: &Node) -> bool {
    let Some(map) = node.as_object() else {
        return false;
    };
    let map = map.borrow();
    map.contains_key("$ref")
        && map
            .keys()
            .all(|key| matches!(key.as_str(), "$ref" | "summary" | "description"))
}

/// Build a `{ $ref: pointer }` record, carrying over `summary` and
/// `description` from the node being replaced.
pub(crate) fn ref_record(pointer: &str, replaced: Option<&Node>) -> Node {
    let mut entries = vec![("$ref".to_string(), Node::String(pointer.to_string()))];
    if let Some(node) = replaced {
        for key in ["summary", "description"] {
            if let Some(value) = node.get(key) {
                entries.push((key.to_string(), value));
            }
        }
    }
    Node::object_from(entries)
}

// ===========================================================================
// Tests
// ===========================================================================
