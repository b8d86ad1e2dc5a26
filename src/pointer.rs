//! JSON Pointer utilities (RFC 6901).
//!
//! Pointers in this crate are fragment-style (`#`, `#/components/schemas/X`)
//! because that is how OpenAPI documents spell them. Tokens are escaped on
//! the way in (`~` → `~0`, `/` → `~1`) and unescaped — with a
//! percent-decoding attempt first, since bundlers sometimes URI-encode
//! tokens — on the way out.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::dom::Node;

/// Prefix shared by every component-schema pointer.
pub const COMPONENT_SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Escape a single pointer token per RFC 6901.
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn encode_token(token: &str) -> Cow<'_, str> {
    if token.contains('~') || token.contains('/') {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Unescape a single pointer token.
///
/// Attempts a percent-decode first; if the token is not valid UTF-8 after
/// decoding, the raw token is used instead. `~1` is unescaped before `~0` to
/// avoid double-unescaping.
pub fn decode_token(token: &str) -> String {
    let raw = match percent_decode_str(token).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => token.to_string(),
    };
    raw.replace("~1", "/").replace("~0", "~")
}

/// Append one token to a pointer, escaping it.
pub fn append_token(pointer: &str, token: &str) -> String {
    let mut out = String::with_capacity(pointer.len() + token.len() + 1);
    out.push_str(pointer);
    out.push('/');
    out.push_str(&encode_token(token));
    out
}

/// The decoded final token of a pointer, if it has one.
pub fn last_token(pointer: &str) -> Option<String> {
    let stripped = pointer.strip_prefix('#').unwrap_or(pointer);
    stripped.rsplit('/').next().filter(|t| !t.is_empty()).map(decode_token)
}

/// Resolve a local (`#` / `#/…`) pointer against a root node.
///
/// Descends objects by key and arrays by decimal index. Returns `None` for
/// non-local pointers and missing paths.
pub fn resolve_local(root: &Node, pointer: &str) -> Option<Node> {
    let path = pointer.strip_prefix('#')?;
    if path.is_empty() {
        return Some(root.clone());
    }
    let path = path.strip_prefix('/')?;

    let mut current = root.clone();
    for token in path.split('/') {
        let key = decode_token(token);
        current = match &current {
            Node::Object(map) => map.borrow().get(&key).cloned()?,
            Node::Array(arr) => {
                let index: usize = key.parse().ok()?;
                arr.borrow().get(index).cloned()?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Whether a pointer is exactly `#/components/schemas/<one token>`.
pub fn is_component_schema_root(pointer: &str) -> bool {
    match pointer.strip_prefix(COMPONENT_SCHEMAS_PREFIX) {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}

/// The canonical component pointer for a schema name.
pub fn component_pointer(name: &str) -> String {
    format!("{}{}", COMPONENT_SCHEMAS_PREFIX, encode_token(name))
}

// ===========================================================================
// Tests
// ===========================================================================
