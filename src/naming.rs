//! Component-name derivation and collision handling.
//!
//! Names come from two places: the basename of the source file a schema was
//! loaded from, or — for schemas that only exist at a pointer — the most
//! specific meaningful token of that pointer. Either way the name lands in
//! the shared `components.schemas` namespace, so the final step is always
//! collision avoidance with `_2`, `_3`, … suffixes.

use std::collections::HashSet;

use crate::pointer::decode_token;

/// Fallback name when nothing better can be derived.
const FALLBACK_NAME: &str = "Schema";

/// Pointer tokens that never make good component names: structural keywords,
/// HTTP methods, and the fixed OpenAPI scaffolding between a path and its
/// schema.
pub(crate) const IGNORED_POINTER_TOKENS: &[&str] = &[
    "allOf",
    "anyOf",
    "components",
    "content",
    "items",
    "oneOf",
    "paths",
    "get",
    "put",
    "post",
    "patch",
    "delete",
    "head",
    "trace",
    "options",
    "requestBody",
    "responses",
    "schema",
    "schemas",
];

/// Derive a component name from a source-file path.
///
/// Takes the basename, strips the last extension, and replaces anything
/// outside `[A-Za-z0-9._-]` with `-`.
pub fn name_from_source_path(path: &str) -> String {
    let stem = strip_extension(base_name(path));
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}

/// Derive a component name from a JSON pointer.
///
/// Scans tokens from the last back to the first, skipping indices, tokens
/// containing `/` (path templates, media types), and the ignored-token set;
/// the first acceptable token is normalized to PascalCase.
pub fn name_from_pointer(pointer: &str) -> String {
    let stripped = pointer.strip_prefix('#').unwrap_or(pointer);
    for token in stripped.split('/').rev() {
        if token.is_empty() {
            continue;
        }
        let decoded = decode_token(token);
        if decoded.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if decoded.contains('/') || decoded.starts_with("application/") {
            continue;
        }
        if IGNORED_POINTER_TOKENS.contains(&decoded.as_str()) {
            continue;
        }
        return pascal_case(&decoded);
    }
    FALLBACK_NAME.to_string()
}

/// Normalize a raw token to PascalCase.
///
/// Strips a trailing extension, splits on non-alphanumerics, and capitalizes
/// the first letter of each word while leaving the rest untouched (so
/// `APIKey` survives as `APIKey`, not `Apikey`).
pub fn pascal_case(input: &str) -> String {
    let stem = strip_extension(input);
    let spaced: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let mut out = String::with_capacity(spaced.len());
    for word in spaced.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}

/// Pick a free name in `names`, preferring `preferred` and falling back to
/// `_2`, `_3`, … suffixes. The chosen name is inserted into the set.
pub fn unique_name(names: &mut HashSet<String>, preferred: &str) -> String {
    let preferred = if preferred.is_empty() {
        FALLBACK_NAME
    } else {
        preferred
    };
    if names.insert(preferred.to_string()) {
        return preferred.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{preferred}_{suffix}");
        if names.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// The final path segment, accepting both `/` and `\` separators.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Strip the last `.ext` segment. A name that is nothing but an extension
/// (`.hidden`) strips to empty, which callers replace with the fallback.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[..i],
        _ => name,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
