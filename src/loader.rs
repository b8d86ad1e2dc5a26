//! On-demand loading of external schema files.
//!
//! Discriminator mappings and source templates routinely name files the
//! bundler never touched. The loader fetches them through the parser
//! abstraction, registers what it finds with the resolver, and swallows
//! every failure — an unloadable file just means the referencing value stays
//! as it was.

use crate::bundle::{BundledParser, ParseOptions};
use crate::dom::Node;
use crate::naming::name_from_source_path;
use crate::resolver::ExternalResolver;
use crate::schema_utils::is_likely_schema;

/// Fetch (and cache) the schema object for a source path.
///
/// Checks the resolver's cache, then the bundler's own loaded set, and only
/// then parses. Returns `None` when the path is mid-parse (re-entry on a
/// cyclic file graph), when parsing fails, or when the file does not hold a
/// likely-schema object.
pub(crate) fn ensure_external_schema_for_source_path(
    parser: &mut dyn BundledParser,
    resolver: &mut ExternalResolver,
    options: &ParseOptions,
    path: &str,
) -> Option<Node> {
    if let Some(cached) = resolver.cached_schema(path) {
        return Some(cached);
    }
    if let Some(loaded) = parser.get_loaded(path) {
        if !is_likely_schema(&loaded) {
            tracing::debug!(path, "loaded file is not a schema object; ignoring");
            return None;
        }
        register(resolver, path, &loaded);
        return Some(loaded);
    }

    if !resolver.begin_loading(path) {
        return None;
    }
    let result = parser.parse(path, options);
    resolver.finish_loading(path);

    match result {
        Ok(parsed) if is_likely_schema(&parsed) => {
            register(resolver, path, &parsed);
            Some(parsed)
        }
        Ok(_) => {
            tracing::debug!(path, "parsed file is not a schema object; ignoring");
            None
        }
        Err(error) => {
            tracing::debug!(path, %error, "failed to load external schema");
            None
        }
    }
}

fn register(resolver: &mut ExternalResolver, path: &str, obj: &Node) {
    resolver.add_external_name_candidate(obj, &name_from_source_path(path));
    resolver.register_external_source_path(path, obj);
}

// ===========================================================================
// Tests
// ===========================================================================
