//! Post-bundling normalizer for OpenAPI 3.x documents.
//!
//! After a reference-resolving bundler has inlined every `$ref` target into
//! one document, the result is a tangle: the same schema object spliced
//! into a dozen sites, structurally identical clones of it elsewhere, deep
//! `#/paths/...` pointers, and discriminator mappings still naming
//! `.yaml` files. [`normalize`] rewrites that tree in place so every
//! reusable schema lives under `#/components/schemas/<Name>` exactly once
//! and every schema-position reference points there by component pointer.
//!
//! The pipeline, in order:
//!
//! 1. **Hoist** — every file the bundler loaded is registered as a
//!    component, found in the document by identity.
//! 2. **Local refs** — deep `#/...` pointers in schema positions are
//!    resolved and redirected to components.
//! 3. **Inline dedupe** (fixpoint) — shared nodes and structural clones of
//!    known externals collapse to `{ $ref }` records.
//! 4. **Discriminator mappings** + **source templates** (run twice) —
//!    mapping filenames become component pointers, and composition the
//!    bundler flattened is restored from the original files.
//! 5. **Final sweep** — any registered object still inlined somewhere is
//!    replaced with its component ref.
//!
//! Only values in *schema context* — reachable through JSON-Schema keywords
//! like `properties`, `items`, `allOf` — are ever rewritten. `example`
//! payloads and vendor extensions pass through untouched, and anything
//! ambiguous (two candidate names for one shape, two files with one
//! basename) is conservatively left alone.
//!
//! The input comes through the [`BundledParser`] trait: a mutable document
//! handle, the list of paths the bundler loaded, and an on-demand parser
//! for files it did not.

mod bundle;
mod dom;
mod error;
mod fingerprint;
mod loader;
mod naming;
mod normalize;
mod passes;
mod pointer;
mod registry;
mod resolver;
mod schema_utils;
mod walk;

pub use bundle::{BundledParser, ParseOptions};
pub use dom::{ArrayRef, Node, NodeId, ObjectMap, ObjectRef};
pub use error::NormalizeError;
pub use fingerprint::fingerprint;
pub use naming::{name_from_pointer, name_from_source_path, pascal_case, unique_name};
pub use normalize::normalize;
pub use pointer::{
    append_token, component_pointer, decode_token, encode_token, is_component_schema_root,
    last_token, resolve_local, COMPONENT_SCHEMAS_PREFIX,
};
