//! Rewrite pass modules.
//!
//! Each pass is one sweep over the bundled document. They run in order —
//! hoist, local refs, inline dedupe, then discriminator + source template
//! twice — and each assumes the registrations of the previous ones.

use crate::bundle::{BundledParser, ParseOptions};
use crate::dom::Node;
use crate::pointer::last_token;
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;

pub(crate) mod p1_hoist;
pub(crate) mod p2_local_refs;
pub(crate) mod p3_inline_dedupe;
pub(crate) mod p4_discriminator;
pub(crate) mod p5_source_template;

/// Shared state threaded through the passes of one normalization run.
pub(crate) struct PassContext<'a> {
    pub doc: Node,
    pub parser: &'a mut dyn BundledParser,
    pub options: &'a ParseOptions,
    pub registry: &'a mut SchemaRegistry,
    pub resolver: &'a mut ExternalResolver,
}

impl PassContext<'_> {
    /// Register a component and, when the object's source file is known and
    /// unclaimed, record the (component name, source path) pair so the
    /// source-template pass can find it.
    pub(crate) fn register_component(&mut self, obj: &Node, preferred: &str) -> Option<String> {
        let pointer = self.registry.register(obj, preferred)?;
        if let Some(path) = self.resolver.source_path_of(obj) {
            if self.resolver.component_name_for_source_path(&path).is_none() {
                if let Some(name) = last_token(&pointer) {
                    self.resolver.assign_component_source_path(&path, &name);
                }
            }
        }
        Some(pointer)
    }

    /// Load the schema for a source path through the loader.
    pub(crate) fn ensure_external(&mut self, path: &str) -> Option<Node> {
        crate::loader::ensure_external_schema_for_source_path(
            self.parser,
            self.resolver,
            self.options,
            path,
        )
    }
}
