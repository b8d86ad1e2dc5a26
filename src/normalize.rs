//! Pipeline driver.

use crate::bundle::{BundledParser, ParseOptions};
use crate::passes::{p1_hoist, p2_local_refs, p3_inline_dedupe, p4_discriminator,
    p5_source_template, PassContext};
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;

/// Normalize a bundled OpenAPI 3.x document in place.
///
/// Hoists every reusable schema under `#/components/schemas/<Name>` and
/// rewrites schema-position references — deep local pointers, inline copies
/// of external files, discriminator mapping filenames — to component
/// pointers. Non-schema values (`example`, `examples`, `x-` extensions) are
/// never touched.
///
/// The call is a no-op when the document is not recognizably OpenAPI 3.x or
/// when the parser has no loaded-paths metadata; in the latter case
/// `components.schemas` is not even created. Nothing is returned and no
/// error is ever surfaced: recoverable failures (unparseable external files,
/// ambiguous candidates) leave the affected value unchanged.
pub fn normalize(parser: &mut dyn BundledParser, options: &ParseOptions) {
    let doc = parser.document();

    let recognized = doc
        .str_field("openapi")
        .map(|version| version.starts_with("3."))
        .unwrap_or(false);
    if !recognized {
        tracing::debug!("document is not OpenAPI 3.x; skipping normalization");
        return;
    }
    if parser.loaded_paths().is_none() {
        tracing::debug!("parser has no loaded-paths metadata; skipping normalization");
        return;
    }

    let Some(mut registry) = SchemaRegistry::create(&doc) else {
        tracing::debug!("components is not an object; skipping normalization");
        return;
    };
    let mut resolver = ExternalResolver::default();

    {
        let mut ctx = PassContext {
            doc: doc.clone(),
            parser,
            options,
            registry: &mut registry,
            resolver: &mut resolver,
        };

        p1_hoist::run(&mut ctx);
        p2_local_refs::run(&mut ctx);
        p3_inline_dedupe::run(&mut ctx);
        // Mapping resolution can load files that expose new source
        // templates, and templating can surface new mapping candidates.
        for _ in 0..2 {
            p4_discriminator::run(&mut ctx);
            p5_source_template::run(&mut ctx);
        }
    }

    let swept = registry.replace_hoisted_inlines_with_refs(&doc);
    tracing::debug!(swept, "normalization finished");
}
