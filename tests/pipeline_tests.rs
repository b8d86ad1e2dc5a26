//! End-to-end tests over the multi-file petstore fixture — exercises the
//! full pass sequence through the public API only.

mod common;

use common::FixtureBundler;
use oas_normalizer::{normalize, BundledParser, ParseOptions};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const MULTIFILE_ROOT: &str = "tests/fixtures/mock-multifile/openapi.yaml";

fn normalized_multifile() -> Value {
    let mut parser = FixtureBundler::bundle(MULTIFILE_ROOT);
    normalize(&mut parser, &ParseOptions::default());
    parser.document().to_json()
}

fn at<'a>(doc: &'a Value, pointer: &str) -> &'a Value {
    doc.pointer(pointer)
        .unwrap_or_else(|| panic!("missing {pointer}"))
}

// ── Declared externals ──────────────────────────────────────────────────────

#[test]
fn test_externals_are_hoisted_under_their_file_names() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/components/schemas/Id"),
        &json!({ "type": "string", "pattern": "^[a-zA-Z0-9_-]+$" })
    );

    let names: Vec<&str> = doc["components"]["schemas"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(
        sorted,
        vec!["Id", "Owner", "Pet", "Schema", "Status", "Status_2"]
    );
}

#[test]
fn test_nested_external_refs_point_at_components() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/components/schemas/Pet/properties/id"),
        &json!({ "$ref": "#/components/schemas/Id" })
    );
    assert_eq!(
        at(&doc, "/components/schemas/Pet/properties/owner"),
        &json!({ "$ref": "#/components/schemas/Owner" })
    );
    assert_eq!(
        at(&doc, "/components/schemas/Owner/properties/id"),
        &json!({ "$ref": "#/components/schemas/Id" })
    );
}

#[test]
fn test_usage_sites_become_component_refs() {
    let doc = normalized_multifile();

    assert_eq!(
        at(
            &doc,
            "/paths/~1pets~1{petId}/get/responses/200/content/application~1json/schema"
        ),
        &json!({ "$ref": "#/components/schemas/Pet" })
    );
    assert_eq!(
        at(&doc, "/paths/~1pets~1{petId}/get/parameters/0/schema"),
        &json!({ "$ref": "#/components/schemas/Id" })
    );
    assert_eq!(
        at(&doc, "/paths/~1owners/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Owner" })
    );
}

// ── Structural clones ───────────────────────────────────────────────────────

#[test]
fn test_inline_clone_collapses_by_fingerprint() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/paths/~1lookup/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Id" })
    );
}

#[test]
fn test_clone_replacement_preserves_doc_strings() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/paths/~1adopted/post/requestBody/content/application~1json/schema"),
        &json!({
            "$ref": "#/components/schemas/Pet",
            "summary": "A pet",
            "description": "An adopted pet, spelled out inline."
        })
    );
}

#[test]
fn test_clone_with_rewritten_children_matches_on_later_sweep() {
    // The /returned schema is spelled with component refs already, so it only
    // matches Pet after Pet's own children have been rewritten.
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/paths/~1returned/post/requestBody/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Pet" })
    );
}

// ── Deep local pointers ─────────────────────────────────────────────────────

#[test]
fn test_deep_path_ref_is_hoisted_and_rewritten() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/paths/~1mirror/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Schema" })
    );
    // The original site now refs the hoisted component too.
    assert_eq!(
        at(&doc, "/paths/~1pets/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Schema" })
    );
    assert_eq!(
        at(&doc, "/components/schemas/Schema"),
        &json!({ "type": "array", "items": { "$ref": "#/components/schemas/Pet" } })
    );
}

#[test]
fn test_no_schema_ref_points_into_paths() {
    let doc = normalized_multifile();
    let rendered = serde_json::to_string(&doc).unwrap();
    assert!(
        !rendered.contains("#/paths/"),
        "deep path refs should be gone: {rendered}"
    );
}

// ── Collisions ──────────────────────────────────────────────────────────────

#[test]
fn test_same_basename_files_get_suffixed_names() {
    let doc = normalized_multifile();

    assert_eq!(
        at(&doc, "/components/schemas/Status"),
        &json!({ "type": "string", "enum": ["ok", "failed"] })
    );
    assert_eq!(
        at(&doc, "/components/schemas/Status_2"),
        &json!({ "type": "integer", "format": "int32" })
    );
    assert_eq!(
        at(&doc, "/paths/~1status~1a/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Status" })
    );
    assert_eq!(
        at(&doc, "/paths/~1status~1b/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Status_2" })
    );
}

// ── Non-schema values ───────────────────────────────────────────────────────

#[test]
fn test_examples_survive_untouched() {
    let mut parser = FixtureBundler::bundle(MULTIFILE_ROOT);
    let before = parser.document().to_json();
    normalize(&mut parser, &ParseOptions::default());
    let after = parser.document().to_json();

    let example_pointer =
        "/paths/~1pets~1{petId}/get/responses/200/content/application~1json/example";
    assert_eq!(at(&before, example_pointer), at(&after, example_pointer));
    assert_eq!(
        at(&after, example_pointer),
        &json!({ "data": { "id": null, "name": "snowball" } })
    );
}

#[test]
fn test_x_doc_refs_are_preserved_verbatim() {
    let doc = normalized_multifile();
    assert_eq!(
        doc["x-doc-refs"],
        json!([{ "$ref": "./docs/auth.md" }])
    );
}

// ── Preconditions ───────────────────────────────────────────────────────────

#[test]
fn test_missing_loaded_paths_is_a_noop() {
    let mut parser = FixtureBundler::bundle(MULTIFILE_ROOT).without_loaded_paths();
    let before = parser.document().to_json();
    normalize(&mut parser, &ParseOptions::default());
    let after = parser.document().to_json();

    assert_eq!(before, after);
    assert!(
        after.get("components").is_none(),
        "components must not be created without loaded-paths metadata"
    );
}

#[test]
fn test_empty_loaded_paths_still_initializes_components() {
    let mut parser =
        FixtureBundler::bundle("tests/fixtures/mock-events/openapi.yaml").with_empty_loaded_paths();
    let mut expected = parser.document().to_json();
    normalize(&mut parser, &ParseOptions::default());
    let after = parser.document().to_json();

    // Nothing resolvable without the loaded-paths list, but the namespace
    // is still created.
    expected
        .as_object_mut()
        .unwrap()
        .insert("components".to_string(), json!({ "schemas": {} }));
    assert_eq!(after, expected);
}

#[test]
fn test_non_openapi3_document_is_skipped() {
    let mut parser = FixtureBundler::bundle("tests/fixtures/mock-swagger/openapi.yaml");
    let before = parser.document().to_json();
    normalize(&mut parser, &ParseOptions::default());
    let after = parser.document().to_json();

    assert_eq!(before, after);
    assert!(after.get("components").is_none());
}

// ── Absolute bundle paths ───────────────────────────────────────────────────

#[test]
fn test_bundles_rooted_at_absolute_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("openapi.yaml");
    std::fs::write(
        &root,
        concat!(
            "openapi: 3.0.3\n",
            "info: { title: Tmp, version: 1.0.0 }\n",
            "paths:\n",
            "  /things:\n",
            "    get:\n",
            "      responses:\n",
            "        '200':\n",
            "          description: ok\n",
            "          content:\n",
            "            application/json:\n",
            "              schema:\n",
            "                $ref: ./Thing.yaml\n",
        ),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Thing.yaml"),
        "type: object\nproperties:\n  id:\n    type: string\n",
    )
    .unwrap();

    let mut parser = FixtureBundler::bundle(root.to_str().unwrap());
    normalize(&mut parser, &ParseOptions::default());
    let doc = parser.document().to_json();

    assert_eq!(
        at(&doc, "/components/schemas/Thing"),
        &json!({ "type": "object", "properties": { "id": { "type": "string" } } })
    );
    assert_eq!(
        at(&doc, "/paths/~1things/get/responses/200/content/application~1json/schema"),
        &json!({ "$ref": "#/components/schemas/Thing" })
    );
}

// ── Idempotence ─────────────────────────────────────────────────────────────

#[test]
fn test_normalization_is_idempotent() {
    let mut parser = FixtureBundler::bundle(MULTIFILE_ROOT);
    normalize(&mut parser, &ParseOptions::default());
    let first = parser.document().to_json();
    normalize(&mut parser, &ParseOptions::default());
    let second = parser.document().to_json();

    assert_eq!(first, second);
}
