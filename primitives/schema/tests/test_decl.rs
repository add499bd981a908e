//! Tests for declaration tables and schema derivation

use schema::*;
use tempfile::TempDir;

fn set_item() -> MethodDecl {
    MethodDecl::new("storage.setItem", "SetItemParams", "SetItemResult")
        .describe("Persist a value in host storage")
        .model(
            ModelDecl::new("SetItemParams")
                .field(FieldSpec::string("key").required())
                .field(FieldSpec::any("data").required())
                .field(FieldSpec::string("biz").with_default(DefaultValue::String("default".into())))
                .field(FieldSpec::number("validDuration").describe("seconds")),
        )
        .model(ModelDecl::new("SetItemResult"))
}

#[test]
fn test_method_decl_file_roundtrip() {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let path = dir.path().join("decls").join("set_item.json");

    let decl = set_item();
    decl.to_file(&path).expect("Failed to write declaration");
    let contents = std::fs::read_to_string(&path).expect("Failed to read declaration");
    assert!(contents.ends_with('\n'));

    let loaded = MethodDecl::from_file(&path).expect("Failed to load declaration");
    assert_eq!(loaded, decl);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let result = MethodDecl::from_file(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(SchemaError::Io(_))));
}

#[test]
fn test_schema_set_lookup() {
    let decl = set_item();
    let set = SchemaSet::from_decls(&decl.models).expect("models should derive");

    let params = set.schema(&decl.params).expect("params schema");
    assert_eq!(params.len(), 4);
    assert!(params.field("key").expect("key").required);
    assert_eq!(params.field("biz").expect("biz").default.to_value(), Some(serde_json::json!("default")));
    assert_eq!(params.field("validDuration").expect("validDuration").description, "seconds");
    assert!(set.schema(&TypeKey::new("Other")).is_err());
}

#[test]
fn test_malformed_model_is_refused() {
    let bad = ModelDecl::new("Bad").field(FieldSpec::string("mode").with_enum(Vec::<EnumValue>::new()));
    match Schema::from_decl(&bad) {
        Err(SchemaError::MalformedField { key, .. }) => assert_eq!(key, "mode"),
        other => panic!("Expected MalformedField, got {:?}", other),
    }
}

#[test]
fn test_field_spec_json_shape() {
    let field = FieldSpec::nested_list("items", "Item").required();
    let json = serde_json::to_value(&field).expect("serialize");
    assert_eq!(json["type"], serde_json::json!({ "kind": "nested_list", "type": "Item" }));
    assert_eq!(json["required"], serde_json::json!(true));
    assert!(json.get("default").is_none());
}
