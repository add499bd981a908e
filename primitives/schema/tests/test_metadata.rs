//! Tests for loading stub-generator metadata

use std::path::PathBuf;

use schema::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[test]
fn test_load_router_open_metadata() {
    let decl = load_method_metadata(&fixture("router_open.json")).expect("fixture should load");

    assert_eq!(decl.name, "router.open");
    assert_eq!(decl.description, "Open a page by scheme");
    assert_eq!(decl.params, TypeKey::new("OpenRequest"));
    assert_eq!(decl.result, TypeKey::new("OpenResponse"));
    assert_eq!(decl.models.len(), 3);
    assert!(check_method_decl(&decl).is_empty());

    let request = decl.find_model(&decl.params).expect("request model");
    let scheme = &request.fields[0];
    assert_eq!(scheme.key, "scheme");
    assert!(scheme.required);
    assert_eq!(scheme.kind(), PrimitiveKind::String);
    let options = &request.fields[1];
    assert!(!options.required);
    assert_eq!(options.ty, FieldType::Nested(TypeKey::new("OpenOptions")));
}

#[test]
fn test_defaults_and_enums_are_carried_over() {
    let decl = load_method_metadata(&fixture("router_open.json")).expect("fixture should load");
    let options = decl.find_model(&TypeKey::new("OpenOptions")).expect("options model");
    let schema = Schema::from_decl(options).expect("options should derive");

    let animated = schema.field("animated").expect("animated");
    assert_eq!(animated.default, DefaultValue::Bool(true));
    assert!(!animated.required);

    let replace_type = schema.field("replaceType").expect("replaceType");
    assert!(replace_type.is_enum);
    assert_eq!(replace_type.enum_values.len(), 3);
    assert!(replace_type.enum_contains(&serde_json::json!("alwaysCloseBeforeOpen")));

    assert_eq!(schema.field("extra").expect("extra").kind(), PrimitiveKind::Map);
}

#[test]
fn test_inline_objects_become_models() {
    let json = r#"{
        "name": "storage.setItem",
        "request": {
            "kind": "object",
            "fields": [
                { "name": "key", "optional": false, "type": { "kind": "primitive", "name": "string" } },
                { "name": "data", "optional": false, "type": { "kind": "primitive", "name": "any" } },
                { "name": "meta", "optional": true, "type": { "kind": "object", "fields": [
                    { "name": "tags", "optional": true, "type": { "kind": "array", "elementType": { "kind": "primitive", "name": "string" } } }
                ] } },
                { "name": "entries", "optional": true, "type": { "kind": "array", "elementType": { "kind": "object", "fields": [
                    { "name": "ttl", "optional": true, "defaultValue": { "kind": "number", "value": 60 }, "type": { "kind": "primitive", "name": "number" } }
                ] } } }
            ]
        },
        "interfaces": {}
    }"#;

    let decl = from_json_str(json).expect("metadata should convert");
    assert_eq!(decl.params, TypeKey::new("StorageSetItemRequest"));
    assert_eq!(decl.result, TypeKey::new("StorageSetItemResponse"));

    let request = decl.find_model(&decl.params).expect("request");
    assert_eq!(request.fields[1].kind(), PrimitiveKind::Any);
    assert_eq!(request.fields[2].ty, FieldType::Nested(TypeKey::new("StorageSetItemRequestMeta")));
    assert_eq!(
        request.fields[3].ty,
        FieldType::NestedList(TypeKey::new("StorageSetItemRequestEntriesItem"))
    );

    let meta = decl.find_model(&TypeKey::new("StorageSetItemRequestMeta")).expect("meta");
    assert_eq!(meta.fields[0].kind(), PrimitiveKind::List);

    let entry = decl.find_model(&TypeKey::new("StorageSetItemRequestEntriesItem")).expect("entry");
    assert_eq!(entry.fields[0].default, DefaultValue::Int(60));

    let response = decl.find_model(&decl.result).expect("empty response model");
    assert!(response.fields.is_empty());
    assert!(check_method_decl(&decl).is_empty());
}

#[test]
fn test_unknown_reference_fails() {
    let json = r#"{ "name": "a.b", "request": { "kind": "reference", "name": "Nope" } }"#;
    match from_json_str(json) {
        Err(SchemaError::UnknownModel(key)) => assert_eq!(key.as_str(), "Nope"),
        other => panic!("Expected UnknownModel, got {:?}", other),
    }
}

#[test]
fn test_invalid_json_fails() {
    assert!(matches!(from_json_str("{ not json"), Err(SchemaError::Json(_))));
}
