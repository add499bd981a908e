//! Payload Validation
//!
//! Checks a raw tree against a schema. Only getter fields are checked, and a
//! null value counts as absent. Validation stops at the first problem.

use schema::{value_kind_name, FieldSpec, FieldType, PrimitiveKind, Schema, SchemaLookup, TypeKey};
use serde_json::{Map, Value};

use crate::error::{MarshalError, Result};

/// Validate the top level of `tree`.
///
/// Nested objects are only checked for being objects (and nested lists for
/// holding objects); their own fields are checked when a view descends into
/// them, or by [`validate_deep`].
pub fn validate(tree: &Map<String, Value>, schema: &Schema) -> Result<()> {
    for field in schema.getters() {
        match present(tree, &field.key) {
            Some(value) => check_value(schema.key(), field, value)?,
            None if field.required => {
                return Err(MarshalError::MissingRequiredField {
                    model: schema.key().clone(),
                    key: field.key.clone(),
                });
            }
            None => {}
        }
    }
    Ok(())
}

/// Validate `tree` and every nested object reachable through declared fields.
pub fn validate_deep(tree: &Map<String, Value>, schema: &Schema, lookup: &dyn SchemaLookup) -> Result<()> {
    validate(tree, schema)?;

    for field in schema.getters() {
        let (Some(nested), Some(value)) = (field.nested_type(), present(tree, &field.key)) else {
            continue;
        };
        let nested_schema = resolve_nested(lookup, schema.key(), &field.key, nested)?;
        match (&field.ty, value) {
            (FieldType::Nested(_), Value::Object(sub)) => {
                validate_deep(sub, &nested_schema, lookup).map_err(|e| e.within(&field.key))?;
            }
            (FieldType::NestedList(_), Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if let Value::Object(sub) = item {
                        validate_deep(sub, &nested_schema, lookup)
                            .map_err(|e| e.within(&format!("[{}]", index)).within(&field.key))?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Value stored under `key`, treating null as absent.
pub(crate) fn present<'a>(tree: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    tree.get(key).filter(|v| !v.is_null())
}

pub(crate) fn resolve_nested(
    lookup: &dyn SchemaLookup,
    model: &TypeKey,
    key: &str,
    nested: &TypeKey,
) -> Result<std::sync::Arc<Schema>> {
    lookup.schema(nested).map_err(|source| {
        tracing::warn!(%model, key, %nested, error = %source, "nested type unresolvable");
        MarshalError::UnresolvableNestedType { model: model.clone(), key: key.to_string(), nested: nested.clone(), source }
    })
}

fn check_value(model: &TypeKey, field: &FieldSpec, value: &Value) -> Result<()> {
    let kind = field.kind();
    if !kind.matches(value) {
        return Err(MarshalError::TypeMismatch {
            model: model.clone(),
            key: field.key.clone(),
            expected: kind.as_str(),
            found: value_kind_name(value),
        });
    }

    if let (FieldType::NestedList(_), Value::Array(items)) = (&field.ty, value) {
        if let Some((index, item)) = items.iter().enumerate().find(|(_, item)| !item.is_object()) {
            return Err(MarshalError::TypeMismatch {
                model: model.clone(),
                key: format!("{}[{}]", field.key, index),
                expected: PrimitiveKind::Map.as_str(),
                found: value_kind_name(item),
            });
        }
    }

    if field.is_enum {
        check_enum(model, field, value)?;
    }
    Ok(())
}

// Lists check every element and maps every value; scalars check themselves.
fn check_enum(model: &TypeKey, field: &FieldSpec, value: &Value) -> Result<()> {
    let violation = |key: String, value: &Value| MarshalError::EnumViolation {
        model: model.clone(),
        key,
        value: value.to_string(),
    };

    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if !field.enum_contains(item) {
                    return Err(violation(format!("{}[{}]", field.key, index), item));
                }
            }
        }
        Value::Object(entries) => {
            for (name, entry) in entries {
                if !field.enum_contains(entry) {
                    return Err(violation(format!("{}.{}", field.key, name), entry));
                }
            }
        }
        scalar => {
            if !field.enum_contains(scalar) {
                return Err(violation(field.key.clone(), scalar));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use schema::{ModelDecl, SchemaSet};
    use serde_json::json;

    use super::*;

    fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn schema(decl: ModelDecl) -> Schema { Schema::from_decl(&decl).expect("valid declaration") }

    #[test]
    fn null_counts_as_absent() {
        let s = schema(ModelDecl::new("P").field(FieldSpec::string("url").required()));
        assert!(matches!(
            validate(&tree(json!({ "url": null })), &s),
            Err(MarshalError::MissingRequiredField { .. })
        ));
        let s = schema(ModelDecl::new("P").field(FieldSpec::string("url")));
        assert!(validate(&tree(json!({ "url": null })), &s).is_ok());
    }

    #[test]
    fn type_mismatch_names_both_kinds() {
        let s = schema(ModelDecl::new("P").field(FieldSpec::boolean("animated")));
        match validate(&tree(json!({ "animated": "yes" })), &s) {
            Err(MarshalError::TypeMismatch { expected, found, .. }) => {
                assert_eq!(expected, "boolean");
                assert_eq!(found, "string");
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn enum_checks_list_elements_and_map_values() {
        let s = schema(
            ModelDecl::new("P")
                .field(FieldSpec::list("modes").with_enum(["a", "b"]))
                .field(FieldSpec::map("levels").with_enum([1i64, 2])),
        );
        assert!(validate(&tree(json!({ "modes": ["a", "b", "a"], "levels": { "x": 1, "y": 2.0 } })), &s).is_ok());

        let err = validate(&tree(json!({ "modes": ["a", "c"] })), &s).expect_err("c is not an option");
        assert_eq!(err.key(), "modes[1]");

        let err = validate(&tree(json!({ "levels": { "x": 3 } })), &s).expect_err("3 is not an option");
        assert_eq!(err.key(), "levels.x");
    }

    #[test]
    fn nested_list_elements_must_be_objects() {
        let s = schema(ModelDecl::new("P").field(FieldSpec::nested_list("items", "Item")));
        let err = validate(&tree(json!({ "items": [{}, 3] })), &s).expect_err("3 is not an object");
        assert_eq!(err.key(), "items[1]");
    }

    #[test]
    fn setters_are_ignored() {
        let s = schema(ModelDecl::new("P").field(FieldSpec::string("url").required().setter()));
        assert!(validate(&Map::new(), &s).is_ok());
    }

    #[test]
    fn deep_validation_reports_nested_paths() {
        let set = SchemaSet::from_decls(&[
            ModelDecl::new("Outer").field(FieldSpec::nested_list("items", "Item")),
            ModelDecl::new("Item").field(FieldSpec::number("ttl").required()),
        ])
        .expect("valid declarations");
        let outer = set.schema(&TypeKey::new("Outer")).expect("outer");

        let err = validate_deep(&tree(json!({ "items": [{ "ttl": 1 }, {}] })), &outer, &set)
            .expect_err("second item lacks ttl");
        assert_eq!(err.key(), "items[1].ttl");
    }
}
