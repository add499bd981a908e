//! Canonical serialization.
//!
//! Produces the tree handed back to script callers: declared defaults
//! applied, nested objects and nested lists serialized against their own
//! schemas, and undeclared keys carried over unchanged.

use schema::{FieldType, Schema, SchemaLookup};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::validator::{present, resolve_nested};

/// Serialize `tree` into its canonical, default-filled form.
pub fn serialize(tree: &Map<String, Value>, schema: &Schema, lookup: &dyn SchemaLookup) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    for field in schema.getters() {
        let value = match present(tree, &field.key) {
            Some(value) => serialize_field(field, value, schema, lookup)?,
            None => match field.default.to_value() {
                Some(default) => default,
                None => match tree.get(&field.key) {
                    Some(raw) => raw.clone(),
                    None => continue,
                },
            },
        };
        out.insert(field.key.clone(), value);
    }

    for (key, value) in tree {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    Ok(out)
}

fn serialize_field(
    field: &schema::FieldSpec,
    value: &Value,
    schema: &Schema,
    lookup: &dyn SchemaLookup,
) -> Result<Value> {
    let Some(nested) = field.nested_type() else {
        return Ok(value.clone());
    };

    match (&field.ty, value) {
        (FieldType::Nested(_), Value::Object(sub)) => {
            let nested_schema = resolve_nested(lookup, schema.key(), &field.key, nested)?;
            let sub = serialize(sub, &nested_schema, lookup).map_err(|e| e.within(&field.key))?;
            Ok(Value::Object(sub))
        }
        (FieldType::NestedList(_), Value::Array(items)) => {
            let nested_schema = resolve_nested(lookup, schema.key(), &field.key, nested)?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(match item {
                    Value::Object(sub) => Value::Object(
                        serialize(sub, &nested_schema, lookup)
                            .map_err(|e| e.within(&format!("[{}]", index)).within(&field.key))?,
                    ),
                    other => other.clone(),
                });
            }
            Ok(Value::Array(out))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use schema::{DefaultValue, FieldSpec, ModelDecl, SchemaSet, TypeKey};
    use serde_json::json;

    use super::*;
    use crate::defaults::inject_defaults_deep;

    fn set() -> SchemaSet {
        SchemaSet::from_decls(&[
            ModelDecl::new("Outer")
                .field(FieldSpec::string("mode").with_default(DefaultValue::String("push".into())))
                .field(FieldSpec::nested("inner", "Inner"))
                .field(FieldSpec::nested_list("items", "Inner")),
            ModelDecl::new("Inner").field(FieldSpec::number("count").with_default(DefaultValue::Int(1))),
        ])
        .expect("valid declarations")
    }

    #[test]
    fn undeclared_keys_pass_through() {
        let set = set();
        let outer = set.schema(&TypeKey::new("Outer")).expect("outer");
        let tree = json!({ "extra": [1, 2], "inner": { "note": "x" } }).as_object().cloned().expect("object");

        let out = serialize(&tree, &outer, &set).expect("serialize");
        assert_eq!(
            Value::Object(out),
            json!({ "mode": "push", "extra": [1, 2], "inner": { "count": 1, "note": "x" } })
        );
    }

    #[test]
    fn matches_deep_default_injection() {
        let set = set();
        let outer = set.schema(&TypeKey::new("Outer")).expect("outer");
        let tree = json!({ "mode": null, "items": [{}, { "count": 5 }], "inner": {} })
            .as_object()
            .cloned()
            .expect("object");

        let mut injected = tree.clone();
        inject_defaults_deep(&mut injected, &outer, &set).expect("inject");
        assert_eq!(serialize(&tree, &outer, &set).expect("serialize"), injected);
    }
}
