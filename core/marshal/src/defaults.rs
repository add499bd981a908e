//! Default injection.
//!
//! Writes each getter field's declared default wherever the field is absent
//! or null. Injection runs before validation and is idempotent.

use schema::{FieldType, Schema, SchemaLookup};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::validator::{present, resolve_nested};

/// Fill defaults into the top level of `tree` in place.
///
/// Returns the number of fields written.
pub fn inject_defaults(tree: &mut Map<String, Value>, schema: &Schema) -> usize {
    let mut written = 0;
    for field in schema.getters() {
        if present(tree, &field.key).is_some() {
            continue;
        }
        if let Some(default) = field.default.to_value() {
            tree.insert(field.key.clone(), default);
            written += 1;
        }
    }
    written
}

/// Copy of `tree` with top-level defaults filled in.
pub fn with_defaults(tree: &Map<String, Value>, schema: &Schema) -> Map<String, Value> {
    let mut copy = tree.clone();
    inject_defaults(&mut copy, schema);
    copy
}

/// Fill defaults in place, descending into nested objects and every object
/// element of nested lists.
///
/// Values of the wrong kind are left untouched for the validator to report.
pub fn inject_defaults_deep(
    tree: &mut Map<String, Value>,
    schema: &Schema,
    lookup: &dyn SchemaLookup,
) -> Result<usize> {
    let mut written = inject_defaults(tree, schema);

    for field in schema.getters() {
        let Some(nested) = field.nested_type() else {
            continue;
        };
        let Some(value) = tree.get_mut(&field.key) else {
            continue;
        };
        match (&field.ty, value) {
            (FieldType::Nested(_), Value::Object(sub)) => {
                let nested_schema = resolve_nested(lookup, schema.key(), &field.key, nested)?;
                written += inject_defaults_deep(sub, &nested_schema, lookup).map_err(|e| e.within(&field.key))?;
            }
            (FieldType::NestedList(_), Value::Array(items)) => {
                let nested_schema = resolve_nested(lookup, schema.key(), &field.key, nested)?;
                for (index, item) in items.iter_mut().enumerate() {
                    if let Value::Object(sub) = item {
                        written += inject_defaults_deep(sub, &nested_schema, lookup)
                            .map_err(|e| e.within(&format!("[{}]", index)).within(&field.key))?;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(written)
}
