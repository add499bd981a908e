//! Typed read access to a validated raw tree.

use std::fmt;
use std::sync::Arc;

use schema::{value_kind_name, FieldSpec, FieldType, PrimitiveKind, Schema, SchemaLookup, TypeKey};
use serde_json::{Map, Number, Value};

use crate::defaults::inject_defaults;
use crate::error::{MarshalError, Result};
use crate::serializer::serialize;
use crate::validator::{present, resolve_nested, validate};

/// Value of one declared field, typed by its schema entry.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// String field
    String(String),
    /// Number field; integral values stay integral
    Number(Number),
    /// Boolean field
    Boolean(bool),
    /// Untyped list field
    List(Vec<Value>),
    /// Untyped map field
    Map(Map<String, Value>),
    /// Field of kind `any`
    Any(Value),
    /// Nested object
    Nested(TypedView),
    /// List of nested objects
    NestedList(Vec<TypedView>),
}

/// Read-only typed façade over a raw tree that passed validation.
///
/// Each view owns its tree; nothing is shared with the caller or with other
/// views.
#[derive(Clone)]
pub struct TypedView {
    schema: Arc<Schema>,
    tree: Map<String, Value>,
    lookup: Arc<dyn SchemaLookup>,
}

impl fmt::Debug for TypedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView").field("schema", self.schema.key()).field("tree", &self.tree).finish()
    }
}

impl TypedView {
    /// Inject defaults into `tree`, validate it and wrap it.
    pub fn build(mut tree: Map<String, Value>, schema: Arc<Schema>, lookup: Arc<dyn SchemaLookup>) -> Result<Self> {
        inject_defaults(&mut tree, &schema);
        Self::from_defaulted(tree, schema, lookup)
    }

    /// Validate a tree whose defaults are already in place and wrap it.
    pub fn from_defaulted(tree: Map<String, Value>, schema: Arc<Schema>, lookup: Arc<dyn SchemaLookup>) -> Result<Self> {
        validate(&tree, &schema)?;
        Ok(Self { schema, tree, lookup })
    }

    /// Like [`TypedView::build`] for an arbitrary value, which must be an object.
    pub fn from_value(value: Value, schema: Arc<Schema>, lookup: Arc<dyn SchemaLookup>) -> Result<Self> {
        match value {
            Value::Object(tree) => Self::build(tree, schema, lookup),
            Value::Null => Self::build(Map::new(), schema, lookup),
            other => Err(MarshalError::TypeMismatch {
                model: schema.key().clone(),
                key: String::new(),
                expected: PrimitiveKind::Map.as_str(),
                found: value_kind_name(&other),
            }),
        }
    }

    /// Schema the view was validated against.
    pub fn schema(&self) -> &Arc<Schema> { &self.schema }

    /// Type key of the schema.
    pub fn type_key(&self) -> &TypeKey { self.schema.key() }

    /// Default-filled raw tree.
    pub fn raw(&self) -> &Map<String, Value> { &self.tree }

    /// Give up the view and return its tree.
    pub fn into_raw(self) -> Map<String, Value> { self.tree }

    /// Raw value under `key`; null reads as absent.
    pub fn get(&self, key: &str) -> Option<&Value> { present(&self.tree, key) }

    /// Whether a non-null value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool { self.get(key).is_some() }

    /// String value under `key`.
    pub fn string(&self, key: &str) -> Option<&str> { self.get(key).and_then(Value::as_str) }

    /// Number under `key` as a float.
    pub fn number(&self, key: &str) -> Option<f64> { self.get(key).and_then(Value::as_f64) }

    /// Number under `key` as an integer; floats with no fractional part qualify.
    pub fn integer(&self, key: &str) -> Option<i64> {
        let Value::Number(n) = self.get(key)? else {
            return None;
        };
        n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
        })
    }

    /// Boolean under `key`.
    pub fn boolean(&self, key: &str) -> Option<bool> { self.get(key).and_then(Value::as_bool) }

    /// List under `key`.
    pub fn list(&self, key: &str) -> Option<&Vec<Value>> { self.get(key).and_then(Value::as_array) }

    /// Map under `key`.
    pub fn map(&self, key: &str) -> Option<&Map<String, Value>> { self.get(key).and_then(Value::as_object) }

    /// View of the nested object under `key`, validated against its schema.
    ///
    /// Returns `Ok(None)` when the field is absent. Fails with
    /// `TypeMismatch` if `key` is not declared as a nested object.
    pub fn nested(&self, key: &str) -> Result<Option<TypedView>> {
        let field = self.declared(key, |ty| matches!(ty, FieldType::Nested(_)), PrimitiveKind::Map)?;
        let Some(Value::Object(sub)) = self.get(key) else {
            return Ok(None);
        };
        let nested_schema = self.nested_schema(field)?;
        TypedView::build(sub.clone(), nested_schema, Arc::clone(&self.lookup)).map(Some).map_err(|e| {
            tracing::debug!(model = %self.schema.key(), key, error = %e, "nested object rejected");
            e.within(key)
        })
    }

    /// Views of every element of the nested list under `key`.
    pub fn nested_list(&self, key: &str) -> Result<Option<Vec<TypedView>>> {
        let field = self.declared(key, |ty| matches!(ty, FieldType::NestedList(_)), PrimitiveKind::List)?;
        let Some(Value::Array(items)) = self.get(key) else {
            return Ok(None);
        };
        let nested_schema = self.nested_schema(field)?;
        let mut views = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let view = TypedView::from_value(item.clone(), Arc::clone(&nested_schema), Arc::clone(&self.lookup))
                .map_err(|e| {
                    tracing::debug!(model = %self.schema.key(), key, index, error = %e, "nested list element rejected");
                    e.within(&format!("[{}]", index)).within(key)
                })?;
            views.push(view);
        }
        Ok(Some(views))
    }

    /// Typed value of the declared getter `key`.
    ///
    /// Returns `Ok(None)` for absent fields and for undeclared keys.
    pub fn field(&self, key: &str) -> Result<Option<FieldValue>> {
        match self.schema.field(key) {
            Some(field) => self.field_value(field),
            None => Ok(None),
        }
    }

    /// Typed value of the field declared through the accessor `name`.
    pub fn by_accessor(&self, name: &str) -> Result<Option<FieldValue>> {
        match self.schema.field_by_accessor(name) {
            Some(field) => self.field_value(field),
            None => Ok(None),
        }
    }

    /// Canonical tree with defaults applied at every nesting level.
    pub fn to_canonical_tree(&self) -> Result<Map<String, Value>> {
        serialize(&self.tree, &self.schema, self.lookup.as_ref())
    }

    fn field_value(&self, field: &FieldSpec) -> Result<Option<FieldValue>> {
        let Some(value) = self.get(&field.key) else {
            return Ok(None);
        };
        let typed = match (&field.ty, value) {
            (FieldType::Nested(_), _) => self.nested(&field.key)?.map(FieldValue::Nested),
            (FieldType::NestedList(_), _) => self.nested_list(&field.key)?.map(FieldValue::NestedList),
            (FieldType::Primitive(PrimitiveKind::String), Value::String(s)) => Some(FieldValue::String(s.clone())),
            (FieldType::Primitive(PrimitiveKind::Number), Value::Number(n)) => Some(FieldValue::Number(n.clone())),
            (FieldType::Primitive(PrimitiveKind::Boolean), Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
            (FieldType::Primitive(PrimitiveKind::List), Value::Array(items)) => Some(FieldValue::List(items.clone())),
            (FieldType::Primitive(PrimitiveKind::Map), Value::Object(map)) => Some(FieldValue::Map(map.clone())),
            (FieldType::Primitive(PrimitiveKind::Any), other) => Some(FieldValue::Any(other.clone())),
            // Setter-only fields are not validated and may hold anything.
            (_, other) => Some(FieldValue::Any(other.clone())),
        };
        Ok(typed)
    }

    fn declared(&self, key: &str, accepts: impl Fn(&FieldType) -> bool, expected: PrimitiveKind) -> Result<&FieldSpec> {
        match self.schema.field(key) {
            Some(field) if accepts(&field.ty) => Ok(field),
            Some(field) => Err(MarshalError::TypeMismatch {
                model: self.schema.key().clone(),
                key: key.to_string(),
                expected: expected.as_str(),
                found: field.kind().as_str(),
            }),
            None => Err(MarshalError::TypeMismatch {
                model: self.schema.key().clone(),
                key: key.to_string(),
                expected: expected.as_str(),
                found: "undeclared",
            }),
        }
    }

    fn nested_schema(&self, field: &FieldSpec) -> Result<Arc<Schema>> {
        match field.nested_type() {
            Some(nested) => resolve_nested(self.lookup.as_ref(), self.schema.key(), &field.key, nested),
            None => Err(MarshalError::TypeMismatch {
                model: self.schema.key().clone(),
                key: field.key.clone(),
                expected: PrimitiveKind::Map.as_str(),
                found: field.kind().as_str(),
            }),
        }
    }
}
