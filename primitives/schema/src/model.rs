//! Immutable per-type schemas.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decl::ModelDecl;
use crate::error::{Result, SchemaError};
use crate::field::FieldSpec;

/// Stable identity of a parameter or result model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Create a key from a model name.
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    /// Model name.
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self { Self(name.to_string()) }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self { Self(name) }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Field table of one model, indexed by key and by accessor.
///
/// A published schema is never mutated; share it through `Arc<Schema>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    key: TypeKey,
    description: String,
    fields: Vec<FieldSpec>,
    by_key: HashMap<String, usize>,
    by_accessor: HashMap<String, usize>,
    placeholder: bool,
}

impl Schema {
    /// Build a schema from its declaration, checking every field.
    pub fn from_decl(decl: &ModelDecl) -> Result<Self> {
        let key = TypeKey::new(decl.name.clone());
        let mut by_key = HashMap::new();
        let mut by_accessor = HashMap::new();

        for (index, field) in decl.fields.iter().enumerate() {
            field.check(&key)?;
            if by_accessor.insert(field.accessor_name().to_string(), index).is_some() {
                return Err(SchemaError::DuplicateKey {
                    model: key,
                    key: field.accessor_name().to_string(),
                });
            }
            if field.is_getter() && by_key.insert(field.key.clone(), index).is_some() {
                return Err(SchemaError::DuplicateKey { model: key, key: field.key.clone() });
            }
        }

        Ok(Self {
            key,
            description: decl.description.clone(),
            fields: decl.fields.clone(),
            by_key,
            by_accessor,
            placeholder: false,
        })
    }

    /// Empty schema standing in for a type whose derivation is in progress.
    pub fn placeholder(key: TypeKey) -> Self {
        Self {
            key,
            description: String::new(),
            fields: Vec::new(),
            by_key: HashMap::new(),
            by_accessor: HashMap::new(),
            placeholder: true,
        }
    }

    /// Type this schema describes.
    pub fn key(&self) -> &TypeKey { &self.key }

    /// Model description.
    pub fn description(&self) -> &str { &self.description }

    /// Whether this is a cycle placeholder rather than a derived schema.
    pub fn is_placeholder(&self) -> bool { self.placeholder }

    /// Every declared field in declaration order.
    pub fn fields(&self) -> &[FieldSpec] { &self.fields }

    /// Getter fields in declaration order.
    pub fn getters(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_getter())
    }

    /// Getter field stored under `key`.
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.by_key.get(key).map(|&i| &self.fields[i])
    }

    /// Field declared through the accessor `name`.
    pub fn field_by_accessor(&self, name: &str) -> Option<&FieldSpec> {
        self.by_accessor.get(name).map(|&i| &self.fields[i])
    }

    /// Distinct nested types referenced by getter fields.
    pub fn nested_types(&self) -> Vec<&TypeKey> {
        let mut keys: Vec<&TypeKey> = Vec::new();
        for key in self.getters().filter_map(|f| f.nested_type()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

/// Source of schemas for nested types.
pub trait SchemaLookup: Send + Sync {
    /// Return the schema for `key`.
    fn schema(&self, key: &TypeKey) -> Result<Arc<Schema>>;
}

/// Fixed set of already-derived schemas.
#[derive(Debug, Default, Clone)]
pub struct SchemaSet {
    schemas: HashMap<TypeKey, Arc<Schema>>,
}

impl SchemaSet {
    /// Create an empty set.
    pub fn new() -> Self { Self::default() }

    /// Derive and add a schema for every declaration.
    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a ModelDecl>) -> Result<Self> {
        let mut set = Self::new();
        for decl in decls {
            set.insert(Schema::from_decl(decl)?);
        }
        Ok(set)
    }

    /// Add a schema, replacing any previous one with the same key.
    pub fn insert(&mut self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.schemas.insert(schema.key().clone(), schema.clone());
        schema
    }
}

impl SchemaLookup for SchemaSet {
    fn schema(&self, key: &TypeKey) -> Result<Arc<Schema>> {
        self.schemas.get(key).cloned().ok_or_else(|| SchemaError::UnknownModel(key.clone()))
    }
}
