//! Marshalling errors.

use schema::{SchemaError, TypeKey};
use thiserror::Error;

/// Reasons a raw tree is rejected by a schema.
///
/// `key` is the path of the offending field relative to the tree that was
/// checked: `scheme`, `options.replaceType`, `items[1].ttl`.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// A required field is absent or null
    #[error("Missing required field `{key}` in {model}")]
    MissingRequiredField {
        /// Model being checked
        model: TypeKey,
        /// Field path
        key: String,
    },
    /// A value does not have the declared kind
    #[error("Field `{key}` in {model} expected {expected}, found {found}")]
    TypeMismatch {
        /// Model being checked
        model: TypeKey,
        /// Field path
        key: String,
        /// Declared kind
        expected: &'static str,
        /// Kind of the supplied value
        found: &'static str,
    },
    /// A value is not one of the declared enum options
    #[error("Field `{key}` in {model} has value {value} outside its enum options")]
    EnumViolation {
        /// Model being checked
        model: TypeKey,
        /// Field path
        key: String,
        /// Rejected value, rendered as JSON
        value: String,
    },
    /// The schema of a nested field could not be obtained
    #[error("Field `{key}` in {model} refers to unresolvable type {nested}: {source}")]
    UnresolvableNestedType {
        /// Model being checked
        model: TypeKey,
        /// Field path
        key: String,
        /// Nested type
        nested: TypeKey,
        /// Why resolution failed
        source: SchemaError,
    },
}

impl MarshalError {
    /// Path of the offending field.
    pub fn key(&self) -> &str {
        match self {
            MarshalError::MissingRequiredField { key, .. }
            | MarshalError::TypeMismatch { key, .. }
            | MarshalError::EnumViolation { key, .. }
            | MarshalError::UnresolvableNestedType { key, .. } => key,
        }
    }

    /// Prefix the field path with the parent segment a nested tree hangs off.
    pub fn within(mut self, parent: &str) -> Self {
        let key = match &mut self {
            MarshalError::MissingRequiredField { key, .. }
            | MarshalError::TypeMismatch { key, .. }
            | MarshalError::EnumViolation { key, .. }
            | MarshalError::UnresolvableNestedType { key, .. } => key,
        };
        *key = if key.is_empty() {
            parent.to_string()
        } else if key.starts_with('[') {
            format!("{}{}", parent, key)
        } else {
            format!("{}.{}", parent, key)
        };
        self
    }
}

/// Result alias for marshalling operations
pub type Result<T> = std::result::Result<T, MarshalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_prefixed() {
        let err = MarshalError::MissingRequiredField { model: TypeKey::new("Item"), key: "ttl".into() };
        let err = err.within("[1]").within("items");
        assert_eq!(err.key(), "items[1].ttl");
        assert!(err.to_string().contains("`items[1].ttl`"));
    }
}
