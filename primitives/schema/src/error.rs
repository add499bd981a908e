//! Errors raised while deriving schemas from declarations.

use thiserror::Error;

use crate::model::TypeKey;

/// Errors that can occur while building or loading schemas
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field's declared metadata is internally inconsistent
    #[error("Malformed field `{key}` in model `{model}`: {reason}")]
    MalformedField {
        /// Model declaring the field
        model: TypeKey,
        /// Key of the offending field
        key: String,
        /// What is wrong with it
        reason: String,
    },
    /// Two getter fields share a key, or two fields share an accessor
    #[error("Duplicate key `{key}` in model `{model}`")]
    DuplicateKey {
        /// Model declaring the fields
        model: TypeKey,
        /// Repeated key
        key: String,
    },
    /// A model was declared again with different fields
    #[error("Model `{0}` is already declared with different fields")]
    ConflictingModel(TypeKey),
    /// No declaration was registered for a type key
    #[error("Unknown model `{0}`")]
    UnknownModel(TypeKey),
    /// A declaration or metadata file was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A declaration or metadata file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
