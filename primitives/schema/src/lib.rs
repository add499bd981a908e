#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Method Bridge Schema Model
//!
//! This crate defines the static description of bridge method parameters and
//! results:
//! - [`FieldSpec`]: one field (key, required flag, kind, enum options, default)
//! - [`Schema`]: the immutable, indexed field table of one model
//! - [`ModelDecl`] / [`MethodDecl`]: declaration tables schemas are derived from
//! - [`metadata`]: conversion of stub-generator metadata into declarations

pub mod decl;
pub mod error;
pub mod field;
pub mod metadata;
pub mod model;

pub use decl::{check_method_decl, MethodDecl, ModelDecl};
pub use error::{Result, SchemaError};
pub use field::{
    value_kind_name, AccessorRole, DefaultValue, EnumValue, FieldSpec, FieldType, PrimitiveKind,
};
pub use metadata::{from_json_str, load_method_metadata, MethodMetadata, TypeSummary};
pub use model::{Schema, SchemaLookup, SchemaSet, TypeKey};
