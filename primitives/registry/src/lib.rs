#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Method Bridge Registry
//!
//! This crate holds the concurrent, shared state of the bridge:
//! - [`SchemaCache`]: derives each schema once and memoizes it
//! - [`MethodRegistry`]: maps (platform, namespace, name) to a method
//! - [`ScopeManager`]: per-container cache and registry pairs

pub mod error;
pub mod method_registry;
pub mod schema_cache;
pub mod scopes;

pub use error::{RegistryError, Result};
pub use method_registry::{MethodDescriptor, MethodRegistry, DEFAULT_NAMESPACE};
pub use schema_cache::{MethodSchemas, SchemaCache};
pub use scopes::{Scope, ScopeManager};
