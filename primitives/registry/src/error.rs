//! Registry lookup errors.

use schema::SchemaError;
use thiserror::Error;
use types::Platform;

/// Errors raised when resolving a call target
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The namespace has never had a method registered in it
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),
    /// The namespace exists but has no such method for the platform
    #[error("Method `{name}` is not registered for platform {platform} in namespace {namespace}")]
    MethodNotRegistered {
        /// Platform of the call
        platform: Platform,
        /// Namespace of the call
        namespace: String,
        /// Requested method
        name: String,
    },
    /// The method's schemas could not be derived
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
