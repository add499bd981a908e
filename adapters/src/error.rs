//! Bridge errors and their status codes.

use marshal::MarshalError;
use registry::RegistryError;
use schema::SchemaError;
use thiserror::Error;
use types::StatusCode;

use crate::method::MethodFailure;

/// Errors that end a bridge call or refuse a registration
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The call target could not be found
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The parameters failed validation
    #[error("Invalid params: {0}")]
    InvalidParams(#[source] MarshalError),
    /// The implementation returned a result its schema rejects
    #[error("Invalid result: {0}")]
    InvalidResult(#[source] MarshalError),
    /// The method's declaration could not be turned into schemas
    #[error("Registration refused: {0}")]
    Registration(#[from] SchemaError),
    /// The implementation reported a failure
    #[error(transparent)]
    Method(#[from] MethodFailure),
}

impl BridgeError {
    /// Status code reported to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::Registry(RegistryError::NamespaceNotFound(_)) => StatusCode::InvalidNamespace,
            BridgeError::Registry(RegistryError::MethodNotRegistered { .. }) => StatusCode::UnregisteredMethod,
            BridgeError::Registry(RegistryError::Schema(_)) | BridgeError::Registration(_) => StatusCode::Fail,
            BridgeError::InvalidParams(_) => StatusCode::InvalidParameter,
            BridgeError::InvalidResult(_) => StatusCode::InvalidResult,
            BridgeError::Method(failure) => failure.code,
        }
    }
}

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use schema::TypeKey;
    use types::Platform;

    use super::*;

    #[test]
    fn registry_errors_map_to_lookup_codes() {
        let missing_ns = BridgeError::from(RegistryError::NamespaceNotFound("x".into()));
        assert_eq!(missing_ns.status().code(), -4);

        let missing_method = BridgeError::from(RegistryError::MethodNotRegistered {
            platform: Platform::Web,
            namespace: "DEFAULT".into(),
            name: "nope".into(),
        });
        assert_eq!(missing_method.status().code(), -2);
    }

    #[test]
    fn marshal_errors_map_by_direction() {
        let err = || MarshalError::MissingRequiredField { model: TypeKey::new("P"), key: "k".into() };
        assert_eq!(BridgeError::InvalidParams(err()).status(), StatusCode::InvalidParameter);
        assert_eq!(BridgeError::InvalidResult(err()).status(), StatusCode::InvalidResult);
        assert!(BridgeError::InvalidParams(err()).to_string().starts_with("Invalid params: "));
    }

    #[test]
    fn method_failures_keep_their_code() {
        let err = BridgeError::from(MethodFailure::new(StatusCode::NotFound, "no such key"));
        assert_eq!(err.status().code(), -9);
        assert_eq!(err.to_string(), "no such key");
    }
}
