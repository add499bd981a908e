//! Contract between the bridge and native method implementations.

use marshal::{MarshalError, TypedView};
use schema::MethodDecl;
use serde_json::{Map, Value};
use thiserror::Error;
use types::{Platform, StatusCode};

/// Where a call came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Platform tag of the call
    pub platform: Platform,
    /// Namespace the method was resolved in
    pub namespace: String,
    /// Container the call was routed to, if any
    pub container_id: Option<String>,
    /// Method name
    pub method: String,
}

/// Failure reported by an implementation, carrying any status code.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct MethodFailure {
    /// Status code returned to the caller
    pub code: StatusCode,
    /// Human-readable message
    pub message: String,
    /// Optional payload returned alongside the failure
    pub data: Option<Map<String, Value>>,
}

impl MethodFailure {
    /// Failure with `code` and `message` and no data.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    /// Generic `FAIL`.
    pub fn fail(message: impl Into<String>) -> Self { Self::new(StatusCode::Fail, message) }

    /// `NOT_FOUND`.
    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NotFound, message) }

    /// `NOT_IMPLEMENTED`.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotImplemented, message)
    }

    /// Attach a data payload.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }
}

/// Errors met while descending into nested parameters are parameter errors.
impl From<MarshalError> for MethodFailure {
    fn from(err: MarshalError) -> Self { Self::new(StatusCode::InvalidParameter, format!("Invalid params: {}", err)) }
}

/// A native method callable through the bridge.
///
/// `declaration` describes the parameter and result models; the bridge
/// derives their schemas once at registration. `invoke` receives parameters
/// that already have defaults applied and passed validation, and returns the
/// raw result tree, which the bridge defaults, validates and serializes.
pub trait BridgeMethod: Send + Sync {
    /// Declaration of the method and the models it uses.
    fn declaration(&self) -> MethodDecl;

    /// Run the method.
    fn invoke(&self, params: TypedView, ctx: &CallContext) -> Result<Map<String, Value>, MethodFailure>;
}
