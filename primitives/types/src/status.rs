//! Status codes returned across the bridge boundary.
//!
//! The numeric values are a wire contract with script-side callers and must
//! never change.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of a bridge call as seen by the script runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// The call completed
    Success,
    /// Generic failure reported by the method implementation
    Fail,
    /// No method with this name is registered for the platform
    UnregisteredMethod,
    /// The parameters did not satisfy the method's schema
    InvalidParameter,
    /// The namespace does not exist
    InvalidNamespace,
    /// The implementation produced a result violating its schema
    InvalidResult,
    /// Access to a protected resource was denied
    UnauthorizedAccess,
    /// The user cancelled the operation
    OperationCancelled,
    /// The operation timed out
    OperationTimeout,
    /// The requested entity does not exist
    NotFound,
    /// The method exists but has no implementation on this host
    NotImplemented,
    /// The entity being created already exists
    AlreadyExists,
    /// The result model has the wrong type
    ResultModelTypeWrong,
    /// Unclassified failure
    Unknown,
    /// Network is not reachable
    NetworkUnreachable,
    /// Network request timed out
    NetworkTimeout,
    /// A remote response could not be parsed
    MalformedResponse,
}

const STATUS_TABLE: [(StatusCode, i32, &str); 17] = [
    (StatusCode::Success, 1, "SUCCESS"),
    (StatusCode::Fail, 0, "FAIL"),
    (StatusCode::UnregisteredMethod, -2, "UNREGISTERED_METHOD"),
    (StatusCode::InvalidParameter, -3, "INVALID_PARAMETER"),
    (StatusCode::InvalidNamespace, -4, "INVALID_NAMESPACE"),
    (StatusCode::InvalidResult, -5, "INVALID_RESULT"),
    (StatusCode::UnauthorizedAccess, -6, "UNAUTHORIZED_ACCESS"),
    (StatusCode::OperationCancelled, -7, "OPERATION_CANCELLED"),
    (StatusCode::OperationTimeout, -8, "OPERATION_TIMEOUT"),
    (StatusCode::NotFound, -9, "NOT_FOUND"),
    (StatusCode::NotImplemented, -10, "NOT_IMPLEMENTED"),
    (StatusCode::AlreadyExists, -11, "ALREADY_EXISTS"),
    (StatusCode::ResultModelTypeWrong, -801, "RESULT_MODEL_TYPE_WRONG"),
    (StatusCode::Unknown, -1000, "UNKNOWN"),
    (StatusCode::NetworkUnreachable, -1001, "NETWORK_UNREACHABLE"),
    (StatusCode::NetworkTimeout, -1002, "NETWORK_TIMEOUT"),
    (StatusCode::MalformedResponse, -1003, "MALFORMED_RESPONSE"),
];

impl StatusCode {
    fn entry(&self) -> &'static (StatusCode, i32, &'static str) {
        STATUS_TABLE
            .iter()
            .find(|(status, _, _)| status == self)
            .unwrap_or(&STATUS_TABLE[13])
    }

    /// Numeric wire value.
    pub fn code(&self) -> i32 { self.entry().1 }

    /// Upper-case symbolic name (e.g. `INVALID_PARAMETER`).
    pub fn name(&self) -> &'static str { self.entry().2 }

    /// Whether this status denotes a successful call.
    pub fn is_success(&self) -> bool { *self == StatusCode::Success }

    /// Map a wire value back to a status.
    ///
    /// Returns `None` for values outside the taxonomy.
    pub fn from_code(code: i32) -> Option<Self> {
        STATUS_TABLE.iter().find(|(_, value, _)| *value == code).map(|(status, _, _)| *status)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        StatusCode::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status code {}", code)))
    }
}
