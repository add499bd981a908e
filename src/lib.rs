// SPDX-License-Identifier: CC0-1.0

//! idlbridge umbrella crate.
//!
//! Re-exports the workspace member crates so embedders can depend on a
//! single crate. Functional code lives in the members under `primitives`,
//! `core` and `adapters`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use adapters::{
    Bridge, BridgeCall, BridgeConfig, BridgeError, BridgeMethod, BridgeResponse, CallContext, LynxAdapter,
    MethodFailure, PlatformAdapter, WebAdapter,
};
pub use config::Config;
pub use marshal::{FieldValue, MarshalError, TypedView};
pub use registry::{MethodRegistry, SchemaCache, ScopeManager};
pub use schema::{DefaultValue, FieldSpec, MethodDecl, ModelDecl, Schema, SchemaError, TypeKey};
pub use types::{Platform, StatusCode};
pub use adapters;
pub use config;
pub use marshal;
pub use registry;
pub use schema;
pub use types;

/// Miscellaneous metadata about the idlbridge workspace.
pub mod idlbridge_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
