#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Platform Adapter Library
//!
//! This crate connects script runtimes to native method implementations.
//! Each platform adapter turns its runtime's payload representation into a
//! validated [`TypedView`](marshal::TypedView) and encodes canonical results
//! back; both adapters share the same validator, default injector and
//! serializer. The [`Bridge`] facade ties adapters, the method registry and
//! the schema cache together behind a single lookup-and-invoke entry point.

pub mod bridge;
pub mod error;
pub mod lynx;
pub mod method;
pub mod platform_adapter;
pub mod web;

pub use bridge::{Bridge, BridgeCall, BridgeConfig, BridgeResponse};
pub use error::{BridgeError, Result};
pub use lynx::LynxAdapter;
pub use method::{BridgeMethod, CallContext, MethodFailure};
pub use platform_adapter::PlatformAdapter;
pub use web::WebAdapter;
