#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Method Bridge Marshalling
//!
//! This crate moves untrusted payloads across the bridge boundary. The
//! components operate on `serde_json` trees and are shared by every platform
//! adapter:
//! - [`validator`]: required, kind and enum checks
//! - [`defaults`]: default injection, shallow or deep
//! - [`view`]: typed read access for method implementations
//! - [`serializer`]: canonical result trees

pub mod defaults;
pub mod error;
pub mod serializer;
pub mod validator;
pub mod view;

pub use defaults::{inject_defaults, inject_defaults_deep, with_defaults};
pub use error::{MarshalError, Result};
pub use serializer::serialize;
pub use validator::{validate, validate_deep};
pub use view::{FieldValue, TypedView};
