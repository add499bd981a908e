//! Platform Adapter Trait
//!
//! This module defines the trait each runtime's payload pipeline implements.
//! Web content hands over an immutable JSON tree, the declarative UI engine a
//! mutable map. Both run the same steps: inject defaults, validate, wrap in a
//! [`TypedView`], and later encode the canonical result tree.

use std::sync::Arc;

use marshal::TypedView;
use schema::{Schema, SchemaLookup};
use serde_json::{Map, Value};
use types::Platform;

/// Payload pipeline of one platform.
pub trait PlatformAdapter {
    /// Borrowed form in which call parameters arrive
    type Input<'a>;
    /// Form in which results are handed back
    type Output: Into<Value>;

    /// Platform whose payload representation this adapter handles.
    fn platform(&self) -> Platform;

    /// Apply defaults, validate and wrap the parameters.
    fn prepare(
        &self,
        params: Self::Input<'_>,
        schema: Arc<Schema>,
        lookup: Arc<dyn SchemaLookup>,
    ) -> marshal::Result<TypedView>;

    /// Turn a canonical result tree into the platform's result form.
    fn encode(&self, result: Map<String, Value>) -> Self::Output;
}
