//! Web adapter: immutable JSON trees.
//!
//! The caller's tree is never touched; defaults are applied to a copy.

use std::sync::Arc;

use marshal::TypedView;
use schema::{Schema, SchemaLookup};
use serde_json::{Map, Value};
use types::Platform;

use crate::platform_adapter::PlatformAdapter;

/// Adapter for web content payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebAdapter;

impl PlatformAdapter for WebAdapter {
    type Input<'a> = &'a Value;
    type Output = Value;

    fn platform(&self) -> Platform { Platform::Web }

    fn prepare(&self, params: &Value, schema: Arc<Schema>, lookup: Arc<dyn SchemaLookup>) -> marshal::Result<TypedView> {
        TypedView::from_value(params.clone(), schema, lookup)
    }

    fn encode(&self, result: Map<String, Value>) -> Value { Value::Object(result) }
}
