//! Lynx adapter: mutable maps.
//!
//! Defaults are written straight into the caller's map, which is then
//! validated and copied into the view.

use std::sync::Arc;

use marshal::{inject_defaults, TypedView};
use schema::{Schema, SchemaLookup};
use serde_json::{Map, Value};
use types::Platform;

use crate::platform_adapter::PlatformAdapter;

/// Adapter for declarative UI engine payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct LynxAdapter;

impl PlatformAdapter for LynxAdapter {
    type Input<'a> = &'a mut Map<String, Value>;
    type Output = Map<String, Value>;

    fn platform(&self) -> Platform { Platform::Lynx }

    fn prepare(
        &self,
        params: &mut Map<String, Value>,
        schema: Arc<Schema>,
        lookup: Arc<dyn SchemaLookup>,
    ) -> marshal::Result<TypedView> {
        let written = inject_defaults(params, &schema);
        tracing::trace!(model = %schema.key(), written, "defaults injected in place");
        TypedView::from_defaulted(params.clone(), schema, lookup)
    }

    fn encode(&self, result: Map<String, Value>) -> Map<String, Value> { result }
}
