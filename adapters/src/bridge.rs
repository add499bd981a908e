//! Bridge Facade
//!
//! This module exposes the two entry points the outside world uses: method
//! registration and lookup-and-invoke. A call is resolved in the registry of
//! its scope, its parameters run through a platform adapter, the native
//! implementation is invoked, and the result is defaulted, validated and
//! serialized before it is handed back as a status code, message and data
//! tree.

use std::sync::Arc;

use marshal::{serialize, validate_deep, TypedView};
use registry::{MethodDescriptor, MethodRegistry, SchemaCache, Scope, ScopeManager};
use schema::{ModelDecl, SchemaLookup, TypeKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use types::{Platform, StatusCode};

use crate::error::{BridgeError, Result};
use crate::lynx::LynxAdapter;
use crate::method::{BridgeMethod, CallContext};
use crate::platform_adapter::PlatformAdapter;
use crate::web::WebAdapter;

/// Settings of a [`Bridge`]
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeConfig {
    /// Namespace used when a call or registration does not name one
    pub default_namespace: String,
    /// Allow background schema derivation through [`Bridge::prefetch`]
    pub background_derivation: bool,
    /// Check results against their schema before returning them
    pub validate_results: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_namespace: registry::DEFAULT_NAMESPACE.to_string(),
            background_derivation: true,
            validate_results: true,
        }
    }
}

impl From<&config::Config> for BridgeConfig {
    fn from(config: &config::Config) -> Self {
        Self {
            default_namespace: config.registry.default_namespace.clone(),
            background_derivation: config.registry.background_derivation,
            validate_results: config.validation.validate_results,
        }
    }
}

/// One incoming call on the immutable JSON path.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeCall {
    /// Platform tag of the caller
    pub platform: Platform,
    /// Namespace; the configured default when `None`
    pub namespace: Option<String>,
    /// Container the call belongs to, if any
    pub container_id: Option<String>,
    /// Method name
    pub method: String,
    /// Raw parameters
    pub params: Value,
}

impl BridgeCall {
    /// Call of `method` from `platform` in the default namespace.
    pub fn new(platform: Platform, method: impl Into<String>, params: Value) -> Self {
        Self { platform, namespace: None, container_id: None, method: method.into(), params }
    }

    /// Route the call to `namespace`.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Route the call to the scope of `container_id`.
    pub fn in_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }
}

/// Outcome of a call as seen by the script runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    /// Status code
    #[serde(rename = "code")]
    pub status: StatusCode,
    /// Human-readable message
    #[serde(rename = "msg")]
    pub message: String,
    /// Canonical result tree, or failure data
    #[serde(default)]
    pub data: Option<Value>,
}

impl BridgeResponse {
    /// Successful response carrying `data`.
    pub fn success(data: Value) -> Self {
        Self { status: StatusCode::Success, message: "Success".to_string(), data: Some(data) }
    }

    /// Response describing `err`.
    pub fn from_error(err: &BridgeError) -> Self {
        let data = match err {
            BridgeError::Method(failure) => failure.data.clone().map(Value::Object),
            _ => None,
        };
        Self { status: err.status(), message: err.to_string(), data }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool { self.status.is_success() }

    /// The `{"code", "msg", "data"}` envelope returned to scripts.
    pub fn to_envelope(&self) -> Value {
        json!({
            "code": self.status.code(),
            "msg": self.message,
            "data": self.data.clone().unwrap_or_else(|| Value::Object(Map::new())),
        })
    }

    /// Parse an envelope produced by [`BridgeResponse::to_envelope`].
    ///
    /// An empty `data` object reads back as no data.
    pub fn from_envelope(envelope: Value) -> serde_json::Result<Self> {
        let mut response: Self = serde_json::from_value(envelope)?;
        if matches!(&response.data, Some(Value::Object(map)) if map.is_empty()) {
            response.data = None;
        }
        Ok(response)
    }
}

impl From<Result<Value>> for BridgeResponse {
    fn from(outcome: Result<Value>) -> Self {
        match outcome {
            Ok(data) => Self::success(data),
            Err(err) => Self::from_error(&err),
        }
    }
}

type MethodScope = Scope<dyn BridgeMethod>;

/// Lookup-and-invoke facade over the method registry and schema cache.
pub struct Bridge {
    config: BridgeConfig,
    scopes: ScopeManager<dyn BridgeMethod>,
}

impl Default for Bridge {
    fn default() -> Self { Self::new(BridgeConfig::default()) }
}

impl Bridge {
    /// Create a bridge with an empty global scope.
    pub fn new(config: BridgeConfig) -> Self {
        let cache = Arc::new(SchemaCache::new().with_background(config.background_derivation));
        let registry: Arc<MethodRegistry<dyn BridgeMethod>> = Arc::new(MethodRegistry::new());
        let global = Arc::new(Scope::new(None, cache, registry));
        Self { config, scopes: ScopeManager::new(global) }
    }

    /// Create a bridge from the loaded configuration file.
    pub fn from_config(config: &config::Config) -> Self { Self::new(BridgeConfig::from(config)) }

    /// Settings in effect.
    pub fn config(&self) -> &BridgeConfig { &self.config }

    /// Global schema cache.
    pub fn cache(&self) -> &Arc<SchemaCache> { self.scopes.global().cache() }

    /// Global method registry.
    pub fn registry(&self) -> &Arc<MethodRegistry<dyn BridgeMethod>> { self.scopes.global().registry() }

    /// Container scopes.
    pub fn scopes(&self) -> &ScopeManager<dyn BridgeMethod> { &self.scopes }

    /// Register a model declaration in the global cache.
    pub fn register_model(&self, decl: ModelDecl) -> bool { self.cache().register_model(decl) }

    /// Derive `key` ahead of its first use.
    pub fn prefetch(&self, key: TypeKey) -> Option<JoinHandle<()>> { self.cache().prefetch(key) }

    /// Register `method` globally under `platform`.
    ///
    /// The method's schemas are derived now. If derivation fails the method
    /// is not registered, the failure is logged and returned, and the
    /// registry is left as it was.
    pub fn register_method(
        &self,
        method: Arc<dyn BridgeMethod>,
        platform: Platform,
        namespace: Option<&str>,
    ) -> Result<()> {
        self.register_into(self.scopes.global(), method, platform, namespace)
    }

    /// Register `method` in the scope of `container_id`, opening it if needed.
    pub fn register_container_method(
        &self,
        container_id: &str,
        method: Arc<dyn BridgeMethod>,
        platform: Platform,
        namespace: Option<&str>,
    ) -> Result<()> {
        let scope = self.scopes.open(container_id);
        self.register_into(&scope, method, platform, namespace)
    }

    fn register_into(
        &self,
        scope: &MethodScope,
        method: Arc<dyn BridgeMethod>,
        platform: Platform,
        namespace: Option<&str>,
    ) -> Result<()> {
        let namespace = namespace.unwrap_or(&self.config.default_namespace);
        let decl = method.declaration();
        let schemas = match scope.cache().resolve_method(&decl) {
            Ok(schemas) => schemas,
            Err(e) => {
                tracing::error!(method = %decl.name, namespace, error = %e, "method registration refused");
                return Err(BridgeError::Registration(e));
            }
        };

        let descriptor =
            MethodDescriptor::new(decl.name.clone(), Arc::clone(&schemas.param), Arc::clone(&schemas.result), method);
        scope.registry().register(descriptor, platform, namespace);
        tracing::info!(method = %decl.name, platform = %platform, namespace, container = ?scope.id(), "method registered");
        Ok(())
    }

    /// Open the scope of a UI container.
    pub fn open_container(&self, container_id: &str) { self.scopes.open(container_id); }

    /// Tear down the scope of a UI container.
    pub fn close_container(&self, container_id: &str) -> bool { self.scopes.close(container_id) }

    /// Handle a call on the immutable JSON path.
    pub fn call(&self, call: BridgeCall) -> BridgeResponse {
        let BridgeCall { platform, namespace, container_id, method, params } = call;
        let ctx = self.context(platform, namespace.as_deref(), container_id, &method);
        let outcome = self.dispatch(&WebAdapter, &params, ctx);
        self.respond(outcome, &method)
    }

    /// Handle a call on the mutable map path.
    ///
    /// Defaults are written into `params` before validation.
    pub fn call_with_map(
        &self,
        platform: Platform,
        namespace: Option<&str>,
        name: &str,
        params: &mut Map<String, Value>,
    ) -> BridgeResponse {
        let ctx = self.context(platform, namespace, None, name);
        let outcome = self.dispatch(&LynxAdapter, params, ctx);
        self.respond(outcome, name)
    }

    /// Like [`Bridge::call_with_map`], routed to a container scope.
    pub fn call_in_container_with_map(
        &self,
        container_id: &str,
        platform: Platform,
        namespace: Option<&str>,
        name: &str,
        params: &mut Map<String, Value>,
    ) -> BridgeResponse {
        let ctx = self.context(platform, namespace, Some(container_id.to_string()), name);
        let outcome = self.dispatch(&LynxAdapter, params, ctx);
        self.respond(outcome, name)
    }

    fn context(&self, platform: Platform, namespace: Option<&str>, container_id: Option<String>, method: &str) -> CallContext {
        CallContext {
            platform,
            namespace: namespace.unwrap_or(&self.config.default_namespace).to_string(),
            container_id,
            method: method.to_string(),
        }
    }

    fn respond(&self, outcome: Result<Value>, method: &str) -> BridgeResponse {
        if let Err(e) = &outcome {
            tracing::warn!(method, status = %e.status(), error = %e, "call failed");
        }
        BridgeResponse::from(outcome)
    }

    fn dispatch<A: PlatformAdapter>(&self, adapter: &A, params: A::Input<'_>, ctx: CallContext) -> Result<Value> {
        let scope = match &ctx.container_id {
            Some(id) => self.scopes.get(id),
            None => Arc::clone(self.scopes.global()),
        };
        let descriptor = scope.registry().resolve(ctx.platform, &ctx.namespace, &ctx.method)?;
        let lookup: Arc<dyn SchemaLookup> = Arc::clone(scope.cache()) as Arc<dyn SchemaLookup>;

        let view = adapter
            .prepare(params, Arc::clone(&descriptor.param_schema), Arc::clone(&lookup))
            .map_err(BridgeError::InvalidParams)?;
        tracing::debug!(method = %ctx.method, platform = %adapter.platform(), "invoking");

        let raw = descriptor.implementation.invoke(view, &ctx)?;
        let result = self.finish_result(raw, &descriptor, lookup.as_ref())?;
        Ok(adapter.encode(result).into())
    }

    fn finish_result(
        &self,
        raw: Map<String, Value>,
        descriptor: &MethodDescriptor<dyn BridgeMethod>,
        lookup: &dyn SchemaLookup,
    ) -> Result<Map<String, Value>> {
        let canonical = serialize(&raw, &descriptor.result_schema, lookup).map_err(BridgeError::InvalidResult)?;
        if self.config.validate_results {
            validate_deep(&canonical, &descriptor.result_schema, lookup).map_err(BridgeError::InvalidResult)?;
        }
        Ok(canonical)
    }

    /// Validate and default `params` for `name` without invoking it.
    ///
    /// Returns the canonical parameter tree the implementation would see.
    pub fn dry_run(&self, platform: Platform, namespace: Option<&str>, name: &str, params: &Value) -> Result<Map<String, Value>> {
        let ctx = self.context(platform, namespace, None, name);
        let descriptor = self.registry().resolve(ctx.platform, &ctx.namespace, &ctx.method)?;
        let lookup: Arc<dyn SchemaLookup> = Arc::clone(self.cache()) as Arc<dyn SchemaLookup>;
        let view = TypedView::from_value(params.clone(), Arc::clone(&descriptor.param_schema), Arc::clone(&lookup))
            .map_err(BridgeError::InvalidParams)?;
        validate_deep(view.raw(), view.schema(), lookup.as_ref()).map_err(BridgeError::InvalidParams)?;
        view.to_canonical_tree().map_err(BridgeError::InvalidParams)
    }
}

#[cfg(test)]
mod tests {
    use schema::{FieldSpec, MethodDecl};

    use super::*;
    use crate::method::MethodFailure;

    struct Echo;

    impl BridgeMethod for Echo {
        fn declaration(&self) -> MethodDecl {
            MethodDecl::new("echo", "EchoParams", "EchoResult")
                .model(ModelDecl::new("EchoParams").field(FieldSpec::string("text").required()))
                .model(ModelDecl::new("EchoResult").field(FieldSpec::string("text").required()))
        }

        fn invoke(&self, params: TypedView, _ctx: &CallContext) -> std::result::Result<Map<String, Value>, MethodFailure> {
            let mut out = Map::new();
            out.insert("text".into(), json!(params.string("text").unwrap_or_default()));
            Ok(out)
        }
    }

    #[test]
    fn envelope_shape() {
        let ok = BridgeResponse::success(json!({ "text": "hi" }));
        assert_eq!(ok.to_envelope(), json!({ "code": 1, "msg": "Success", "data": { "text": "hi" } }));

        let err = BridgeResponse::from_error(&BridgeError::from(MethodFailure::not_found("gone")));
        assert_eq!(err.to_envelope(), json!({ "code": -9, "msg": "gone", "data": {} }));

        assert_eq!(BridgeResponse::from_envelope(err.to_envelope()).expect("parse"), err);
        assert_eq!(BridgeResponse::from_envelope(ok.to_envelope()).expect("parse"), ok);
        assert!(BridgeResponse::from_envelope(json!({ "code": 77, "msg": "" })).is_err());
    }

    #[test]
    fn config_maps_from_file_sections() {
        let mut file = config::Config::default();
        file.registry.default_namespace = "host".into();
        file.validation.validate_results = false;
        let bridge = Bridge::from_config(&file);
        assert_eq!(bridge.config().default_namespace, "host");
        assert!(!bridge.config().validate_results);
    }

    #[test]
    fn default_namespace_is_applied() {
        let bridge = Bridge::default();
        bridge.register_method(Arc::new(Echo), Platform::All, None).expect("echo registers");
        assert_eq!(bridge.registry().list(Platform::Web, registry::DEFAULT_NAMESPACE), vec!["echo".to_string()]);

        let response = bridge.call(BridgeCall::new(Platform::Web, "echo", json!({ "text": "hi" })));
        assert!(response.is_success());
        assert_eq!(response.data, Some(json!({ "text": "hi" })));
    }

    #[test]
    fn dry_run_returns_canonical_params() {
        let bridge = Bridge::default();
        bridge.register_method(Arc::new(Echo), Platform::Web, None).expect("echo registers");
        let tree = bridge.dry_run(Platform::Web, None, "echo", &json!({ "text": "x", "extra": 1 })).expect("valid");
        assert_eq!(Value::Object(tree), json!({ "text": "x", "extra": 1 }));
        assert!(matches!(
            bridge.dry_run(Platform::Lynx, None, "echo", &json!({})),
            Err(BridgeError::Registry(_))
        ));
    }
}
