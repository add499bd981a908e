//! Memoized schema derivation.
//!
//! A [`SchemaCache`] turns registered [`ModelDecl`]s into immutable
//! [`Schema`]s on first use. Nested types are derived under their own keys.
//! Concurrent first resolutions may derive the same schema more than once,
//! but publication is an atomic insert-if-absent, so every caller ends up
//! holding the same `Arc<Schema>`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use schema::{MethodDecl, ModelDecl, Schema, SchemaError, SchemaLookup, TypeKey};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Parameter and result schemas of one method.
#[derive(Debug, Clone)]
pub struct MethodSchemas {
    /// Method name
    pub name: String,
    /// Schema of the parameter model
    pub param: Arc<Schema>,
    /// Schema of the result model
    pub result: Arc<Schema>,
}

/// Memo key of a method: its name with its parameter and result models.
type MethodKey = (String, TypeKey, TypeKey);

/// Per-scope store of declarations and derived schemas.
#[derive(Debug)]
pub struct SchemaCache {
    declarations: DashMap<TypeKey, ModelDecl>,
    schemas: DashMap<TypeKey, Arc<Schema>>,
    methods: DashMap<MethodKey, Arc<MethodSchemas>>,
    result_owners: DashMap<TypeKey, String>,
    parent: Option<Arc<SchemaCache>>,
    background: bool,
    closed: AtomicBool,
}

impl Default for SchemaCache {
    fn default() -> Self { Self::new() }
}

impl SchemaCache {
    /// Create an empty cache. Background derivation uses the ambient tokio
    /// runtime, if any, at the time [`SchemaCache::prefetch`] is called.
    pub fn new() -> Self {
        Self {
            declarations: DashMap::new(),
            schemas: DashMap::new(),
            methods: DashMap::new(),
            result_owners: DashMap::new(),
            parent: None,
            background: true,
            closed: AtomicBool::new(false),
        }
    }

    /// Resolve models this cache has no declaration for through `parent`.
    ///
    /// Schemas obtained from the parent are not copied into this cache.
    pub fn with_parent(mut self, parent: Arc<SchemaCache>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Enable or disable background derivation.
    pub fn with_background(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    /// Register a model declaration.
    ///
    /// Returns `false` if a declaration with the same name is already
    /// registered; the earlier one is kept.
    pub fn register_model(&self, decl: ModelDecl) -> bool {
        let key = decl.key();
        match self.declarations.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                if *existing.get() != decl {
                    tracing::warn!(model = %existing.key(), "conflicting declaration ignored");
                }
                false
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(decl);
                true
            }
        }
    }

    /// Whether a declaration is registered for `key`.
    pub fn is_declared(&self, key: &TypeKey) -> bool { self.declarations.contains_key(key) }

    /// Whether a schema for `key` has been published.
    pub fn is_cached(&self, key: &TypeKey) -> bool { self.schemas.contains_key(key) }

    /// Number of published schemas.
    pub fn len(&self) -> usize { self.schemas.len() }

    /// Whether no schema has been published yet.
    pub fn is_empty(&self) -> bool { self.schemas.is_empty() }

    /// Return the schema for `key`, deriving and publishing it on first use.
    pub fn resolve(&self, key: &TypeKey) -> Result<Arc<Schema>, SchemaError> {
        let mut resolving = HashSet::new();
        self.derive(key, &mut resolving)
    }

    fn derive(&self, key: &TypeKey, resolving: &mut HashSet<TypeKey>) -> Result<Arc<Schema>, SchemaError> {
        if let Some(schema) = self.schemas.get(key) {
            return Ok(schema.clone());
        }
        if resolving.contains(key) {
            // Cyclic reference: the outer derivation of `key` is still running.
            return Ok(Arc::new(Schema::placeholder(key.clone())));
        }

        let Some(decl) = self.declarations.get(key).map(|d| d.clone()) else {
            return match &self.parent {
                Some(parent) => parent.resolve(key),
                None => Err(SchemaError::UnknownModel(key.clone())),
            };
        };

        resolving.insert(key.clone());
        let derived = self.derive_decl(&decl, resolving);
        resolving.remove(key);

        let schema = match derived {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(model = %key, error = %e, "schema derivation failed");
                return Err(e);
            }
        };

        if self.closed.load(Ordering::Acquire) {
            return Ok(Arc::new(schema));
        }
        let published = self.schemas.entry(key.clone()).or_insert_with(|| Arc::new(schema)).clone();
        tracing::debug!(model = %key, fields = published.len(), "schema published");
        Ok(published)
    }

    fn derive_decl(&self, decl: &ModelDecl, resolving: &mut HashSet<TypeKey>) -> Result<Schema, SchemaError> {
        let schema = Schema::from_decl(decl)?;
        for nested in schema.nested_types() {
            self.derive(nested, resolving)?;
        }
        Ok(schema)
    }

    /// Start deriving `key` ahead of its first use.
    ///
    /// With a tokio runtime available the work runs on the blocking pool and
    /// the task handle is returned. Otherwise the schema is derived inline and
    /// `None` is returned. A synchronous [`SchemaCache::resolve`] racing the
    /// background task is safe: the first published schema wins.
    pub fn prefetch(self: &Arc<Self>, key: TypeKey) -> Option<JoinHandle<()>> {
        let handle = if self.background {
            Handle::try_current().ok()
        } else {
            None
        };

        match handle {
            Some(handle) => {
                let cache = Arc::clone(self);
                Some(handle.spawn_blocking(move || {
                    if let Err(e) = cache.resolve(&key) {
                        tracing::warn!(model = %key, error = %e, "background derivation failed");
                    }
                }))
            }
            None => {
                // Failure is already logged by resolve.
                let _ = self.resolve(&key);
                None
            }
        }
    }

    /// Register a method's models and derive its parameter and result schemas.
    ///
    /// Derivation happens once per `(name, params, result)`; later calls
    /// return the memoized pair. A model the method declares differently from
    /// an earlier declaration of the same name is a `ConflictingModel` error
    /// and nothing of the method is registered. The result type is recorded as
    /// owned by this method.
    pub fn resolve_method(&self, decl: &MethodDecl) -> Result<Arc<MethodSchemas>, SchemaError> {
        for model in &decl.models {
            self.check_conflict(model)?;
        }

        let key = (decl.name.clone(), decl.params.clone(), decl.result.clone());
        if let Some(existing) = self.methods.get(&key) {
            return Ok(existing.clone());
        }

        for model in &decl.models {
            // A racing registration may have declared it since the check.
            if !self.register_model(model.clone()) {
                self.check_conflict(model)?;
            }
        }
        let param = self.resolve(&decl.params)?;
        let result = self.resolve(&decl.result)?;

        let schemas = Arc::new(MethodSchemas { name: decl.name.clone(), param, result });
        let published = self.methods.entry(key).or_insert(schemas).clone();
        self.result_owners.entry(decl.result.clone()).or_insert_with(|| decl.name.clone());
        Ok(published)
    }

    fn check_conflict(&self, model: &ModelDecl) -> Result<(), SchemaError> {
        match self.declarations.get(&model.key()) {
            Some(existing) if *existing != *model => {
                tracing::warn!(model = %model.key(), "model already declared with different fields");
                Err(SchemaError::ConflictingModel(model.key()))
            }
            _ => Ok(()),
        }
    }

    /// Name of the method whose result model is `key`.
    pub fn owner_of_result(&self, key: &TypeKey) -> Option<String> {
        self.result_owners.get(key).map(|owner| owner.clone())
    }

    /// Drop every declaration and schema. Schemas already handed out stay
    /// valid; nothing is published after this call.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.methods.clear();
        self.result_owners.clear();
        self.schemas.clear();
        self.declarations.clear();
    }

    /// Whether [`SchemaCache::close`] has been called.
    pub fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}

impl SchemaLookup for SchemaCache {
    fn schema(&self, key: &TypeKey) -> Result<Arc<Schema>, SchemaError> { self.resolve(key) }
}
