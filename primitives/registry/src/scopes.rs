//! Per-container scopes.
//!
//! Each UI container gets its own schema cache and a registry seeded from the
//! global one. Closing the container drops both.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::method_registry::MethodRegistry;
use crate::schema_cache::SchemaCache;

/// Cache and registry owned by one container, or the global pair.
pub struct Scope<M: ?Sized> {
    id: Option<String>,
    cache: Arc<SchemaCache>,
    registry: Arc<MethodRegistry<M>>,
}

impl<M: ?Sized> Scope<M> {
    /// Create a scope from an existing cache and registry.
    pub fn new(id: Option<String>, cache: Arc<SchemaCache>, registry: Arc<MethodRegistry<M>>) -> Self {
        Self { id, cache, registry }
    }

    /// Container id, or `None` for the global scope.
    pub fn id(&self) -> Option<&str> { self.id.as_deref() }

    /// Schema cache of this scope.
    pub fn cache(&self) -> &Arc<SchemaCache> { &self.cache }

    /// Method registry of this scope.
    pub fn registry(&self) -> &Arc<MethodRegistry<M>> { &self.registry }
}

impl<M: ?Sized> fmt::Debug for Scope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("id", &self.id).field("registry", &self.registry).finish()
    }
}

/// Tracks open container scopes.
pub struct ScopeManager<M: ?Sized> {
    global: Arc<Scope<M>>,
    scopes: DashMap<String, Arc<Scope<M>>>,
}

impl<M: ?Sized> ScopeManager<M> {
    /// Create a manager around the global scope.
    pub fn new(global: Arc<Scope<M>>) -> Self { Self { global, scopes: DashMap::new() } }

    /// The global scope.
    pub fn global(&self) -> &Arc<Scope<M>> { &self.global }

    /// Open (or return the already open) scope for `container_id`.
    ///
    /// The new scope starts with every method currently registered globally
    /// and an empty private cache that falls back to the global one for
    /// models it does not declare itself.
    pub fn open(&self, container_id: &str) -> Arc<Scope<M>> {
        let scope = self.scopes.entry(container_id.to_string()).or_insert_with(|| {
            tracing::debug!(container = container_id, "scope opened");
            Arc::new(Scope::new(
                Some(container_id.to_string()),
                Arc::new(SchemaCache::new().with_parent(Arc::clone(&self.global.cache))),
                Arc::new(self.global.registry.copy_with()),
            ))
        });
        scope.value().clone()
    }

    /// Scope for `container_id`, falling back to the global scope.
    pub fn get(&self, container_id: &str) -> Arc<Scope<M>> {
        self.scopes.get(container_id).map(|s| s.value().clone()).unwrap_or_else(|| Arc::clone(&self.global))
    }

    /// Whether a scope is open for `container_id`.
    pub fn is_open(&self, container_id: &str) -> bool { self.scopes.contains_key(container_id) }

    /// Tear down the scope for `container_id`. Returns `false` if none was open.
    pub fn close(&self, container_id: &str) -> bool {
        match self.scopes.remove(container_id) {
            Some((_, scope)) => {
                scope.cache.close();
                tracing::debug!(container = container_id, "scope closed");
                true
            }
            None => false,
        }
    }

    /// Number of open container scopes.
    pub fn open_count(&self) -> usize { self.scopes.len() }
}
