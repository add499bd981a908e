//! Registry of bridge methods keyed by (platform, namespace, name).

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use schema::Schema;
use types::Platform;

use crate::error::{RegistryError, Result};

/// Namespace used when a call does not name one.
pub const DEFAULT_NAMESPACE: &str = "DEFAULT";

/// A registered method together with its derived schemas.
pub struct MethodDescriptor<M: ?Sized> {
    /// Method name
    pub name: String,
    /// Platform buckets the method was registered into
    pub platforms: Vec<Platform>,
    /// Schema of the call parameters
    pub param_schema: Arc<Schema>,
    /// Schema of the result
    pub result_schema: Arc<Schema>,
    /// Method implementation
    pub implementation: Arc<M>,
}

impl<M: ?Sized> MethodDescriptor<M> {
    /// Create a descriptor; `platforms` is filled in on registration.
    pub fn new(
        name: impl Into<String>,
        param_schema: Arc<Schema>,
        result_schema: Arc<Schema>,
        implementation: Arc<M>,
    ) -> Self {
        Self { name: name.into(), platforms: Vec::new(), param_schema, result_schema, implementation }
    }
}

impl<M: ?Sized> Clone for MethodDescriptor<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            platforms: self.platforms.clone(),
            param_schema: Arc::clone(&self.param_schema),
            result_schema: Arc::clone(&self.result_schema),
            implementation: Arc::clone(&self.implementation),
        }
    }
}

impl<M: ?Sized> fmt::Debug for MethodDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("platforms", &self.platforms)
            .field("params", self.param_schema.key())
            .field("result", self.result_schema.key())
            .finish_non_exhaustive()
    }
}

type Bucket<M> = DashMap<(Platform, String), Arc<MethodDescriptor<M>>>;

/// Concurrent method table.
///
/// Registering under [`Platform::All`] writes the same descriptor into the
/// `All` bucket and every concrete platform bucket.
pub struct MethodRegistry<M: ?Sized> {
    namespaces: DashMap<String, Bucket<M>>,
}

impl<M: ?Sized> Default for MethodRegistry<M> {
    fn default() -> Self { Self::new() }
}

impl<M: ?Sized> fmt::Debug for MethodRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry").field("namespaces", &self.namespaces()).finish()
    }
}

impl<M: ?Sized> MethodRegistry<M> {
    /// Create an empty registry.
    pub fn new() -> Self { Self { namespaces: DashMap::new() } }

    /// Register `descriptor` under `platform` in `namespace`.
    ///
    /// A later registration with the same name replaces the earlier one.
    /// Registering under [`Platform::None`] is ignored.
    pub fn register(&self, mut descriptor: MethodDescriptor<M>, platform: Platform, namespace: &str) {
        let buckets = platform.fan_out();
        if buckets.is_empty() {
            tracing::warn!(method = %descriptor.name, "registration under platform none ignored");
            return;
        }
        descriptor.platforms = buckets.clone();
        let descriptor = Arc::new(descriptor);

        let table = self.namespaces.entry(namespace.to_string()).or_default();
        for bucket in buckets {
            if table.insert((bucket, descriptor.name.clone()), Arc::clone(&descriptor)).is_some() {
                tracing::debug!(method = %descriptor.name, platform = %bucket, namespace, "registration replaced");
            }
        }
    }

    /// Find a method. `Platform::None` never resolves.
    pub fn lookup(&self, platform: Platform, namespace: &str, name: &str) -> Option<Arc<MethodDescriptor<M>>> {
        if platform == Platform::None {
            return None;
        }
        let table = self.namespaces.get(namespace)?;
        let found = table.get(&(platform, name.to_string())).map(|d| d.value().clone());
        found
    }

    /// Find a method, reporting whether the namespace or the method is missing.
    pub fn resolve(&self, platform: Platform, namespace: &str, name: &str) -> Result<Arc<MethodDescriptor<M>>> {
        if !self.namespaces.contains_key(namespace) {
            return Err(RegistryError::NamespaceNotFound(namespace.to_string()));
        }
        self.lookup(platform, namespace, name).ok_or_else(|| RegistryError::MethodNotRegistered {
            platform,
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Sorted names of the methods callable from `platform` in `namespace`.
    pub fn list(&self, platform: Platform, namespace: &str) -> Vec<String> {
        let Some(table) = self.namespaces.get(namespace) else {
            return Vec::new();
        };
        let mut names: Vec<String> =
            table.iter().filter(|e| e.key().0 == platform).map(|e| e.key().1.clone()).collect();
        names.sort();
        names
    }

    /// Remove a method from every bucket `platform` fans out to.
    ///
    /// Returns `true` if anything was removed.
    pub fn unregister(&self, platform: Platform, namespace: &str, name: &str) -> bool {
        let Some(table) = self.namespaces.get(namespace) else {
            return false;
        };
        let mut removed = false;
        for bucket in platform.fan_out() {
            removed |= table.remove(&(bucket, name.to_string())).is_some();
        }
        removed
    }

    /// Sorted names of every namespace with at least one registration.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Total number of (platform, name) entries across namespaces.
    pub fn entry_count(&self) -> usize { self.namespaces.iter().map(|e| e.value().len()).sum() }

    /// New registry sharing every current descriptor by reference.
    pub fn copy_with(&self) -> Self {
        let copy = Self::new();
        for namespace in self.namespaces.iter() {
            let table: Bucket<M> = DashMap::new();
            for entry in namespace.value().iter() {
                table.insert(entry.key().clone(), Arc::clone(entry.value()));
            }
            copy.namespaces.insert(namespace.key().clone(), table);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use schema::TypeKey;

    use super::*;

    fn descriptor(name: &str, body: &'static str) -> MethodDescriptor<str> {
        let empty = Arc::new(Schema::placeholder(TypeKey::new("Empty")));
        MethodDescriptor::new(name, empty.clone(), empty, Arc::from(body))
    }

    #[test]
    fn all_platforms_fan_out() {
        let registry = MethodRegistry::new();
        registry.register(descriptor("router.open", "open"), Platform::All, DEFAULT_NAMESPACE);

        for platform in [Platform::All, Platform::Web, Platform::Lynx] {
            let found = registry.lookup(platform, DEFAULT_NAMESPACE, "router.open").expect("fanned out");
            assert_eq!(&*found.implementation, "open");
            assert_eq!(found.platforms, vec![Platform::All, Platform::Web, Platform::Lynx]);
        }
        assert!(registry.lookup(Platform::None, DEFAULT_NAMESPACE, "router.open").is_none());
        assert_eq!(registry.entry_count(), 3);
    }

    #[test]
    fn single_platform_stays_in_its_bucket() {
        let registry = MethodRegistry::new();
        registry.register(descriptor("storage.setItem", "web"), Platform::Web, DEFAULT_NAMESPACE);
        assert!(registry.lookup(Platform::Web, DEFAULT_NAMESPACE, "storage.setItem").is_some());
        assert!(registry.lookup(Platform::Lynx, DEFAULT_NAMESPACE, "storage.setItem").is_none());
    }

    #[test]
    fn resolve_distinguishes_missing_namespace() {
        let registry = MethodRegistry::new();
        registry.register(descriptor("a", "a"), Platform::Web, "host");

        assert!(matches!(
            registry.resolve(Platform::Web, "other", "a"),
            Err(RegistryError::NamespaceNotFound(ns)) if ns == "other"
        ));
        assert!(matches!(
            registry.resolve(Platform::Lynx, "host", "a"),
            Err(RegistryError::MethodNotRegistered { .. })
        ));
        assert!(registry.resolve(Platform::Web, "host", "a").is_ok());
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = MethodRegistry::new();
        registry.register(descriptor("a", "first"), Platform::Web, DEFAULT_NAMESPACE);
        registry.register(descriptor("a", "second"), Platform::Web, DEFAULT_NAMESPACE);
        let found = registry.lookup(Platform::Web, DEFAULT_NAMESPACE, "a").expect("a");
        assert_eq!(&*found.implementation, "second");
    }

    #[test]
    fn none_registration_is_ignored() {
        let registry = MethodRegistry::new();
        registry.register(descriptor("a", "a"), Platform::None, DEFAULT_NAMESPACE);
        assert!(registry.namespaces().is_empty());
    }
}
