//! Tests for method registration and lookup

use std::sync::Arc;

use registry::{MethodDescriptor, MethodRegistry, RegistryError, SchemaCache, DEFAULT_NAMESPACE};
use schema::{FieldSpec, MethodDecl, ModelDecl};
use types::Platform;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct Fixed(&'static str);

impl Greeter for Fixed {
    fn greet(&self) -> String { self.0.to_string() }
}

fn descriptor(cache: &SchemaCache, name: &str, greeting: &'static str) -> MethodDescriptor<dyn Greeter> {
    let decl = MethodDecl::new(name, "GreetParams", "GreetResult")
        .model(ModelDecl::new("GreetParams").field(FieldSpec::string("who")))
        .model(ModelDecl::new("GreetResult").field(FieldSpec::string("text").required()));
    let schemas = cache.resolve_method(&decl).expect("schemas should derive");
    MethodDescriptor::new(
        name,
        Arc::clone(&schemas.param),
        Arc::clone(&schemas.result),
        Arc::new(Fixed(greeting)) as Arc<dyn Greeter>,
    )
}

#[test]
fn test_trait_object_registry() {
    let cache = SchemaCache::new();
    let registry: MethodRegistry<dyn Greeter> = MethodRegistry::new();
    registry.register(descriptor(&cache, "hello", "hi"), Platform::All, DEFAULT_NAMESPACE);
    registry.register(descriptor(&cache, "web.only", "web"), Platform::Web, DEFAULT_NAMESPACE);

    let hello = registry.resolve(Platform::Lynx, DEFAULT_NAMESPACE, "hello").expect("hello on lynx");
    assert_eq!(hello.implementation.greet(), "hi");
    assert_eq!(hello.param_schema.key().as_str(), "GreetParams");

    assert_eq!(registry.list(Platform::Web, DEFAULT_NAMESPACE), vec!["hello", "web.only"]);
    assert_eq!(registry.list(Platform::Lynx, DEFAULT_NAMESPACE), vec!["hello"]);
    assert!(registry.list(Platform::Web, "nowhere").is_empty());
}

#[test]
fn test_unregister_removes_fanned_out_entries() {
    let cache = SchemaCache::new();
    let registry: MethodRegistry<dyn Greeter> = MethodRegistry::new();
    registry.register(descriptor(&cache, "hello", "hi"), Platform::All, DEFAULT_NAMESPACE);

    assert!(registry.unregister(Platform::All, DEFAULT_NAMESPACE, "hello"));
    for platform in [Platform::All, Platform::Web, Platform::Lynx] {
        assert!(registry.lookup(platform, DEFAULT_NAMESPACE, "hello").is_none());
    }
    assert!(!registry.unregister(Platform::All, DEFAULT_NAMESPACE, "hello"));

    // The namespace itself stays known.
    assert!(matches!(
        registry.resolve(Platform::Web, DEFAULT_NAMESPACE, "hello"),
        Err(RegistryError::MethodNotRegistered { .. })
    ));
}

#[test]
fn test_copy_with_shares_descriptors() {
    let cache = SchemaCache::new();
    let registry: MethodRegistry<dyn Greeter> = MethodRegistry::new();
    registry.register(descriptor(&cache, "hello", "hi"), Platform::Web, "host");

    let copy = registry.copy_with();
    let original = registry.lookup(Platform::Web, "host", "hello").expect("original");
    let copied = copy.lookup(Platform::Web, "host", "hello").expect("copied");
    assert!(Arc::ptr_eq(&original, &copied));

    copy.unregister(Platform::Web, "host", "hello");
    assert!(registry.lookup(Platform::Web, "host", "hello").is_some());
    assert_eq!(copy.namespaces(), vec!["host"]);
}
