// Name-based registration of shared services. A `Container` is an ordinary
// value created at startup and handed to whatever needs it.

use crate::graphql::GraphQLServer;
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

// Namespaced binding of the GraphQL server.
pub const SERVER_BINDING: &str = "Addons/GraphQLServer";
// Short alias of `SERVER_BINDING`.
pub const SERVER_ALIAS: &str = "GraphQLServer";

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn() -> Instance + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("no binding registered for `{0}`")]
    Unbound(String),
    #[error("binding `{0}` holds a different type")]
    TypeMismatch(String),
}

// Lazily constructed singletons, looked up by name or alias.
#[derive(Default)]
pub struct Container {
    factories: DashMap<String, Factory>,
    instances: DashMap<String, Instance>,
    aliases: DashMap<String, String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    // Binds `factory` under `name`. It runs once, on first resolution.
    pub fn singleton<T, F>(&self, name: &str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Arc::new(factory()) as Instance);
        self.factories.insert(name.to_string(), factory);
        self.instances.remove(name);
    }

    // Makes `alias` resolve to the binding registered as `name`.
    pub fn alias(&self, name: &str, alias: &str) {
        self.aliases.insert(alias.to_string(), name.to_string());
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.factories.contains_key(&self.canonical(name))
    }

    // Returns the shared instance bound under `name` (or an alias of it).
    //
    // Construction holds a lock on the binding's shard, so a factory must
    // not resolve other bindings.
    pub fn resolve<T>(&self, name: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let name = self.canonical(name);
        let factory = self
            .factories
            .get(&name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ContainerError::Unbound(name.clone()))?;

        let instance = self
            .instances
            .entry(name.clone())
            .or_insert_with(|| factory())
            .value()
            .clone();

        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch(name))
    }

    fn canonical(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .map(|target| target.value().clone())
            .unwrap_or_else(|| name.to_string())
    }
}

// Registers services in a `Container` at startup.
pub trait ServiceProvider {
    fn register(&self, container: &Container);
}

// Binds the shared `GraphQLServer`.
pub struct GraphQLServerProvider;

impl ServiceProvider for GraphQLServerProvider {
    fn register(&self, container: &Container) {
        container.singleton(SERVER_BINDING, GraphQLServer::new);
        container.alias(SERVER_BINDING, SERVER_ALIAS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn name_and_alias_share_one_instance() {
        let container = Container::new();
        GraphQLServerProvider.register(&container);

        let by_name = container.resolve::<GraphQLServer>(SERVER_BINDING).unwrap();
        let by_alias = container.resolve::<GraphQLServer>(SERVER_ALIAS).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_alias));
    }

    #[test]
    fn factory_runs_lazily_and_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        let counter = Arc::clone(&built);
        container.singleton("counter", move || counter.fetch_add(1, Ordering::SeqCst));

        assert_eq!(built.load(Ordering::SeqCst), 0);
        container.resolve::<usize>("counter").unwrap();
        container.resolve::<usize>("counter").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lookup_failures_are_reported() {
        let container = Container::new();
        GraphQLServerProvider.register(&container);

        assert_eq!(
            container.resolve::<GraphQLServer>("missing").unwrap_err(),
            ContainerError::Unbound("missing".to_string())
        );
        assert_eq!(
            container.resolve::<String>(SERVER_ALIAS).unwrap_err(),
            ContainerError::TypeMismatch(SERVER_BINDING.to_string())
        );
        assert!(container.is_bound(SERVER_ALIAS));
    }
}
