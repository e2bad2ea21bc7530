//! Service container for dependency injection
//!
//! The container is an ordinary value owned by whoever bootstraps the
//! application; there is no process-wide instance. Modules receive it
//! explicitly, resolve what they depend on and register what they provide.
//!
//! # Example
//!
//! ```rust
//! use datasource::config::{ConfigService, EnvSnapshot};
//! use datasource::Container;
//!
//! let mut container = Container::new();
//! container.singleton(ConfigService::new(EnvSnapshot::new()));
//!
//! let config: ConfigService = container.resolve().unwrap();
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FrameworkError;

/// Stores shared singleton instances keyed by type
#[derive(Default)]
pub struct Container {
    singletons: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Container {
    /// Create a new empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton instance, replacing any previous one of the same type
    pub fn singleton<T: Any + Send + Sync + 'static>(&mut self, instance: T) {
        self.singletons.insert(TypeId::of::<T>(), Arc::new(instance));
    }

    /// Resolve a concrete type (requires Clone)
    pub fn get<T: Any + Send + Sync + Clone + 'static>(&self) -> Option<T> {
        self.singletons
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<T>())
            .cloned()
    }

    /// Resolve a concrete type or fail with [`FrameworkError::ServiceNotFound`]
    pub fn resolve<T: Any + Send + Sync + Clone + 'static>(&self) -> Result<T, FrameworkError> {
        self.get::<T>()
            .ok_or_else(FrameworkError::service_not_found::<T>)
    }

    /// Check if a concrete type is registered
    pub fn has<T: Any + 'static>(&self) -> bool {
        self.singletons.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.singletons.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.singletons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_singleton_roundtrip() {
        let mut container = Container::new();
        container.singleton(Counter(7));

        assert!(container.has::<Counter>());
        assert_eq!(container.get::<Counter>(), Some(Counter(7)));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_singleton_replaces_previous() {
        let mut container = Container::new();
        container.singleton(Counter(1));
        container.singleton(Counter(2));

        assert_eq!(container.resolve::<Counter>().unwrap(), Counter(2));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_resolve_missing_service() {
        let container = Container::new();

        let err = container.resolve::<Counter>().unwrap_err();

        assert!(matches!(err, FrameworkError::ServiceNotFound { type_name } if type_name.ends_with("Counter")));
        assert!(container.is_empty());
    }
}
