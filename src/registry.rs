//! Service registry
//!
//! Uses DashMap for sharded concurrent access. Registration, override and
//! removal may race with invocation: every map access takes the owning
//! shard's lock for the duration of the access only.

use crate::service::{ErasedService, ServiceEntry};
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Map from service name to type-erased entry.
pub(crate) struct Registry {
    services: DashMap<String, Arc<dyn ErasedService>, RandomState>,
}

impl Registry {
    /// Create new empty registry.
    ///
    /// Uses 8 shards; typical injectors hold a few dozen services.
    #[inline]
    pub fn new() -> Self {
        Self {
            services: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Check if a name is registered
    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Insert or replace an entry
    #[inline]
    pub fn set(&self, name: String, entry: Arc<dyn ErasedService>) {
        self.services.insert(name, entry);
    }

    /// Insert an entry unless the name is taken.
    ///
    /// The check and the insert happen under one shard lock.
    #[inline]
    pub fn insert_if_absent(&self, name: String, entry: Arc<dyn ErasedService>) -> bool {
        match self.services.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Look up an entry.
    ///
    /// The `Arc` is cloned out so no shard lock outlives the call; providers
    /// running on the returned entry are free to touch the map again.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ErasedService>> {
        self.services.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up an entry and downcast it to `T`'s entry type.
    ///
    /// A slot holding another type yields `None`, same as an absent slot.
    #[inline]
    pub fn get_typed<T: crate::Injectable>(&self, name: &str) -> Option<Arc<ServiceEntry<T>>> {
        self.get(name)?.into_any().downcast::<ServiceEntry<T>>().ok()
    }

    /// Remove an entry, returning whether one was present
    #[inline]
    pub fn remove(&self, name: &str) -> bool {
        self.services.remove(name).is_some()
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|r| r.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Snapshot of every entry, sorted by name
    pub fn entries(&self) -> Vec<Arc<dyn ErasedService>> {
        let mut entries: Vec<Arc<dyn ErasedService>> = self
            .services
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect();
        entries.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        entries
    }

    /// Get number of registered services
    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Capabilities;

    fn eager<T: crate::Injectable>(name: &str, value: T) -> Arc<dyn ErasedService> {
        Arc::new(ServiceEntry::eager(name.into(), value, Capabilities::none()))
    }

    #[test]
    fn test_registry_set_and_get() {
        let registry = Registry::new();
        registry.set("answer".into(), eager("answer", 42u32));

        let entry = registry.get_typed::<u32>("answer").unwrap();
        let injector = crate::Injector::new();
        assert_eq!(*entry.get_instance(&injector).unwrap(), 42);
    }

    #[test]
    fn test_registry_exists() {
        let registry = Registry::new();
        assert!(!registry.exists("answer"));

        registry.set("answer".into(), eager("answer", 0u32));

        assert!(registry.exists("answer"));
    }

    #[test]
    fn test_registry_wrong_type_is_absent() {
        let registry = Registry::new();
        registry.set("answer".into(), eager("answer", 42u32));

        assert!(registry.get("answer").is_some());
        assert!(registry.get_typed::<String>("answer").is_none());
    }

    #[test]
    fn test_registry_insert_if_absent() {
        let registry = Registry::new();
        assert!(registry.insert_if_absent("db".into(), eager("db", 1u8)));
        assert!(!registry.insert_if_absent("db".into(), eager("db", 2u8)));

        let entry = registry.get_typed::<u8>("db").unwrap();
        let injector = crate::Injector::new();
        assert_eq!(*entry.get_instance(&injector).unwrap(), 1);
    }

    #[test]
    fn test_registry_set_replaces() {
        let registry = Registry::new();
        registry.set("db".into(), eager("db", 1u8));
        registry.set("db".into(), eager("db", "two"));

        assert_eq!(registry.len(), 1);
        assert!(registry.get_typed::<u8>("db").is_none());
        assert!(registry.get_typed::<&'static str>("db").is_some());
    }

    #[test]
    fn test_registry_remove() {
        let registry = Registry::new();
        registry.set("db".into(), eager("db", 0u8));

        assert!(registry.remove("db"));
        assert!(!registry.exists("db"));
        assert!(!registry.remove("db"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = Registry::new();
        registry.set("wheel-2".into(), eager("wheel-2", 2u8));
        registry.set("engine".into(), eager("engine", 0u8));
        registry.set("wheel-1".into(), eager("wheel-1", 1u8));

        assert_eq!(registry.names(), vec!["engine", "wheel-1", "wheel-2"]);
        let names: Vec<String> = registry.entries().iter().map(|e| e.name().to_owned()).collect();
        assert_eq!(names, registry.names());
    }
}
