//! Name → cache lookup shared by every call site that wants the same data.
//!
//! Modeled on a service status registry: a cheap-to-clone handle over a
//! `DashMap`. Caches are created lazily on first lookup and live as long as
//! the registry. The first registration of a name fixes its options.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{CacheError, CacheManager, CacheOptions, CacheStatus};

/// Type-erased view of a `CacheManager<T>`, so caches holding different
/// value types can share one registry.
pub trait ManagedCache: Send + Sync {
    fn name(&self) -> &str;
    fn options(&self) -> CacheOptions;
    fn invalidate(&self);
    fn status(&self) -> CacheStatus;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Send + Sync + 'static> ManagedCache for CacheManager<T> {
    fn name(&self) -> &str {
        CacheManager::name(self)
    }

    fn options(&self) -> CacheOptions {
        CacheManager::options(self)
    }

    fn invalidate(&self) {
        CacheManager::invalidate(self)
    }

    fn status(&self) -> CacheStatus {
        CacheManager::status(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<DashMap<String, Arc<dyn ManagedCache>>>,
}

impl CacheRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cache registered under `name`, creating it from `options` if absent.
    ///
    /// `options` are ignored when the cache already exists. Asking for a
    /// different value type than the one registered is an error.
    pub fn get_instance<T: Send + Sync + 'static>(
        &self,
        name: &str,
        options: CacheOptions,
    ) -> Result<Arc<CacheManager<T>>, CacheError> {
        let cache = match self.caches.entry(name.to_owned()) {
            Entry::Occupied(occupied) => {
                let existing = Arc::clone(occupied.get());
                if existing.options() != options {
                    debug!(
                        cache = name,
                        registered = ?existing.options(),
                        requested = ?options,
                        "cache already registered, keeping original options"
                    );
                }
                existing
            }
            Entry::Vacant(vacant) => {
                let manager = Arc::new(CacheManager::<T>::new(name, options)?);
                vacant.insert(manager.clone());
                info!(cache = name, ttl = ?options.ttl, "cache registered");
                return Ok(manager);
            }
        };

        cache
            .into_any()
            .downcast::<CacheManager<T>>()
            .map_err(|_| CacheError::TypeMismatch {
                name: name.to_owned(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Invalidate the named cache. Returns `false` if no such cache exists.
    pub fn invalidate(&self, name: &str) -> bool {
        // Clone out of the map so the shard lock is not held while invalidating.
        let Some(cache) = self.caches.get(name).map(|c| Arc::clone(c.value())) else {
            return false;
        };
        cache.invalidate();
        true
    }

    pub fn invalidate_all(&self) {
        let caches: Vec<Arc<dyn ManagedCache>> =
            self.caches.iter().map(|c| Arc::clone(c.value())).collect();
        for cache in &caches {
            cache.invalidate();
        }
        info!(count = caches.len(), "all caches invalidated");
    }

    /// Status of every registered cache, ordered by name.
    pub fn all_status(&self) -> BTreeMap<String, CacheStatus> {
        self.caches
            .iter()
            .map(|c| (c.key().clone(), c.value().status()))
            .collect()
    }
}
