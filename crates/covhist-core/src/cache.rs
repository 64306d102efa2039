//! Shared query cache using moka
//!
//! An injectable, keyed store shared between the selection engine (writer)
//! and whatever recomputes coverage totals (reader). Entries are typed through
//! [`CacheKey`], so a reader cannot pull a value out under the wrong type.

use covhist_model::UploadId;
use moka::sync::Cache;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed cache key
pub struct CacheKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CacheKey<T> {
    /// Create key with a fixed name
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Key name
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for CacheKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CacheKey<T> {}

impl<T> fmt::Debug for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.name).finish()
    }
}

/// Upload ids currently excluded from coverage computation
pub const IGNORED_UPLOAD_IDS: CacheKey<Vec<UploadId>> = CacheKey::new("IgnoredUploadIds");

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Keyed store shared across components
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Cache<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl SharedCache {
    /// Create an unbounded cache
    ///
    /// Entries are never evicted; they leave only through
    /// [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// Get value stored under key
    #[must_use]
    pub fn get<T>(&self, key: &CacheKey<T>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner
            .get(&key.name())
            .and_then(|arc| arc.downcast_ref::<T>().cloned())
    }

    /// Replace value stored under key
    #[inline]
    pub fn set<T>(&self, key: &CacheKey<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.inner.insert(key.name(), Arc::new(value));
    }

    /// Read current value (or default), compute next, replace
    ///
    /// Returns the value written.
    pub fn update<T, F>(&self, key: &CacheKey<T>, f: F) -> T
    where
        T: Clone + Default + Send + Sync + 'static,
        F: FnOnce(T) -> T,
    {
        let next = f(self.get(key).unwrap_or_default());
        self.set(key, next.clone());
        next
    }

    /// Check if key has a value
    #[inline]
    #[must_use]
    pub fn contains<T>(&self, key: &CacheKey<T>) -> bool {
        self.inner.contains_key(&key.name())
    }

    /// Remove value stored under key
    #[inline]
    pub fn invalidate<T>(&self, key: &CacheKey<T>) {
        self.inner.invalidate(&key.name());
    }

    /// Drop every entry (session teardown)
    #[inline]
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Current ignored upload ids, empty if never written
    #[must_use]
    pub fn ignored_upload_ids(&self) -> Vec<UploadId> {
        self.get(&IGNORED_UPLOAD_IDS).unwrap_or_default()
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::new()
    }
}
