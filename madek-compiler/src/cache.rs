//! Reference cache
//!
//! Memoizes resolved entity references (authors, groups, keyword terms,
//! license labels) for the lifetime of a [`Client`](crate::Client).
//!
//! Lookups are single-flight per key: the first caller for `(kind, id)`
//! installs a shared in-flight future, and every concurrent caller for the
//! same key awaits that same future and observes the same value or the same
//! error. Different keys resolve in parallel. A failed lookup is evicted so
//! the next call retries it.

use crate::error::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use madek_common::models::{Author, Group};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

/// Kind of entity reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Author,
    Group,
    Keyword,
    License,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Group => "group",
            Self::Keyword => "keyword",
            Self::License => "license",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved entity reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Author(Author),
    Group(Group),
    /// Keyword term
    Keyword(String),
    /// License label
    License(String),
}

impl Reference {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Author(_) => ReferenceKind::Author,
            Self::Group(_) => ReferenceKind::Group,
            Self::Keyword(_) => ReferenceKind::Keyword,
            Self::License(_) => ReferenceKind::License,
        }
    }
}

type Key = (ReferenceKind, String);
type SharedLookup = Shared<BoxFuture<'static, Result<Reference>>>;

/// Session-scoped cache of entity references
#[derive(Default)]
pub struct ReferenceCache {
    entries: Mutex<HashMap<Key, SharedLookup>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached reference for `(kind, id)`, running `load` at most
    /// once across concurrent callers
    ///
    /// `load` is only invoked when no lookup for the key is cached or in
    /// flight. The map lock is never held across an await.
    pub async fn get_or_load<F, Fut>(
        &self,
        kind: ReferenceKind,
        id: &str,
        load: F,
    ) -> Result<Reference>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Reference>> + Send + 'static,
    {
        let key = (kind, id.to_string());
        let lookup = {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(lookup) => lookup.clone(),
                None => {
                    let lookup = load().boxed().shared();
                    entries.insert(key.clone(), lookup.clone());
                    lookup
                }
            }
        };

        let result = lookup.clone().await;

        if result.is_err() {
            let mut entries = self.lock();
            // A retry may already have installed a fresh lookup
            if entries.get(&key).is_some_and(|current| current.ptr_eq(&lookup)) {
                entries.remove(&key);
            }
        }

        result
    }

    /// Number of successfully resolved entries
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|lookup| matches!(lookup.peek(), Some(Ok(_))))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved value for `(kind, id)`, if any, without fetching
    pub fn get(&self, kind: ReferenceKind, id: &str) -> Option<Reference> {
        let entries = self.lock();
        match entries.get(&(kind, id.to_string()))?.peek() {
            Some(Ok(reference)) => Some(reference.clone()),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, SharedLookup>> {
        // Entries are only ever inserted or removed whole, so a poisoned map
        // is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_load(
        calls: &Arc<AtomicUsize>,
        term: &'static str,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Reference>> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Reference::Keyword(term.to_string()))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let cache = ReferenceCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_load(ReferenceKind::Keyword, "k1", counting_load(&calls, "Design"))
            .await
            .unwrap();
        let second = cache
            .get_or_load(ReferenceKind::Keyword, "k1", counting_load(&calls, "Other"))
            .await
            .unwrap();

        assert_eq!(first, Reference::Keyword("Design".to_string()));
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let cache = Arc::new(ReferenceCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let a = {
            let cache = Arc::clone(&cache);
            let load = counting_load(&calls, "Design");
            tokio::spawn(async move { cache.get_or_load(ReferenceKind::Keyword, "k1", load).await })
        };
        let b = {
            let cache = Arc::clone(&cache);
            let load = counting_load(&calls, "Design");
            tokio::spawn(async move { cache.get_or_load(ReferenceKind::Keyword, "k1", load).await })
        };

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_kinds_are_separate_keys() {
        let cache = ReferenceCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_load(ReferenceKind::Keyword, "x", counting_load(&calls, "Design"))
            .await
            .unwrap();
        cache
            .get_or_load(ReferenceKind::License, "x", counting_load(&calls, "CC"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.get(ReferenceKind::Author, "x").is_none());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = ReferenceCache::new();
        let url = "https://madek.test/api/keywords/k1".to_string();

        let failing = {
            let url = url.clone();
            move || async move { Err(Error::NotFound { url }) }
        };
        let err = cache.get_or_load(ReferenceKind::Keyword, "k1", failing).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(cache.is_empty());

        let calls = Arc::new(AtomicUsize::new(0));
        let value = cache
            .get_or_load(ReferenceKind::Keyword, "k1", counting_load(&calls, "Design"))
            .await
            .unwrap();
        assert_eq!(value, Reference::Keyword("Design".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1, "Retry should load again");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_the_error() {
        let cache = Arc::new(ReferenceCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let spawn_failing = |cache: Arc<ReferenceCache>, calls: Arc<AtomicUsize>| {
            tokio::spawn(async move {
                cache
                    .get_or_load(ReferenceKind::Author, "p1", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err(Error::AccessForbidden {
                            url: "https://madek.test/api/people/p1".to_string(),
                        })
                    })
                    .await
            })
        };

        let a = spawn_failing(Arc::clone(&cache), Arc::clone(&calls));
        let b = spawn_failing(Arc::clone(&cache), Arc::clone(&calls));

        let a = a.await.unwrap().unwrap_err();
        let b = b.await.unwrap().unwrap_err();
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }
}
