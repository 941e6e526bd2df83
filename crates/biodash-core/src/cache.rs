// ── Lazy per-row resource caches ──
//
// Key-addressed asynchronous caches for row detail data (business
// cards, link lists, analytics snapshots). Presence, not truthiness,
// governs re-fetch suppression: a key that resolved to "no data" stays
// resolved. The entry state is a tagged variant, so "absent" and
// "resolved-empty" can never be conflated.

use std::future::Future;
use std::hash::Hash;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::model::{AnalyticsSnapshot, BiositeId, BusinessCard, Link, OwnerId, TimeRange};

// ── Entry state ──────────────────────────────────────────────────────

/// State of one cache key. Absence from the map is the third state
/// ("never fetched").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry<V> {
    /// A loader is in flight; concurrent callers must not re-issue.
    Loading,
    /// The loader finished. `None` is the explicit "no data" sentinel —
    /// distinct from absent, and it suppresses re-fetch like any value.
    Resolved(Option<V>),
}

impl<V> CacheEntry<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Loading => None,
            Self::Resolved(v) => v.as_ref(),
        }
    }
}

// ── Generic lazy cache ───────────────────────────────────────────────

/// One key-addressed cache with in-flight de-duplication.
///
/// Entries transition `absent → Loading → Resolved` and never revert to
/// absent on their own; only deliberate eviction (admin mutations, or a
/// cancelled fetch) removes a key.
#[derive(Debug)]
pub struct LazyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for LazyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> LazyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Run `loader` for `key` unless the key is already present.
    ///
    /// The `Loading` marker is inserted atomically before the loader is
    /// awaited, so a second caller arriving mid-flight observes "in
    /// flight" and returns without re-issuing. Loader failure resolves
    /// the key to the empty sentinel — no automatic retry. If `cancel`
    /// fires first (row collapsed, session shut down), the result is
    /// discarded and the key returns to absent.
    pub async fn fetch_if_absent<F, Fut, E>(&self, key: K, cancel: &CancellationToken, loader: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        match self.entries.entry(key.clone()) {
            // Present — loading or resolved (even resolved-empty).
            Entry::Occupied(_) => return,
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry::Loading);
            }
        }

        let outcome = tokio::select! {
            () = cancel.cancelled() => None,
            result = loader() => Some(result),
        };

        match outcome {
            None => {
                // Nobody is observing this key anymore; drop the marker
                // instead of writing a value into a dead slot.
                self.entries.remove(&key);
            }
            Some(Ok(value)) => {
                self.entries.insert(key, CacheEntry::Resolved(Some(value)));
            }
            Some(Err(err)) => {
                warn!(error = %err, "row resource fetch failed; caching empty result");
                self.entries.insert(key, CacheEntry::Resolved(None));
            }
        }
    }

    /// Current state of a key (cloned out), or `None` when never fetched.
    pub fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.get(key).map(|e| e.clone())
    }

    pub fn is_loading(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|e| e.is_loading())
    }

    /// Remove one key so the next fetch re-issues.
    pub fn evict(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Remove every key matching the predicate.
    pub fn evict_where(&self, mut pred: impl FnMut(&K) -> bool) {
        self.entries.retain(|k, _| !pred(k));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Orchestrator ─────────────────────────────────────────────────────

/// The three independent row-resource caches.
///
/// Analytics entries are keyed by `(biosite, range)` so switching the
/// time range never invalidates snapshots cached under other ranges.
#[derive(Debug, Default)]
pub struct ResourceCaches {
    pub cards: LazyCache<OwnerId, BusinessCard>,
    pub links: LazyCache<BiositeId, Vec<Link>>,
    pub analytics: LazyCache<(BiositeId, TimeRange), AnalyticsSnapshot>,
}

impl ResourceCaches {
    /// Drop every cache entry tied to one row. Used after admin
    /// mutations (delete / set-active) so the next expansion re-fetches.
    pub fn evict_row(&self, biosite: BiositeId, owner: OwnerId) {
        self.cards.evict(&owner);
        self.links.evict(&biosite);
        self.analytics.evict_where(|(id, _)| *id == biosite);
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    type TestCache = LazyCache<u32, String>;

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetches_for_same_key_load_once() {
        let cache = Arc::new(TestCache::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let loader = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, String>("value".to_owned())
            }
        };

        // Second fetch starts while the first is still sleeping.
        tokio::join!(
            cache.fetch_if_absent(7, &cancel, loader.clone()),
            cache.fetch_if_absent(7, &cancel, loader),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let entry = cache.get(&7).unwrap();
        assert_eq!(entry.value().map(String::as_str), Some("value"));
    }

    #[tokio::test]
    async fn resolved_empty_suppresses_refetch() {
        let cache = TestCache::default();
        let cancel = CancellationToken::new();

        cache
            .fetch_if_absent(1, &cancel, || async { Err::<String, _>("boom".to_owned()) })
            .await;

        // Failure is stored as the explicit empty sentinel, not absence.
        assert_eq!(cache.get(&1), Some(CacheEntry::Resolved(None)));

        // Presence governs: the second loader must never run.
        let reissued = AtomicUsize::new(0);
        cache
            .fetch_if_absent(1, &cancel, || async {
                reissued.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("must not resolve".to_owned())
            })
            .await;
        assert_eq!(
            reissued.load(Ordering::SeqCst),
            0,
            "loader re-issued for a resolved key"
        );
        assert_eq!(cache.get(&1), Some(CacheEntry::Resolved(None)));
    }

    #[tokio::test]
    async fn eviction_allows_retry() {
        let cache = TestCache::default();
        let cancel = CancellationToken::new();

        cache
            .fetch_if_absent(1, &cancel, || async { Err::<String, _>("boom".to_owned()) })
            .await;
        cache.evict(&1);
        assert!(cache.get(&1).is_none());

        cache
            .fetch_if_absent(1, &cancel, || async { Ok::<_, String>("ok".to_owned()) })
            .await;
        assert_eq!(
            cache.get(&1).unwrap().value().map(String::as_str),
            Some("ok")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_fetch_discards_result_and_key() {
        let cache = TestCache::default();
        let cancel = CancellationToken::new();

        let fetch = cache.fetch_if_absent(3, &cancel, || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>("late".to_owned())
        });

        cancel.cancel();
        fetch.await;

        // The key is absent again: a later expansion re-fetches.
        assert!(cache.get(&3).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_load_concurrently() {
        let cache = Arc::new(TestCache::default());
        let cancel = CancellationToken::new();

        tokio::join!(
            cache.fetch_if_absent(1, &cancel, || async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, String>("one".to_owned())
            }),
            cache.fetch_if_absent(2, &cancel, || async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, String>("two".to_owned())
            }),
        );

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get(&1).unwrap().value().map(String::as_str),
            Some("one")
        );
        assert_eq!(
            cache.get(&2).unwrap().value().map(String::as_str),
            Some("two")
        );
    }
}
