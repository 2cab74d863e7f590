//! Bounded, expiring cache of completed scan results.
//!
//! This module provides [`ResultCache`], which remembers the ranked
//! recommendations of recent scans keyed by their root set.
//!
//! # Eviction
//!
//! - **Capacity**: at most `max_entries`; inserting beyond the bound evicts
//!   the entry inserted earliest (insertion order, not recency of use)
//! - **Expiry**: entries older than the TTL are dropped lazily, on read
//! - **Replacement**: re-inserting a key replaces its value and moves it to
//!   the back of the insertion order
//!
//! # Examples
//!
//! ```
//! use ds_scanner::{cache_key, ResultCache};
//! use ds_core::CacheConfig;
//! use camino::Utf8PathBuf;
//!
//! let cache = ResultCache::new(CacheConfig::default());
//! let key = cache_key(&[Utf8PathBuf::from("/a"), Utf8PathBuf::from("/b")]);
//! assert_eq!(key, "/a,/b");
//!
//! cache.put(key.clone(), Vec::new());
//! assert_eq!(cache.get(&key), Some(Vec::new()));
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use camino::Utf8PathBuf;
use ds_core::{CacheConfig, WorkspaceCandidate};
use parking_lot::Mutex;
use tracing::debug;

/// Builds the cache key for a set of scan roots.
///
/// Roots are joined with `,` in the order given, so the same roots listed in
/// a different order produce a different key.
#[must_use]
pub fn cache_key(roots: &[Utf8PathBuf]) -> String {
    roots
        .iter()
        .map(|root| root.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug)]
struct CacheEntry {
    key: String,
    created: Instant,
    recommendations: Vec<WorkspaceCandidate>,
}

/// A thread-safe cache of scan recommendations.
///
/// All reads return owned copies; no lock is held once a method returns.
#[derive(Debug)]
pub struct ResultCache {
    config: CacheConfig,
    /// Oldest insertion at the front.
    entries: Mutex<VecDeque<CacheEntry>>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResultCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(VecDeque::with_capacity(config.max_entries)),
        }
    }

    /// Returns the recommendations stored under `key`, if still fresh.
    ///
    /// An expired entry is removed by this call.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<WorkspaceCandidate>> {
        let mut entries = self.entries.lock();
        let index = entries.iter().position(|entry| entry.key == key)?;
        if self.is_fresh(&entries[index]) {
            return Some(entries[index].recommendations.clone());
        }
        entries.remove(index);
        debug!(key, "Cache entry expired");
        None
    }

    /// Stores `recommendations` under `key`, evicting the earliest insertion
    /// when the cache is full.
    pub fn put(&self, key: impl Into<String>, recommendations: Vec<WorkspaceCandidate>) {
        let key = key.into();
        let mut entries = self.entries.lock();
        entries.retain(|entry| entry.key != key);
        entries.push_back(CacheEntry {
            key,
            created: Instant::now(),
            recommendations,
        });
        while entries.len() > self.config.max_entries {
            if let Some(evicted) = entries.pop_front() {
                debug!(key = %evicted.key, "Evicted cache entry");
            }
        }
    }

    /// Returns the best recommendations across every fresh entry.
    ///
    /// Results are merged, sorted by score descending and cut to
    /// `fresh_limit`. The same directory may appear more than once if
    /// several scans found it. Expired entries are removed.
    #[must_use]
    pub fn get_all_fresh(&self) -> Vec<WorkspaceCandidate> {
        let mut merged: Vec<WorkspaceCandidate> = {
            let mut entries = self.entries.lock();
            entries.retain(|entry| self.is_fresh(entry));
            entries
                .iter()
                .flat_map(|entry| entry.recommendations.iter().cloned())
                .collect()
        };
        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged.truncate(self.config.fresh_limit);
        merged
    }

    /// Returns the number of stored entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the cache settings.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.created.elapsed() < self.config.ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use ds_core::WorkspacePreview;

    fn make_candidate(name: &str, score: f64) -> WorkspaceCandidate {
        WorkspaceCandidate {
            path: Utf8PathBuf::from(format!("/w/{name}")),
            name: name.to_owned(),
            markdown_count: 5,
            total_files: 5,
            subdirectories: BTreeSet::new(),
            has_readme: false,
            has_docs: false,
            has_guides: false,
            last_modified: 0,
            score,
            preview: WorkspacePreview::default(),
        }
    }

    fn names(candidates: &[WorkspaceCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_cache_key_order_sensitive() {
        let a = Utf8PathBuf::from("/a");
        let b = Utf8PathBuf::from("/b");
        assert_eq!(cache_key(&[a.clone(), b.clone()]), "/a,/b");
        assert_eq!(cache_key(&[b, a]), "/b,/a");
        assert_eq!(cache_key(&[]), "");
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = ResultCache::default();
        assert!(cache.is_empty());

        cache.put("/a", vec![make_candidate("a", 0.5)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(names(&cache.get("/a").unwrap()), vec!["a"]);
        assert!(cache.get("/missing").is_none());
    }

    #[test]
    fn test_cache_eleventh_insert_evicts_earliest() {
        let cache = ResultCache::default();
        for i in 0..11 {
            cache.put(format!("/root{i}"), Vec::new());
        }

        assert_eq!(cache.len(), 10);
        assert!(cache.get("/root0").is_none());
        assert!(cache.get("/root1").is_some());
        assert!(cache.get("/root10").is_some());
    }

    #[test]
    fn test_cache_reinsert_refreshes_position() {
        let cache = ResultCache::default();
        for i in 0..10 {
            cache.put(format!("/root{i}"), Vec::new());
        }
        cache.put("/root0", vec![make_candidate("again", 0.9)]);
        cache.put("/root10", Vec::new());

        assert_eq!(cache.len(), 10);
        assert!(cache.get("/root1").is_none());
        assert_eq!(names(&cache.get("/root0").unwrap()), vec!["again"]);
    }

    #[test]
    fn test_cache_expired_entries_dropped_on_read() {
        let cache = ResultCache::new(CacheConfig {
            ttl_secs: 0,
            ..CacheConfig::default()
        });
        cache.put("/a", vec![make_candidate("a", 0.5)]);
        assert_eq!(cache.len(), 1);

        assert!(cache.get("/a").is_none());
        assert!(cache.is_empty());

        cache.put("/b", vec![make_candidate("b", 0.5)]);
        assert!(cache.get_all_fresh().is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_get_all_fresh_merges_top_ten() {
        let cache = ResultCache::default();
        cache.put(
            "/one",
            (0..8).map(|i| make_candidate(&format!("one-{i}"), f64::from(i) / 10.0)).collect(),
        );
        cache.put(
            "/two",
            vec![make_candidate("two-best", 0.95), make_candidate("one-7", 0.7)],
        );

        let fresh = cache.get_all_fresh();
        assert_eq!(fresh.len(), 10);
        assert_eq!(fresh[0].name, "two-best");
        // Duplicates across entries are kept.
        assert_eq!(fresh.iter().filter(|c| c.name == "one-7").count(), 2);
        assert!(fresh.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_cache_clear() {
        let cache = ResultCache::default();
        cache.put("/a", Vec::new());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get_all_fresh().is_empty());
    }
}
