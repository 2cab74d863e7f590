//! Scan session registry.
//!
//! [`ScanRegistry`] is the service entry point: it creates sessions, runs
//! their orchestrators in the background, answers progress queries, cancels
//! scans and forgets old sessions.
//!
//! # Examples
//!
//! ```ignore
//! use ds_core::ScanOptions;
//! use ds_scanner::ScanRegistry;
//!
//! let registry = ScanRegistry::default();
//! let id = registry.start_scan(ScanOptions::with_paths(["/home/me/notes"]))?;
//!
//! while let Some(snapshot) = registry.get_progress(&id) {
//!     if snapshot.is_finished() {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use ds_core::{
    CacheConfig, CachedRecommendations, Config, RegistryConfig, ScanId, ScanOptions, ScanSnapshot,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::error::ScanError;
use crate::orchestrator;
use crate::session::{ScanSession, epoch_millis};

/// Lower bound on the cleanup cadence; a zero interval would spin.
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Owns every scan session and the shared result cache.
///
/// # Thread Safety
///
/// `ScanRegistry` is `Send + Sync`; share it behind an [`Arc`]. Sessions
/// live in a [`DashMap`] and no map reference outlives a method call.
#[derive(Debug)]
pub struct ScanRegistry {
    sessions: DashMap<ScanId, Arc<ScanSession>>,
    cache: Arc<ResultCache>,
    config: RegistryConfig,
    sequence: AtomicU64,
}

impl Default for ScanRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default(), CacheConfig::default())
    }
}

impl ScanRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: RegistryConfig, cache: CacheConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            cache: Arc::new(ResultCache::new(cache)),
            config,
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates a registry from the root configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registry, config.cache)
    }

    /// Starts a scan in the background and returns its id immediately.
    ///
    /// Empty `scan_paths` fall back to the home directory defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] when the options are invalid or no scan
    /// roots can be determined, and [`ScanError::NoRuntime`] when called
    /// outside a Tokio runtime. Failures during the scan itself are reported
    /// through the session, never here.
    pub fn start_scan(&self, mut options: ScanOptions) -> Result<ScanId, ScanError> {
        let runtime = Handle::try_current()?;
        options.validate()?;
        options.scan_paths = options.resolved_scan_paths()?;

        let id = self.next_id();
        let session = Arc::new(ScanSession::new(id.clone(), options));
        self.sessions.insert(id.clone(), Arc::clone(&session));
        orchestrator::spawn(&runtime, &session, Arc::clone(&self.cache));

        info!(id = %id, roots = ?session.options().scan_paths, "Scan queued");
        Ok(id)
    }

    /// Returns a snapshot of the session, or `None` if the id is unknown.
    #[must_use]
    pub fn get_progress(&self, id: &ScanId) -> Option<ScanSnapshot> {
        self.sessions.get(id).map(|session| session.snapshot())
    }

    /// Cancels a running scan.
    ///
    /// Returns `true` if the session existed and was still scanning.
    pub fn cancel(&self, id: &ScanId) -> bool {
        let Some(session) = self.session(id) else {
            debug!(id = %id, "Cancel for unknown scan");
            return false;
        };
        let cancelled = session.cancel();
        if cancelled {
            info!(id = %id, "Scan cancellation requested");
        }
        cancelled
    }

    /// Returns the best cached recommendations without scanning.
    #[must_use]
    pub fn get_cached_recommendations(&self) -> CachedRecommendations {
        CachedRecommendations::from(self.cache.get_all_fresh())
    }

    /// Forgets sessions older than the configured session TTL.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_older_than(self.config.session_ttl())
    }

    /// Forgets every session whose age is at least `max_age`, whatever its
    /// status. A forgotten session's orchestrator stops at its next step.
    pub fn cleanup_older_than(&self, max_age: Duration) -> usize {
        let mut removed = 0_usize;
        self.sessions.retain(|_, session| {
            let keep = session.age() < max_age;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "Cleaned up scan sessions");
        }
        removed
    }

    /// Runs [`cleanup`](Self::cleanup) every cleanup interval until `shutdown`
    /// fires.
    pub fn spawn_cleanup_task(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = self.config.cleanup_interval().max(MIN_CLEANUP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.cleanup();
                    }
                }
            }
        })
    }

    /// Returns the number of tracked sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns the shared result cache.
    #[inline]
    #[must_use]
    pub const fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    fn session(&self, id: &ScanId) -> Option<Arc<ScanSession>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    fn next_id(&self) -> ScanId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        ScanId::new(format!(
            "scan_{}_{sequence}",
            epoch_millis(SystemTime::now())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use ds_core::{ConfigError, SessionStatus};

    fn empty_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8");
        (temp, root)
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (_temp, root) = empty_root();
        let registry = ScanRegistry::default();

        let a = registry.start_scan(ScanOptions::with_paths([root.clone()])).unwrap();
        let b = registry.start_scan(ScanOptions::with_paths([root])).unwrap();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("scan_"));
        assert!(b.as_str().ends_with("_2"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected_synchronously() {
        let registry = ScanRegistry::default();
        let options = ScanOptions::with_paths(["/tmp"]).with_max_concurrent(0);

        let err = registry.start_scan(options).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Config(ConfigError::InvalidOption { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_start_scan_outside_runtime_is_an_error() {
        let (_temp, root) = empty_root();
        let registry = ScanRegistry::default();

        let err = registry.start_scan(ScanOptions::with_paths([root])).unwrap_err();
        assert!(matches!(err, ScanError::NoRuntime(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let registry = ScanRegistry::default();
        let id = ScanId::new("scan_0_999");

        assert!(registry.get_progress(&id).is_none());
        assert!(!registry.cancel(&id));
    }

    #[tokio::test]
    async fn test_cancel_is_single_shot() {
        let (_temp, root) = empty_root();
        let registry = ScanRegistry::default();
        let id = registry.start_scan(ScanOptions::with_paths([root])).unwrap();

        assert!(registry.cancel(&id));
        assert!(!registry.cancel(&id));
        assert_eq!(
            registry.get_progress(&id).map(|s| s.status),
            Some(SessionStatus::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_cleanup_removes_old_sessions_once() {
        let (_temp, root) = empty_root();
        let registry = ScanRegistry::new(
            RegistryConfig {
                session_ttl_secs: 0,
                ..RegistryConfig::default()
            },
            CacheConfig::default(),
        );
        registry.start_scan(ScanOptions::with_paths([root.clone()])).unwrap();
        registry.start_scan(ScanOptions::with_paths([root])).unwrap();

        assert_eq!(registry.cleanup(), 2);
        assert_eq!(registry.cleanup(), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_young_sessions() {
        let (_temp, root) = empty_root();
        let registry = ScanRegistry::default();
        registry.start_scan(ScanOptions::with_paths([root])).unwrap();

        assert_eq!(registry.cleanup(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_recommendations_empty_registry() {
        let registry = ScanRegistry::default();
        let cached = registry.get_cached_recommendations();
        assert_eq!(cached.count, 0);
        assert!(cached.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let registry = Arc::new(ScanRegistry::new(
            RegistryConfig {
                session_ttl_secs: 0,
                cleanup_interval_secs: 1,
            },
            CacheConfig::default(),
        ));
        let shutdown = CancellationToken::new();
        let handle = registry.spawn_cleanup_task(shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("cleanup task stops")
            .expect("cleanup task does not panic");
    }
}
