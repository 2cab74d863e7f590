//! Depth-bounded directory discovery.
//!
//! This module provides [`DirectoryDiscoverer`], which walks each scan root
//! depth-first and produces the flat list of directories to analyze.
//!
//! # Features
//!
//! - Root is depth 0 and always included when it is a directory
//! - Excluded directory names prune their whole subtree
//! - Checks the cancellation token before every directory
//! - Permission errors are skipped silently, other I/O errors are logged
//! - Symbolic links are not followed below the roots
//!
//! # Examples
//!
//! ```ignore
//! use ds_scanner::DirectoryDiscoverer;
//! use ds_core::ScanOptions;
//! use tokio_util::sync::CancellationToken;
//!
//! let options = ScanOptions::with_paths(["/home/me/notes"]);
//! let discoverer = DirectoryDiscoverer::new(&options);
//! let dirs = discoverer.discover(&options.scan_paths, &CancellationToken::new()).await;
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ds_core::ScanOptions;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::ScanError;
use crate::exclusion::ExclusionPolicy;

/// Walks scan roots and collects the directories worth analyzing.
///
/// # Design
///
/// Uses the "collect-then-parallelize" pattern: discovery is a single
/// sequential traversal per scan, and only the analysis that follows runs
/// concurrently. Each directory listing is an `await` point, so other scans
/// and tasks interleave with the walk.
#[derive(Debug, Clone)]
pub struct DirectoryDiscoverer {
    /// Exclusion rules for directory names.
    policy: ExclusionPolicy,
    /// Maximum depth below each root.
    max_depth: usize,
}

impl DirectoryDiscoverer {
    /// Creates a discoverer from scan options.
    #[must_use]
    pub fn new(options: &ScanOptions) -> Self {
        Self::with_policy(ExclusionPolicy::new(&options.exclude_patterns), options.max_depth)
    }

    /// Creates a discoverer from an explicit policy and depth bound.
    #[must_use]
    pub const fn with_policy(policy: ExclusionPolicy, max_depth: usize) -> Self {
        Self { policy, max_depth }
    }

    /// Collects directories under `roots`, depth-first, in root order.
    ///
    /// Returns early with whatever was accumulated once `cancel` fires.
    /// A directory reachable from several roots is listed once, and is
    /// expanded again whenever it is reached at a smaller depth.
    pub async fn discover(
        &self,
        roots: &[Utf8PathBuf],
        cancel: &CancellationToken,
    ) -> Vec<Utf8PathBuf> {
        let mut found = Vec::new();
        let mut seen = FxHashMap::default();

        for root in roots {
            if cancel.is_cancelled() {
                debug!(found = found.len(), "Discovery cancelled");
                break;
            }
            if !is_directory(root).await {
                debug!(root = %root, "Skipping root that is not a directory");
                continue;
            }
            self.walk_root(root, cancel, &mut seen, &mut found).await;
        }

        debug!(found = found.len(), "Discovery finished");
        found
    }

    /// Depth-first walk of a single root.
    async fn walk_root(
        &self,
        root: &Utf8Path,
        cancel: &CancellationToken,
        seen: &mut FxHashMap<Utf8PathBuf, usize>,
        found: &mut Vec<Utf8PathBuf>,
    ) {
        let mut stack = vec![(root.to_owned(), 0_usize)];

        while let Some((dir, depth)) = stack.pop() {
            if cancel.is_cancelled() {
                return;
            }
            match seen.get(&dir) {
                Some(&shallowest) if shallowest <= depth => continue,
                Some(_) => {}
                None => found.push(dir.clone()),
            }
            seen.insert(dir.clone(), depth);

            if depth >= self.max_depth {
                continue;
            }

            match self.child_directories(&dir).await {
                // Reverse so the first child is popped first.
                Ok(children) => stack.extend(children.into_iter().rev().map(|c| (c, depth + 1))),
                Err(e) if e.is_permission_denied() => {
                    trace!(path = %dir, "Permission denied, skipping subtree");
                }
                Err(e) => {
                    warn!(path = %dir, error = %e, "Failed to list directory, skipping subtree");
                }
            }
        }
    }

    /// Lists the non-excluded child directories of `dir`, sorted by name.
    async fn child_directories(&self, dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| ScanError::io(dir, e))?;
        let mut children = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScanError::io(dir, e))?
        {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => path,
                Err(path) => {
                    debug!(error = %ScanError::NonUtf8Path(path), "Skipping entry");
                    continue;
                }
            };
            let excluded = path
                .file_name()
                .is_none_or(|name| self.policy.is_excluded(name));
            if !excluded {
                children.push(path);
            }
        }

        children.sort();
        Ok(children)
    }

    /// Returns the configured depth bound.
    #[inline]
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

async fn is_directory(path: &Utf8Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}
