//! Workspace discovery and recommendation engine.
//!
//! This crate walks a set of root directories, analyzes every directory it
//! finds for markdown documentation, scores each one, and recommends the
//! directories most likely to be a documentation workspace.
//!
//! # Overview
//!
//! The main entry point is [`ScanRegistry`], which owns scan sessions and a
//! shared [`ResultCache`]. A scan runs in the background; callers poll it by
//! id and may cancel it at any time.
//!
//! # Example
//!
//! ```ignore
//! use ds_core::ScanOptions;
//! use ds_scanner::ScanRegistry;
//!
//! let registry = ScanRegistry::default();
//! let id = registry.start_scan(ScanOptions::with_paths(["/home/me"]).with_max_depth(3))?;
//!
//! // Poll until the session is finished
//! let snapshot = loop {
//!     let snapshot = registry.get_progress(&id).expect("session exists");
//!     if snapshot.is_finished() {
//!         break snapshot;
//!     }
//!     println!("{:.0}%", snapshot.progress.percent());
//!     tokio::time::sleep(std::time::Duration::from_millis(200)).await;
//! };
//!
//! for candidate in &snapshot.recommendations {
//!     println!("{:.2} {}", candidate.score, candidate.path);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ScanRegistry (sessions: DashMap, cache: Arc<ResultCache>)
//!     │
//!     └── ScanOrchestrator (one tokio task per scan, weak session handle)
//!             │
//!             ├── DirectoryDiscoverer (sequential depth-first walk)
//!             │       │
//!             │       └── ExclusionPolicy (name rules)
//!             │
//!             ├── ConcurrencyLimiter (FIFO, ≤ maxConcurrent)
//!             │       │
//!             │       └── WorkspaceAnalyzer (one directory's entries)
//!             │               │
//!             │               └── scorer (weighted signals)
//!             │
//!             └── ResultCache (insertion-ordered, 24h TTL)
//! ```
//!
//! # Concurrency
//!
//! - **I/O**: every listing and stat is an `await` point on `tokio::fs`
//! - **Parallelism**: analyses of one scan are multiplexed on its task
//! - **Locking**: short `parking_lot` sections, never held across `await`

#![deny(clippy::all)]
#![warn(missing_docs)]

mod analyzer;
mod cache;
mod discover;
mod error;
mod limiter;
mod orchestrator;
mod registry;
mod session;

pub mod exclusion;
pub mod scorer;

pub use analyzer::{MARKDOWN_EXTENSIONS, WorkspaceAnalyzer, is_markdown};
pub use cache::{ResultCache, cache_key};
pub use discover::DirectoryDiscoverer;
pub use error::ScanError;
pub use exclusion::{ExclusionPolicy, should_exclude};
pub use limiter::{ConcurrencyLimiter, LimiterError, LimiterPermit};
pub use orchestrator::{
    FOUND_SCORE_THRESHOLD, MAX_RECOMMENDATIONS, ScanOrchestrator, rank_candidates,
};
pub use registry::ScanRegistry;
pub use session::ScanSession;
