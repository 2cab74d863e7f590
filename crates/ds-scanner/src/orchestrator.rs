//! Drives one scan session from discovery to cached results.
//!
//! # Pipeline
//!
//! ```text
//! discover roots ──> analyze each directory (≤ maxConcurrent at once)
//!                         │
//!                         └──> keep score > 0.1 ──> filter minMarkdownFiles
//!                                                   ──> rank ──> top 20
//!                                                         │
//!                                      session.complete <─┴─> cache.put
//! ```
//!
//! The whole pipeline runs under the session's `scanTimeout`. Analysis
//! futures are multiplexed on the orchestrator's own task through a
//! [`FuturesUnordered`], each admitted by the [`ConcurrencyLimiter`].

use std::future::Future;
use std::sync::{Arc, Weak};

use camino::Utf8Path;
use ds_core::{ScanId, ScanOptions, WorkspaceCandidate};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analyzer::WorkspaceAnalyzer;
use crate::cache::{ResultCache, cache_key};
use crate::discover::DirectoryDiscoverer;
use crate::error::ScanError;
use crate::limiter::{ConcurrencyLimiter, LimiterError};
use crate::session::ScanSession;

/// Maximum number of recommendations a completed scan keeps.
pub const MAX_RECOMMENDATIONS: usize = 20;

/// A candidate must score strictly above this to count as found.
pub const FOUND_SCORE_THRESHOLD: f64 = 0.1;

/// How a scan run ended, before it is written to the session.
#[derive(Debug)]
enum Outcome {
    Completed(Vec<WorkspaceCandidate>),
    Cancelled,
    /// The registry dropped the session mid-run.
    Evicted,
}

/// Runs the scan for one session.
///
/// Holds only a weak handle to the session: once the registry forgets the
/// session, every write becomes a no-op, no further analysis is admitted and
/// nothing is cached.
#[derive(Debug)]
pub struct ScanOrchestrator {
    session: Weak<ScanSession>,
    id: ScanId,
    options: ScanOptions,
    cancel: CancellationToken,
    cache: Arc<ResultCache>,
}

impl ScanOrchestrator {
    /// Creates an orchestrator for `session`, writing results into `cache`.
    ///
    /// The session's options must already have resolved scan paths.
    #[must_use]
    pub fn new(session: &Arc<ScanSession>, cache: Arc<ResultCache>) -> Self {
        Self {
            session: Arc::downgrade(session),
            id: session.id().clone(),
            options: session.options().clone(),
            cancel: session.cancel_token().clone(),
            cache,
        }
    }

    /// Runs the scan to a terminal state.
    pub async fn run(self) {
        let timeout = self.options.timeout();
        info!(id = %self.id, roots = self.options.scan_paths.len(), "Scan started");

        let outcome = match tokio::time::timeout(timeout, self.execute()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ScanError::Timeout(timeout)),
        };

        match outcome {
            Ok(Outcome::Completed(recommendations)) => self.finish(recommendations),
            Ok(Outcome::Cancelled) => {
                if let Some(session) = self.session.upgrade() {
                    session.cancel();
                }
                info!(id = %self.id, "Scan cancelled");
            }
            Ok(Outcome::Evicted) => {
                debug!(id = %self.id, "Session evicted before completion");
            }
            Err(e) => {
                warn!(id = %self.id, error = %e, "Scan failed");
                if let Some(session) = self.session.upgrade() {
                    session.fail(e.to_string());
                }
            }
        }
    }

    async fn execute(&self) -> Result<Outcome, ScanError> {
        let limiter = ConcurrencyLimiter::new(self.options.max_concurrent)?;
        let discoverer = DirectoryDiscoverer::new(&self.options);
        let analyzer = WorkspaceAnalyzer::new(&self.options);

        let directories = discoverer
            .discover(&self.options.scan_paths, &self.cancel)
            .await;
        if self.cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        {
            let Some(session) = self.session.upgrade() else {
                return Ok(Outcome::Evicted);
            };
            session.set_total(directories.len() as u64);
        }
        debug!(id = %self.id, directories = directories.len(), "Discovery complete");

        let mut pending: FuturesUnordered<_> = directories
            .iter()
            .map(|dir| {
                let (limiter, analyzer, cancel) = (&limiter, &analyzer, &self.cancel);
                async move {
                    let result = limiter
                        .run_unless_cancelled(cancel, analyzer.analyze(dir))
                        .await;
                    (dir.as_path(), result)
                }
            })
            .collect();

        let mut found = Vec::new();
        while let Some((dir, result)) = pending.next().await {
            let Some(session) = self.session.upgrade() else {
                return Ok(Outcome::Evicted);
            };
            let candidate = match result {
                Ok(candidate) => candidate,
                Err(LimiterError::Cancelled) => continue,
                Err(e) => return Err(e.into()),
            };
            // Analyses admitted before cancellation still finish; drop them.
            if self.cancel.is_cancelled() {
                continue;
            }
            record(&session, dir, candidate, &mut found);
        }

        if self.cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        Ok(Outcome::Completed(rank_candidates(
            found,
            self.options.min_markdown_files,
        )))
    }

    fn finish(&self, recommendations: Vec<WorkspaceCandidate>) {
        let Some(session) = self.session.upgrade() else {
            debug!(id = %self.id, "Session evicted, not caching results");
            return;
        };
        let count = recommendations.len();
        if session.complete(recommendations.clone()) {
            self.cache
                .put(cache_key(&self.options.scan_paths), recommendations);
            info!(id = %self.id, recommendations = count, "Scan completed");
        }
    }
}

fn record(
    session: &ScanSession,
    dir: &Utf8Path,
    candidate: Option<WorkspaceCandidate>,
    found: &mut Vec<WorkspaceCandidate>,
) {
    let kept = candidate.filter(|c| c.score > FOUND_SCORE_THRESHOLD);
    session.record_analysis(dir, kept.is_some());
    found.extend(kept);
}

/// Turns found candidates into the final recommendation list.
///
/// Drops candidates with fewer than `min_markdown_files` markdown files,
/// sorts the rest by score (highest first, ties keep their order) and keeps
/// the top [`MAX_RECOMMENDATIONS`].
#[must_use]
pub fn rank_candidates(
    candidates: Vec<WorkspaceCandidate>,
    min_markdown_files: usize,
) -> Vec<WorkspaceCandidate> {
    let mut ranked: Vec<_> = candidates
        .into_iter()
        .filter(|c| c.markdown_count >= min_markdown_files)
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(MAX_RECOMMENDATIONS);
    ranked
}

/// Spawns the orchestrator for `session` onto `runtime`.
pub(crate) fn spawn(
    runtime: &Handle,
    session: &Arc<ScanSession>,
    cache: Arc<ResultCache>,
) -> JoinHandle<()> {
    let orchestrator = ScanOrchestrator::new(session, cache);
    supervise(runtime, Arc::downgrade(session), orchestrator.run())
}

/// Runs `scan` as its own task and fails the session if that task panics
/// or is aborted.
fn supervise<F>(runtime: &Handle, session: Weak<ScanSession>, scan: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let task = runtime.spawn(scan);
    runtime.spawn(async move {
        let Err(join_error) = task.await else {
            return;
        };
        let error = ScanError::Task(join_error.to_string());
        warn!(error = %error, "Scan task stopped unexpectedly");
        if let Some(session) = session.upgrade() {
            session.fail(error.to_string());
        }
    })
}
