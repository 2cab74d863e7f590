//! Scan session state.
//!
//! A [`ScanSession`] is the record of one scan request. The registry owns it;
//! the orchestrator holds a weak handle and is the only writer of progress
//! and results. Pollers read it through [`ScanSession::snapshot`].

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use ds_core::{ScanId, ScanOptions, ScanProgress, ScanSnapshot, SessionStatus, WorkspaceCandidate};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One scan request and its evolving state.
///
/// Every mutation takes a short lock and is ignored once the session has
/// left [`SessionStatus::Scanning`], so a terminal state is final.
///
/// # Examples
///
/// ```
/// use ds_core::{ScanId, ScanOptions, SessionStatus};
/// use ds_scanner::ScanSession;
///
/// let session = ScanSession::new(ScanId::new("scan_1_1"), ScanOptions::default());
/// assert_eq!(session.status(), SessionStatus::Scanning);
///
/// assert!(session.cancel());
/// assert!(!session.complete(Vec::new()));
/// assert_eq!(session.status(), SessionStatus::Cancelled);
/// ```
#[derive(Debug)]
pub struct ScanSession {
    id: ScanId,
    options: ScanOptions,
    started_at: Instant,
    started_at_ms: u64,
    cancel: CancellationToken,
    state: Mutex<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    status: SessionStatus,
    progress: ScanProgress,
    recommendations: Vec<WorkspaceCandidate>,
    error: Option<String>,
    /// Run time frozen at the terminal transition.
    finished_after: Option<Duration>,
}

impl ScanSession {
    /// Creates a session in the `scanning` state, started now.
    #[must_use]
    pub fn new(id: ScanId, options: ScanOptions) -> Self {
        Self {
            id,
            options,
            started_at: Instant::now(),
            started_at_ms: epoch_millis(SystemTime::now()),
            cancel: CancellationToken::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &ScanId {
        &self.id
    }

    /// Returns the resolved options this session scans with.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Returns how long ago the session was created.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the token that fires when the session is cancelled.
    #[inline]
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Records the number of directories discovery found.
    pub fn set_total(&self, total: u64) {
        let mut state = self.state.lock();
        if state.status == SessionStatus::Scanning {
            state.progress.total_directories = total;
        }
    }

    /// Records one settled analysis of `dir`; `found` marks a kept candidate.
    pub fn record_analysis(&self, dir: &Utf8Path, found: bool) {
        let mut state = self.state.lock();
        if state.status != SessionStatus::Scanning {
            return;
        }
        let progress = &mut state.progress;
        progress.scanned_directories += 1;
        progress.current_directory = Some(dir.to_owned());
        if found {
            progress.found_workspaces += 1;
        }
    }

    /// Moves to `completed` with the final ranking.
    ///
    /// Returns `false` (and drops `recommendations`) if the session already
    /// reached a terminal state.
    pub fn complete(&self, recommendations: Vec<WorkspaceCandidate>) -> bool {
        self.finish(SessionStatus::Completed, |state| {
            state.recommendations = recommendations;
        })
    }

    /// Moves to `error` with `message`.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.finish(SessionStatus::Error, |state| state.error = Some(message))
    }

    /// Moves to `cancelled` and fires the cancellation token.
    ///
    /// Returns `false` if the session was not running.
    pub fn cancel(&self) -> bool {
        let cancelled = self.finish(SessionStatus::Cancelled, |_| {});
        if cancelled {
            self.cancel.cancel();
        }
        cancelled
    }

    fn finish(&self, next: SessionStatus, apply: impl FnOnce(&mut SessionState)) -> bool {
        let mut state = self.state.lock();
        if !state.status.can_transition_to(next) {
            debug!(id = %self.id, from = ?state.status, to = ?next, "Ignoring transition");
            return false;
        }
        state.status = next;
        state.finished_after = Some(self.started_at.elapsed());
        apply(&mut *state);
        true
    }

    /// Returns a consistent copy of the session's current state.
    #[must_use]
    pub fn snapshot(&self) -> ScanSnapshot {
        let state = self.state.lock();
        let elapsed = state
            .finished_after
            .unwrap_or_else(|| self.started_at.elapsed());
        ScanSnapshot {
            id: self.id.clone(),
            status: state.status,
            progress: state.progress.clone(),
            recommendations: state.recommendations.clone(),
            error: state.error.clone(),
            duration_ms: duration_millis(elapsed),
            started_at: self.started_at_ms,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

pub(crate) fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, duration_millis)
}
