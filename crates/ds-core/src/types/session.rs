//! Scan session identity, progress, and snapshot types.
//!
//! These are the read-side views of a scan session: what a poller receives
//! when it asks the registry how a scan is going.

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::candidate::WorkspaceCandidate;
use super::status::SessionStatus;

/// An opaque identifier for a scan session.
///
/// Uses a newtype so a scan id can't be confused with an arbitrary string.
/// Ids are issued by the registry and never reused within it.
///
/// # Examples
///
/// ```
/// use ds_core::ScanId;
///
/// let id = ScanId::new("scan_1700000000000_1");
/// assert_eq!(id.as_str(), "scan_1700000000000_1");
/// assert_eq!(id.to_string(), "scan_1700000000000_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Creates a scan id from its string form.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ScanId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ScanId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Progress counters for a running scan.
///
/// Written only by the scan's orchestrator; `scanned_directories` never
/// decreases during a run.
///
/// # Examples
///
/// ```
/// use ds_core::ScanProgress;
///
/// let progress = ScanProgress {
///     scanned_directories: 25,
///     total_directories: 100,
///     ..Default::default()
/// };
/// assert!((progress.percent() - 25.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Directories whose analysis has settled.
    pub scanned_directories: u64,
    /// Directories found by discovery.
    pub total_directories: u64,
    /// The directory most recently analyzed.
    pub current_directory: Option<Utf8PathBuf>,
    /// Directories that scored high enough to be kept as candidates.
    pub found_workspaces: u64,
}

impl ScanProgress {
    /// Returns analysis progress as a percentage.
    ///
    /// Returns 0.0 until discovery has reported a non-zero total.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for progress display
    pub fn percent(&self) -> f64 {
        if self.total_directories == 0 {
            return 0.0;
        }
        (self.scanned_directories as f64 / self.total_directories as f64) * 100.0
    }
}

/// A point-in-time view of one scan session.
///
/// Snapshots are always complete: `recommendations` is either empty or the
/// full final ranking, never a partial list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    /// The session id.
    pub id: ScanId,
    /// Lifecycle state at the time of the snapshot.
    pub status: SessionStatus,
    /// Progress counters.
    pub progress: ScanProgress,
    /// Ranked recommendations; non-empty only when completed.
    pub recommendations: Vec<WorkspaceCandidate>,
    /// Failure message when `status` is `error`.
    pub error: Option<String>,
    /// Time since the session started, in milliseconds.
    pub duration_ms: u64,
    /// Session start time as Unix epoch milliseconds.
    pub started_at: u64,
}

impl ScanSnapshot {
    /// Returns `true` once the session has reached a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
