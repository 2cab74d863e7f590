//! Scan session status types.
//!
//! This module provides the [`SessionStatus`] enum tracking where a scan
//! session is in its lifecycle.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a scan session.
///
/// A session starts in [`Scanning`](Self::Scanning) and moves exactly once to
/// one of the three terminal states.
///
/// ```text
/// scanning ──┬──> completed
///            ├──> error
///            └──> cancelled
/// ```
///
/// # Examples
///
/// ```
/// use ds_core::SessionStatus;
///
/// assert!(!SessionStatus::Scanning.is_terminal());
/// assert!(SessionStatus::Cancelled.is_terminal());
/// assert!(SessionStatus::Scanning.can_transition_to(SessionStatus::Completed));
/// assert!(!SessionStatus::Completed.can_transition_to(SessionStatus::Error));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionStatus {
    /// Discovery or analysis is still running.
    #[default]
    Scanning,

    /// The scan finished and its recommendations are available.
    Completed,

    /// The scan failed or timed out; the session carries an error message.
    Error,

    /// The scan was cancelled by a caller before it completed.
    Cancelled,
}

impl SessionStatus {
    /// Returns `true` for the three end states.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Scanning)
    }

    /// Returns `true` if moving from `self` to `next` is a legal transition.
    #[inline]
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Scanning) && next.is_terminal()
    }

    /// Returns a human-readable label for this status.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_core::SessionStatus;
    ///
    /// assert_eq!(SessionStatus::Scanning.label(), "Scanning");
    /// assert_eq!(SessionStatus::Error.label(), "Error");
    /// ```
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scanning => "Scanning",
            Self::Completed => "Completed",
            Self::Error => "Error",
            Self::Cancelled => "Cancelled",
        }
    }
}
