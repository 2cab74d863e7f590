//! Error types for the ds-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! during directory discovery, analysis, and scan orchestration.

use std::time::Duration;

use camino::Utf8PathBuf;
use ds_core::ConfigError;

use crate::limiter::LimiterError;

/// Errors that can occur during scanning operations.
///
/// # Error Recovery Strategy
///
/// - **Permission denied** ([`ScanError::Io`] with
///   [`is_permission_denied`](ScanError::is_permission_denied)): expected,
///   skip the directory silently
/// - **Other I/O errors** ([`ScanError::Io`]): log a warning, skip the
///   directory, continue the scan
/// - **Non-UTF-8 paths** ([`ScanError::NonUtf8Path`]): skip the entry
/// - **Timeout / task / limiter failures**: fatal for the session, which moves to
///   `error`
/// - **Config errors** and [`ScanError::NoRuntime`]: rejected before a
///   session is created
///
/// # Examples
///
/// ```
/// use ds_scanner::ScanError;
/// use std::io;
///
/// let err = ScanError::io("/private", io::Error::from(io::ErrorKind::PermissionDenied));
/// assert!(err.is_recoverable());
/// assert!(err.is_permission_denied());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to list or stat a directory.
    ///
    /// Scanning continues by skipping the directory.
    #[error("failed to read directory {path}: {source}")]
    Io {
        /// The directory that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path is not valid UTF-8.
    ///
    /// This crate uses UTF-8 paths throughout; such entries are skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The scan exceeded its wall-clock budget.
    #[error("scan timed out after {}ms", _0.as_millis())]
    Timeout(Duration),

    /// The background scan task stopped unexpectedly.
    #[error("scan task failed: {0}")]
    Task(String),

    /// A scan was started outside a Tokio runtime.
    #[error("no Tokio runtime to run the scan on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The analysis limiter refused work.
    #[error(transparent)]
    Limiter(#[from] LimiterError),

    /// Invalid scan options.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Creates a new [`ScanError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal for the scan session.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns `true` for I/O errors caused by missing permissions.
    ///
    /// These are expected when scanning a home directory and are skipped
    /// without a warning.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::NonUtf8Path(_)
            | Self::Timeout(_)
            | Self::Task(_)
            | Self::NoRuntime(_)
            | Self::Limiter(_)
            | Self::Config(_) => None,
        }
    }
}
