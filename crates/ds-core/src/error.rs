//! Error types for the ds-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related errors
//! that can occur across the workspace.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use ds_core::ConfigError;
///
/// let error = ConfigError::InvalidOption {
///     option: "maxConcurrent".to_owned(),
///     reason: "must be at least 1".to_owned(),
/// };
/// assert!(error.to_string().contains("maxConcurrent"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// No scan roots were given and no home directory could be determined.
    #[error("no scan paths given and no home directory is set")]
    NoScanPaths,

    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
