//! Configuration structures for docscout.
//!
//! This module provides configuration types for every component of the engine:
//!
//! - [`ScanOptions`] - Per-scan settings (roots, depth, parallelism, thresholds)
//! - [`CacheConfig`] - Result cache bounds and expiry
//! - [`RegistryConfig`] - Session retention and cleanup cadence
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial JSON document only overrides the keys it
//! names. Keys are camelCase to match the request options accepted by the
//! API layer.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Subfolders of the home directory added to the default scan roots when
/// they exist.
pub const COMMON_WORKSPACE_FOLDERS: &[&str] = &[
    "Documents",
    "Projects",
    "Development",
    "Code",
    "Notes",
    "workspace",
];

/// Options for a single scan request.
///
/// # Examples
///
/// ```
/// use ds_core::ScanOptions;
///
/// let options = ScanOptions::default();
/// assert_eq!(options.max_depth, 4);
/// assert_eq!(options.max_concurrent, 5);
/// assert_eq!(options.min_markdown_files, 3);
/// assert_eq!(options.scan_timeout, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanOptions {
    /// Root directories to scan. Empty means the home directory plus the
    /// [`COMMON_WORKSPACE_FOLDERS`] that exist under it.
    pub scan_paths: Vec<Utf8PathBuf>,

    /// Maximum traversal depth below each root (the root is depth 0).
    pub max_depth: usize,

    /// Maximum number of directory analyses running at once.
    pub max_concurrent: usize,

    /// Minimum number of markdown files for a directory to be recommended.
    pub min_markdown_files: usize,

    /// Extra exclusion patterns, unioned with the built-in defaults.
    pub exclude_patterns: Vec<String>,

    /// Wall-clock budget for the whole scan, in milliseconds.
    pub scan_timeout: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scan_paths: Vec::new(),
            max_depth: 4,
            max_concurrent: 5,
            min_markdown_files: 3,
            exclude_patterns: Vec::new(),
            scan_timeout: 30_000,
        }
    }
}

impl ScanOptions {
    /// Creates options scanning the given roots, with defaults for the rest.
    #[must_use]
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            scan_paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the maximum traversal depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the analysis concurrency bound.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Sets the minimum markdown file count for recommendations.
    #[must_use]
    pub const fn with_min_markdown_files(mut self, min: usize) -> Self {
        self.min_markdown_files = min;
        self
    }

    /// Adds exclusion patterns on top of the defaults.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: &[&str]) -> Self {
        self.exclude_patterns
            .extend(patterns.iter().map(ToString::to_string));
        self
    }

    /// Sets the scan timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // u64 milliseconds covers any sane timeout
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout.as_millis() as u64;
        self
    }

    /// Returns the scan timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout)
    }

    /// Checks that the options describe a runnable scan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] when `maxConcurrent` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::invalid_option(
                "maxConcurrent",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the roots to scan, falling back to the home directory defaults
    /// when none were given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoScanPaths`] when no roots were given and the
    /// home directory cannot be determined.
    pub fn resolved_scan_paths(&self) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        if !self.scan_paths.is_empty() {
            return Ok(self.scan_paths.clone());
        }
        let home = home_dir().ok_or(ConfigError::NoScanPaths)?;
        Ok(default_scan_paths(&home))
    }
}

/// Returns `home` followed by each [`COMMON_WORKSPACE_FOLDERS`] entry that
/// exists beneath it as a directory.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ds_core::config::default_scan_paths;
///
/// let paths = default_scan_paths(Utf8Path::new("/nonexistent/home"));
/// assert_eq!(paths, vec![Utf8Path::new("/nonexistent/home").to_owned()]);
/// ```
#[must_use]
pub fn default_scan_paths(home: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut paths = vec![home.to_owned()];
    paths.extend(
        COMMON_WORKSPACE_FOLDERS
            .iter()
            .map(|name| home.join(name))
            .filter(|path| path.is_dir()),
    );
    paths
}

/// Returns the current user's home directory, if it is known and UTF-8.
#[must_use]
pub fn home_dir() -> Option<Utf8PathBuf> {
    dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
}

/// Configuration for the result cache.
///
/// # Examples
///
/// ```
/// use ds_core::CacheConfig;
///
/// let config = CacheConfig::default();
/// assert_eq!(config.max_entries, 10);
/// assert_eq!(config.ttl().as_secs(), 24 * 60 * 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// How long an entry stays fresh, in seconds.
    pub ttl_secs: u64,

    /// Maximum number of cached scans; the oldest insertion is evicted first.
    pub max_entries: usize,

    /// Number of recommendations returned when reading across all entries.
    pub fresh_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            max_entries: 10,
            fresh_limit: 10,
        }
    }
}

impl CacheConfig {
    /// Returns the entry time-to-live.
    #[inline]
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Configuration for the scan registry.
///
/// # Examples
///
/// ```
/// use ds_core::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert_eq!(config.session_ttl().as_secs(), 300);
/// assert_eq!(config.cleanup_interval().as_secs(), 300);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Age after which a session is forgotten by `cleanup`, in seconds.
    pub session_ttl_secs: u64,

    /// How often the background cleanup loop runs, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 5 * 60,
            cleanup_interval_secs: 5 * 60,
        }
    }
}

impl RegistryConfig {
    /// Returns the session retention window.
    #[inline]
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Returns the cleanup cadence.
    #[inline]
    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Root configuration for docscout.
///
/// # Examples
///
/// ```
/// use ds_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("maxDepth"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default options for scans.
    pub scan: ScanOptions,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Session registry settings.
    pub registry: RegistryConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file can't be read and
    /// [`ConfigError::Parse`] if it isn't valid JSON for this structure.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.scan.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_options_defaults() {
        let options = ScanOptions::default();
        assert!(options.scan_paths.is_empty());
        assert_eq!(options.max_depth, 4);
        assert_eq!(options.max_concurrent, 5);
        assert_eq!(options.min_markdown_files, 3);
        assert!(options.exclude_patterns.is_empty());
        assert_eq!(options.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_scan_options_builders() {
        let options = ScanOptions::with_paths(["/a", "/b"])
            .with_max_depth(2)
            .with_max_concurrent(8)
            .with_min_markdown_files(1)
            .with_exclude_patterns(&["archive"])
            .with_timeout(Duration::from_secs(5));

        assert_eq!(options.scan_paths.len(), 2);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.max_concurrent, 8);
        assert_eq!(options.min_markdown_files, 1);
        assert_eq!(options.exclude_patterns, vec!["archive"]);
        assert_eq!(options.scan_timeout, 5_000);
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let options = ScanOptions::default().with_max_concurrent(0);
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidOption { ref option, .. }) if option == "maxConcurrent"
        ));
        assert!(ScanOptions::default().validate().is_ok());
    }

    #[test]
    fn test_resolved_scan_paths_prefers_explicit_roots() {
        let options = ScanOptions::with_paths(["/explicit"]);
        let paths = options.resolved_scan_paths().unwrap();
        assert_eq!(paths, vec![Utf8PathBuf::from("/explicit")]);
    }

    #[test]
    fn test_home_dir_matches_platform_lookup() {
        let expected = dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok());
        assert_eq!(home_dir(), expected);
    }

    #[test]
    fn test_default_scan_paths_skips_missing_folders() {
        let paths = default_scan_paths(Utf8Path::new("/definitely/not/a/home"));
        assert_eq!(paths, vec![Utf8PathBuf::from("/definitely/not/a/home")]);
    }

    #[test]
    fn test_deserialize_camel_case_request() {
        let json = r#"{"scanPaths": ["/docs"], "maxDepth": 2, "excludePatterns": ["old"]}"#;
        let options: ScanOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.scan_paths, vec![Utf8PathBuf::from("/docs")]);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.exclude_patterns, vec!["old"]);
        // Unnamed keys keep their defaults
        assert_eq!(options.max_concurrent, 5);
        assert_eq!(options.scan_timeout, 30_000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"cache": {"maxEntries": 3}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.cache.max_entries, 3);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.registry.session_ttl_secs, 300);
        assert_eq!(config.scan.max_depth, 4);
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = Config::from_file(Utf8Path::new("/nonexistent/docscout.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
