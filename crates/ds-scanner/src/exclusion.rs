//! Directory exclusion rules.
//!
//! Decides whether a directory (and everything below it) is skipped during
//! discovery and analysis. Matching is a case-insensitive *substring* test:
//! a directory named `my-target-folder` is excluded because it contains
//! `target`.
//!
//! # Examples
//!
//! ```
//! use ds_scanner::exclusion::should_exclude;
//!
//! assert!(should_exclude("node_modules", &[]));
//! assert!(should_exclude("My-Target-Folder", &[]));
//! assert!(should_exclude(".cache", &[]));
//! assert!(!should_exclude(".github", &[]));
//! assert!(!should_exclude("guides", &[]));
//! assert!(should_exclude("archive-2019", &["ARCHIVE".to_owned()]));
//! ```

/// Patterns excluded by default: version control, dependency, build output,
/// and cache/temp directories.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "node_modules",
    "bower_components",
    ".git",
    ".svn",
    ".hg",
    "target",
    "build",
    "dist",
    "vendor",
    "__pycache__",
    ".cache",
    "tmp",
    "coverage",
    ".next",
    ".nuxt",
    "venv",
];

/// Hidden directories that are still scanned (CI and editor configuration).
pub const HIDDEN_ALLOW_LIST: &[&str] = &[".github", ".vscode"];

/// Returns `true` if a directory with this name should be skipped.
///
/// Hidden names are skipped unless allow-listed; allow-listed names are never
/// skipped. Every other name is skipped when its lowercase form contains any
/// default pattern or any non-empty entry of `extra_patterns` (compared
/// lowercase).
#[must_use]
pub fn should_exclude(name: &str, extra_patterns: &[String]) -> bool {
    if let Some(verdict) = hidden_verdict(name) {
        return verdict;
    }
    let lower = name.to_lowercase();
    matches_default(&lower)
        || extra_patterns
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Exclusion rules for one scan, with extra patterns lowercased up front.
///
/// Behaves exactly like [`should_exclude`] but avoids re-lowercasing the
/// extra patterns for every directory.
///
/// # Examples
///
/// ```
/// use ds_scanner::ExclusionPolicy;
///
/// let policy = ExclusionPolicy::new(&["Drafts".to_owned()]);
/// assert!(policy.is_excluded("old-drafts"));
/// assert!(policy.is_excluded("build-output"));
/// assert!(!policy.is_excluded("docs"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    extra: Vec<String>,
}

impl ExclusionPolicy {
    /// Creates a policy from user-supplied extra patterns.
    #[must_use]
    pub fn new(extra_patterns: &[String]) -> Self {
        Self {
            extra: extra_patterns
                .iter()
                .filter(|pattern| !pattern.is_empty())
                .map(|pattern| pattern.to_lowercase())
                .collect(),
        }
    }

    /// Returns `true` if a directory with this name should be skipped.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        if let Some(verdict) = hidden_verdict(name) {
            return verdict;
        }
        let lower = name.to_lowercase();
        matches_default(&lower) || self.extra.iter().any(|pattern| lower.contains(pattern))
    }

    /// Returns the lowercased extra patterns.
    #[inline]
    #[must_use]
    pub fn extra_patterns(&self) -> &[String] {
        &self.extra
    }
}

/// `Some(excluded)` for hidden names, `None` when the pattern check applies.
fn hidden_verdict(name: &str) -> Option<bool> {
    if !name.starts_with('.') {
        return None;
    }
    let allowed = HIDDEN_ALLOW_LIST
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(name));
    Some(!allowed)
}

fn matches_default(lower: &str) -> bool {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}
