//! Single-directory analysis.
//!
//! This module provides [`WorkspaceAnalyzer`], which inspects the immediate
//! entries of one directory and turns them into a scored
//! [`WorkspaceCandidate`].
//!
//! # Design
//!
//! Only the directory's own entries are looked at; nested directories are
//! analyzed separately when discovery lists them. The analyzer never fails:
//! a directory that can't be read, or that holds no markdown, yields `None`.
//!
//! # Examples
//!
//! ```ignore
//! use ds_scanner::WorkspaceAnalyzer;
//! use camino::Utf8Path;
//!
//! let analyzer = WorkspaceAnalyzer::default();
//! if let Some(candidate) = analyzer.analyze(Utf8Path::new("/home/me/notes")).await {
//!     println!("{}: {:.2}", candidate.name, candidate.score);
//! }
//! ```

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use ds_core::{ScanOptions, WorkspaceCandidate, WorkspacePreview};
use tracing::{debug, trace, warn};

use crate::error::ScanError;
use crate::exclusion::ExclusionPolicy;
use crate::scorer::{self, CandidateStats};
use crate::session::epoch_millis;

/// File extensions treated as markdown, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Analyzes directories one at a time.
///
/// Cheap to clone; the orchestrator shares one per scan across all analysis
/// futures.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceAnalyzer {
    policy: ExclusionPolicy,
}

/// What one directory listing contained.
#[derive(Debug, Default)]
struct DirectorySurvey {
    markdown_count: usize,
    total_files: usize,
    subdirectories: BTreeSet<String>,
    has_readme: bool,
    has_docs: bool,
    has_guides: bool,
    newest_markdown: Option<SystemTime>,
    preview: WorkspacePreview,
}

impl WorkspaceAnalyzer {
    /// Creates an analyzer using the exclusion patterns of `options`.
    #[must_use]
    pub fn new(options: &ScanOptions) -> Self {
        Self::with_policy(ExclusionPolicy::new(&options.exclude_patterns))
    }

    /// Creates an analyzer from an explicit exclusion policy.
    #[must_use]
    pub const fn with_policy(policy: ExclusionPolicy) -> Self {
        Self { policy }
    }

    /// Analyzes `dir`, scoring against the current wall clock.
    ///
    /// Returns `None` when `dir` has no markdown files or can't be listed.
    pub async fn analyze(&self, dir: &Utf8Path) -> Option<WorkspaceCandidate> {
        self.analyze_at(dir, SystemTime::now()).await
    }

    /// Analyzes `dir`, scoring recency as of `now`.
    pub async fn analyze_at(&self, dir: &Utf8Path, now: SystemTime) -> Option<WorkspaceCandidate> {
        let survey = match self.survey(dir).await {
            Ok(survey) => survey,
            Err(e) if e.is_permission_denied() => {
                trace!(path = %dir, "Permission denied, not analyzing");
                return None;
            }
            Err(e) => {
                warn!(path = %dir, error = %e, "Failed to analyze directory");
                return None;
            }
        };

        if survey.markdown_count == 0 {
            return None;
        }

        let stats = CandidateStats {
            markdown_count: survey.markdown_count,
            subdirectory_count: survey.subdirectories.len(),
            has_readme: survey.has_readme,
            has_docs: survey.has_docs,
            has_guides: survey.has_guides,
            last_modified: survey.newest_markdown.unwrap_or(UNIX_EPOCH),
        };
        let score = scorer::score_at(&stats, now);
        debug!(path = %dir, markdown = survey.markdown_count, score, "Analyzed directory");

        Some(WorkspaceCandidate {
            path: dir.to_owned(),
            name: dir.file_name().unwrap_or(dir.as_str()).to_owned(),
            markdown_count: survey.markdown_count,
            total_files: survey.total_files,
            subdirectories: survey.subdirectories,
            has_readme: survey.has_readme,
            has_docs: survey.has_docs,
            has_guides: survey.has_guides,
            last_modified: survey.newest_markdown.map_or(0, epoch_millis),
            score,
            preview: survey.preview,
        })
    }

    /// Lists `dir` once and tallies its entries, in name order.
    async fn survey(&self, dir: &Utf8Path) -> Result<DirectorySurvey, ScanError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| ScanError::io(dir, e))?;

        let mut listed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScanError::io(dir, e))?
        {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => listed.push((path, file_type, entry)),
                Err(path) => debug!(error = %ScanError::NonUtf8Path(path), "Skipping entry"),
            }
        }
        listed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut survey = DirectorySurvey::default();
        for (path, file_type, entry) in listed {
            let Some(name) = path.file_name() else {
                continue;
            };

            if file_type.is_file() {
                survey.total_files += 1;
                if !is_markdown(&path) {
                    continue;
                }
                survey.markdown_count += 1;
                survey.preview.push_markdown_file(name.to_owned());
                if name.to_lowercase().contains("readme") {
                    survey.has_readme = true;
                }
                let modified = entry
                    .metadata()
                    .await
                    .ok()
                    .and_then(|metadata| metadata.modified().ok());
                if let Some(modified) = modified {
                    survey.newest_markdown = survey.newest_markdown.max(Some(modified));
                }
            } else if file_type.is_dir() && !self.policy.is_excluded(name) {
                let lower = name.to_lowercase();
                survey.has_docs |= lower.contains("doc");
                survey.has_guides |= lower.contains("guide") || lower.contains("tutorial");
                survey.preview.push_directory(name.to_owned());
                survey.subdirectories.insert(name.to_owned());
            }
        }

        Ok(survey)
    }
}

/// Returns `true` if the path has a markdown extension.
#[must_use]
pub fn is_markdown(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|ext| {
        MARKDOWN_EXTENSIONS
            .iter()
            .any(|md| md.eq_ignore_ascii_case(ext))
    })
}
