//! Workspace candidate types.
//!
//! A [`WorkspaceCandidate`] is one analyzed directory that contained markdown
//! files and received a recommendation score.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum number of markdown file names kept in a preview.
pub const MAX_MARKDOWN_SAMPLES: usize = 5;

/// Maximum number of child directory names kept in a preview.
pub const MAX_DIRECTORY_SAMPLES: usize = 8;

/// Bounded name samples shown alongside a candidate.
///
/// Display-only; the samples are the first names encountered while listing
/// the directory, not a ranked selection.
///
/// # Examples
///
/// ```
/// use ds_core::WorkspacePreview;
///
/// let mut preview = WorkspacePreview::default();
/// for i in 0..10 {
///     preview.push_markdown_file(format!("note-{i}.md"));
/// }
/// assert_eq!(preview.markdown_files.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePreview {
    /// Up to [`MAX_MARKDOWN_SAMPLES`] markdown file names.
    pub markdown_files: SmallVec<[String; MAX_MARKDOWN_SAMPLES]>,
    /// Up to [`MAX_DIRECTORY_SAMPLES`] child directory names.
    pub directories: SmallVec<[String; MAX_DIRECTORY_SAMPLES]>,
}

impl WorkspacePreview {
    /// Records a markdown file name if the sample isn't full yet.
    pub fn push_markdown_file(&mut self, name: String) {
        if self.markdown_files.len() < MAX_MARKDOWN_SAMPLES {
            self.markdown_files.push(name);
        }
    }

    /// Records a child directory name if the sample isn't full yet.
    pub fn push_directory(&mut self, name: String) {
        if self.directories.len() < MAX_DIRECTORY_SAMPLES {
            self.directories.push(name);
        }
    }
}

/// A directory recommended as a documentation workspace.
///
/// Created once per analyzed directory and never mutated afterwards. A
/// directory without markdown files never becomes a candidate.
///
/// # Examples
///
/// ```
/// use ds_core::{WorkspaceCandidate, WorkspacePreview};
/// use camino::Utf8PathBuf;
///
/// let candidate = WorkspaceCandidate {
///     path: Utf8PathBuf::from("/home/me/notes"),
///     name: "notes".to_owned(),
///     markdown_count: 12,
///     total_files: 14,
///     subdirectories: ["guides".to_owned()].into_iter().collect(),
///     has_readme: true,
///     has_docs: false,
///     has_guides: true,
///     last_modified: 1_700_000_000_000,
///     score: 0.71,
///     preview: WorkspacePreview::default(),
/// };
///
/// assert_eq!(candidate.subdirectory_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceCandidate {
    /// Absolute path of the directory.
    pub path: Utf8PathBuf,
    /// Final path component, used for display.
    pub name: String,
    /// Markdown files directly inside the directory.
    pub markdown_count: usize,
    /// All regular files directly inside the directory.
    pub total_files: usize,
    /// Immediate child directory names, exclusions already applied.
    pub subdirectories: BTreeSet<String>,
    /// A markdown file name contains "readme".
    pub has_readme: bool,
    /// A child directory name contains "doc".
    pub has_docs: bool,
    /// A child directory name contains "guide" or "tutorial".
    pub has_guides: bool,
    /// Newest markdown modification time, Unix epoch milliseconds (0 if unknown).
    pub last_modified: u64,
    /// Recommendation score in `[0, 1]`.
    pub score: f64,
    /// Display samples.
    pub preview: WorkspacePreview,
}

impl WorkspaceCandidate {
    /// Returns the number of (non-excluded) immediate subdirectories.
    #[inline]
    #[must_use]
    pub fn subdirectory_count(&self) -> usize {
        self.subdirectories.len()
    }

    /// Returns [`last_modified`](Self::last_modified) as a [`SystemTime`].
    #[must_use]
    pub fn last_modified_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.last_modified)
    }
}

/// Recommendations read from the result cache without scanning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CachedRecommendations {
    /// Top cached candidates across all fresh entries, best first.
    pub recommendations: Vec<WorkspaceCandidate>,
    /// Number of entries in `recommendations`.
    pub count: usize,
}

impl From<Vec<WorkspaceCandidate>> for CachedRecommendations {
    fn from(recommendations: Vec<WorkspaceCandidate>) -> Self {
        Self {
            count: recommendations.len(),
            recommendations,
        }
    }
}
