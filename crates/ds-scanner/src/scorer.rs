//! Recommendation scoring.
//!
//! A directory's score is a weighted sum of four signals, each normalized to
//! `[0, 1]` before weighting:
//!
//! | Signal | Weight | Value |
//! |---|---|---|
//! | file count | 0.40 | `min(markdown_count / 20, 1)` |
//! | structure | 0.25 | `1` if `0 < subdirectories < 20`, else `0` |
//! | doc patterns | 0.20 | `(readme + docs + guides) / 3` |
//! | recency | 0.15 | `max(0, (30 - days_since_modified) / 30)` |
//!
//! # Examples
//!
//! ```
//! use std::time::SystemTime;
//! use ds_scanner::scorer::{score_at, CandidateStats};
//!
//! let now = SystemTime::now();
//! let stats = CandidateStats {
//!     markdown_count: 20,
//!     subdirectory_count: 5,
//!     has_readme: true,
//!     has_docs: true,
//!     has_guides: false,
//!     last_modified: now,
//! };
//! assert!((score_at(&stats, now) - 0.9333).abs() < 1e-3);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Weight of the markdown file count signal.
pub const FILE_COUNT_WEIGHT: f64 = 0.40;
/// Weight of the directory structure signal.
pub const STRUCTURE_WEIGHT: f64 = 0.25;
/// Weight of the documentation name pattern signal.
pub const PATTERN_WEIGHT: f64 = 0.20;
/// Weight of the recency signal.
pub const RECENCY_WEIGHT: f64 = 0.15;

/// Markdown count at which the file count signal saturates.
pub const FILE_COUNT_SATURATION: f64 = 20.0;
/// Subdirectory count at which the structure signal drops to zero.
pub const MAX_STRUCTURED_SUBDIRECTORIES: usize = 20;
/// Days after which the recency signal reaches zero.
pub const RECENCY_WINDOW_DAYS: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// The inputs the scorer looks at for one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateStats {
    /// Markdown files directly inside the directory.
    pub markdown_count: usize,
    /// Non-excluded immediate subdirectories.
    pub subdirectory_count: usize,
    /// A markdown file name contains "readme".
    pub has_readme: bool,
    /// A subdirectory name contains "doc".
    pub has_docs: bool,
    /// A subdirectory name contains "guide" or "tutorial".
    pub has_guides: bool,
    /// Newest markdown modification time.
    pub last_modified: SystemTime,
}

impl Default for CandidateStats {
    fn default() -> Self {
        Self {
            markdown_count: 0,
            subdirectory_count: 0,
            has_readme: false,
            has_docs: false,
            has_guides: false,
            last_modified: UNIX_EPOCH,
        }
    }
}

/// The four normalized signals behind a score, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Markdown file count signal.
    pub file_count: f64,
    /// Directory structure signal.
    pub structure: f64,
    /// Documentation pattern signal.
    pub patterns: f64,
    /// Recency signal.
    pub recency: f64,
}

impl ScoreBreakdown {
    /// Returns the weighted sum, clamped to `[0, 1]`.
    #[must_use]
    pub fn total(&self) -> f64 {
        let sum = self.file_count * FILE_COUNT_WEIGHT
            + self.structure * STRUCTURE_WEIGHT
            + self.patterns * PATTERN_WEIGHT
            + self.recency * RECENCY_WEIGHT;
        sum.clamp(0.0, 1.0)
    }
}

/// Scores `stats` against the current wall clock.
#[must_use]
pub fn score(stats: &CandidateStats) -> f64 {
    score_at(stats, SystemTime::now())
}

/// Scores `stats` as of `now`.
#[must_use]
pub fn score_at(stats: &CandidateStats, now: SystemTime) -> f64 {
    breakdown_at(stats, now).total()
}

/// Computes the individual signals for `stats` as of `now`.
///
/// A modification time later than `now` (clock skew) counts as "just
/// modified".
#[must_use]
#[allow(clippy::cast_precision_loss)] // counts are far below f64 precision limits
pub fn breakdown_at(stats: &CandidateStats, now: SystemTime) -> ScoreBreakdown {
    let file_count = (stats.markdown_count as f64 / FILE_COUNT_SATURATION).min(1.0);

    let structure = if (1..MAX_STRUCTURED_SUBDIRECTORIES).contains(&stats.subdirectory_count) {
        1.0
    } else {
        0.0
    };

    let hits = [stats.has_readme, stats.has_docs, stats.has_guides]
        .into_iter()
        .filter(|hit| *hit)
        .count();
    let patterns = hits as f64 / 3.0;

    let days = now
        .duration_since(stats.last_modified)
        .map_or(0.0, |age| age.as_secs_f64() / SECONDS_PER_DAY);
    let recency = ((RECENCY_WINDOW_DAYS - days) / RECENCY_WINDOW_DAYS).clamp(0.0, 1.0);

    ScoreBreakdown {
        file_count,
        structure,
        patterns,
        recency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DAY: Duration = Duration::from_secs(86_400);

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_reference_score() {
        let stats = CandidateStats {
            markdown_count: 20,
            subdirectory_count: 5,
            has_readme: true,
            has_docs: true,
            has_guides: false,
            last_modified: now(),
        };
        let expected = 0.4 + 0.25 + (2.0 / 3.0) * 0.2 + 0.15;
        assert!((score_at(&stats, now()) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats_score_zero() {
        assert!(score_at(&CandidateStats::default(), now()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_count_saturates() {
        let stats = |n| CandidateStats {
            markdown_count: n,
            ..Default::default()
        };
        assert!((breakdown_at(&stats(10), now()).file_count - 0.5).abs() < 1e-9);
        assert!((breakdown_at(&stats(20), now()).file_count - 1.0).abs() < 1e-9);
        assert!((breakdown_at(&stats(500), now()).file_count - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_structure_window() {
        let stats = |n| CandidateStats {
            subdirectory_count: n,
            ..Default::default()
        };
        assert!(breakdown_at(&stats(0), now()).structure.abs() < f64::EPSILON);
        assert!((breakdown_at(&stats(1), now()).structure - 1.0).abs() < f64::EPSILON);
        assert!((breakdown_at(&stats(19), now()).structure - 1.0).abs() < f64::EPSILON);
        assert!(breakdown_at(&stats(20), now()).structure.abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_decay() {
        let stats = |age: Duration| CandidateStats {
            last_modified: now() - age,
            ..Default::default()
        };
        assert!((breakdown_at(&stats(Duration::ZERO), now()).recency - 1.0).abs() < 1e-9);
        assert!((breakdown_at(&stats(DAY * 15), now()).recency - 0.5).abs() < 1e-9);
        assert!(breakdown_at(&stats(DAY * 30), now()).recency.abs() < 1e-9);
        assert!(breakdown_at(&stats(DAY * 365), now()).recency.abs() < f64::EPSILON);
    }

    #[test]
    fn test_future_timestamp_counts_as_now() {
        let stats = CandidateStats {
            markdown_count: 20,
            subdirectory_count: 3,
            has_readme: true,
            has_docs: true,
            has_guides: true,
            last_modified: now() + DAY * 10,
        };
        let breakdown = breakdown_at(&stats, now());
        assert!((breakdown.recency - 1.0).abs() < f64::EPSILON);
        assert!((breakdown.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_table() {
        let cases = [
            (20, 5, (true, true, false), 0),
            (10, 0, (false, false, false), 6),
            (3, 25, (false, false, true), 60),
        ];
        let table: Vec<String> = cases
            .into_iter()
            .map(|(markdown_count, subdirectory_count, (readme, docs, guides), age_days)| {
                let stats = CandidateStats {
                    markdown_count,
                    subdirectory_count,
                    has_readme: readme,
                    has_docs: docs,
                    has_guides: guides,
                    last_modified: now() - DAY * age_days,
                };
                let b = breakdown_at(&stats, now());
                format!(
                    "{markdown_count:>2} md {subdirectory_count:>2} sub | {:.3} {:.3} {:.3} {:.3} | {:.3}",
                    b.file_count,
                    b.structure,
                    b.patterns,
                    b.recency,
                    b.total()
                )
            })
            .collect();

        insta::assert_snapshot!(table.join("\n"), @r"
        20 md  5 sub | 1.000 1.000 0.667 1.000 | 0.933
        10 md  0 sub | 0.500 0.000 0.000 0.800 | 0.320
         3 md 25 sub | 0.150 0.000 0.333 0.000 | 0.127
        ");
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        for markdown_count in [0, 1, 7, 20, 1_000] {
            for subdirectory_count in [0, 1, 19, 20, 300] {
                for age_days in [0_u32, 3, 29, 30, 10_000] {
                    for flags in 0..8_u8 {
                        let stats = CandidateStats {
                            markdown_count,
                            subdirectory_count,
                            has_readme: flags & 1 != 0,
                            has_docs: flags & 2 != 0,
                            has_guides: flags & 4 != 0,
                            last_modified: now() - DAY * age_days,
                        };
                        let s = score_at(&stats, now());
                        assert!((0.0..=1.0).contains(&s), "{stats:?} -> {s}");
                    }
                }
            }
        }
    }
}
