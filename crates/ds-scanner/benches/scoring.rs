//! Scoring and exclusion benchmarks.
//!
//! Run with:
//!   cargo bench -p ds-scanner

use std::hint::black_box;
use std::time::{Duration, SystemTime};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ds_scanner::ExclusionPolicy;
use ds_scanner::exclusion::should_exclude;
use ds_scanner::scorer::{CandidateStats, score_at};

const NAMES: &[&str] = &[
    "docs",
    "node_modules",
    "My-Target-Folder",
    ".github",
    ".obsidian",
    "guides",
    "project-notes",
    "__pycache__",
    "handbook",
    "release-build-artifacts",
];

fn bench_scorer(c: &mut Criterion) {
    let now = SystemTime::now();
    let stats: Vec<CandidateStats> = (0..256_usize)
        .map(|i| CandidateStats {
            markdown_count: i % 40,
            subdirectory_count: i % 25,
            has_readme: i % 2 == 0,
            has_docs: i % 3 == 0,
            has_guides: i % 5 == 0,
            last_modified: now - Duration::from_secs((i as u64) * 3_600),
        })
        .collect();

    c.bench_function("score_at/256", |b| {
        b.iter(|| {
            stats
                .iter()
                .map(|s| score_at(black_box(s), now))
                .sum::<f64>()
        });
    });
}

fn bench_exclusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusion");

    for extra in [0_usize, 4, 16] {
        let patterns: Vec<String> = (0..extra).map(|i| format!("pattern-{i}")).collect();
        let policy = ExclusionPolicy::new(&patterns);

        group.bench_with_input(BenchmarkId::new("policy", extra), &policy, |b, policy| {
            b.iter(|| NAMES.iter().filter(|n| policy.is_excluded(black_box(n))).count());
        });
        group.bench_with_input(
            BenchmarkId::new("should_exclude", extra),
            &patterns,
            |b, patterns| {
                b.iter(|| {
                    NAMES
                        .iter()
                        .filter(|n| should_exclude(black_box(n), patterns))
                        .count()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scorer, bench_exclusion);
criterion_main!(benches);
