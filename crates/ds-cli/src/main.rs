//! CLI entry point for docscout.
//!
//! This binary finds directories that look like documentation workspaces
//! (folders rich in markdown) and ranks them.
//!
//! # Usage
//!
//! ```bash
//! docscout [OPTIONS] <COMMAND>
//!
//! # Scan the home directory defaults
//! docscout scan
//!
//! # Scan specific roots, shallower, as JSON
//! docscout scan ~/Projects ~/Notes --max-depth 2 --format json
//!
//! # Inspect a single directory
//! docscout analyze ~/Notes/handbook
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ds_core::{
    CachedRecommendations, Config, ScanId, ScanOptions, ScanSnapshot, SessionStatus,
    WorkspaceCandidate,
};
use ds_scanner::{ExclusionPolicy, ScanRegistry, WorkspaceAnalyzer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Find and rank documentation workspaces on this machine.
///
/// Walks directories looking for folders rich in markdown files and scores
/// them by size, structure, naming and recency.
#[derive(Parser)]
#[command(name = "docscout", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file; command-line flags override its values.
    #[arg(short, long, global = true, env = "DOCSCOUT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan directories and print ranked recommendations.
    Scan(ScanArgs),

    /// Analyze a single directory without recursing.
    Analyze {
        /// Directory to analyze.
        dir: Utf8PathBuf,

        /// Extra exclusion pattern for subdirectory names (repeatable).
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Flags of the `scan` command.
#[derive(Args)]
struct ScanArgs {
    /// Root directories to scan (defaults to the home directory and common
    /// workspace folders beneath it).
    paths: Vec<Utf8PathBuf>,

    /// Maximum depth below each root.
    #[arg(long, env = "DOCSCOUT_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// Maximum number of directories analyzed at once.
    #[arg(long, env = "DOCSCOUT_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Minimum markdown files for a directory to be recommended.
    #[arg(long = "min-markdown")]
    min_markdown: Option<usize>,

    /// Extra exclusion pattern (repeatable).
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Overall scan timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Progress polling interval in milliseconds.
    #[arg(long, default_value_t = 250)]
    poll_ms: u64,
}

/// Output format.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration file, or the defaults when none was given.
fn load_config(path: Option<&Utf8Path>) -> color_eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let config = Config::from_file(path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config {path}: {e}"))?;
    debug!(path = %path, "Loaded configuration");
    Ok(config)
}

/// Applies `scan` flags on top of the configured scan options.
fn scan_options(base: &ScanOptions, args: &ScanArgs) -> ScanOptions {
    let mut options = base.clone();
    if !args.paths.is_empty() {
        options.scan_paths.clone_from(&args.paths);
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(max_concurrent) = args.max_concurrent {
        options.max_concurrent = max_concurrent;
    }
    if let Some(min) = args.min_markdown {
        options.min_markdown_files = min;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        options.scan_timeout = timeout_ms;
    }
    options.exclude_patterns.extend(args.exclude.iter().cloned());
    options
}

fn validate_dir(path: &Utf8Path) -> color_eyre::Result<()> {
    if !path.exists() {
        return Err(color_eyre::eyre::eyre!("Path does not exist: {path}"));
    }
    if !path.is_dir() {
        return Err(color_eyre::eyre::eyre!("Path is not a directory: {path}"));
    }
    Ok(())
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a scan to completion, polling progress and cancelling on Ctrl-C.
async fn run_scan(config: &Config, args: &ScanArgs) -> color_eyre::Result<()> {
    let options = scan_options(&config.scan, args);
    for path in &options.scan_paths {
        validate_dir(path)?;
    }

    let registry = Arc::new(ScanRegistry::from_config(config));
    let shutdown = CancellationToken::new();
    let cleanup = registry.spawn_cleanup_task(shutdown.clone());

    let id = registry.start_scan(options)?;
    info!(id = %id, every_ms = args.poll_ms, "Waiting for scan");

    let every = Duration::from_millis(args.poll_ms.max(1));
    let snapshot = poll_until_finished(&registry, &id, every).await;

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        warn!(error = %e, "Cleanup task ended abnormally");
    }

    let snapshot = snapshot?;
    let cached = registry.get_cached_recommendations();

    match args.format {
        OutputFormat::Text => print_scan_text(&snapshot, &cached)?,
        OutputFormat::Json => print_scan_json(&snapshot, &cached)?,
    }

    if snapshot.status == SessionStatus::Error {
        let message = snapshot.error.unwrap_or_default();
        return Err(color_eyre::eyre::eyre!("Scan failed: {message}"));
    }
    Ok(())
}

async fn poll_until_finished(
    registry: &ScanRegistry,
    id: &ScanId,
    every: Duration,
) -> color_eyre::Result<ScanSnapshot> {
    let mut ticker = tokio::time::interval(every);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                info!(id = %id, "Interrupted, cancelling scan");
                registry.cancel(id);
            }
            _ = ticker.tick() => {}
        }

        let Some(snapshot) = registry.get_progress(id) else {
            return Err(color_eyre::eyre::eyre!("Scan {id} is no longer tracked"));
        };
        if snapshot.is_finished() {
            return Ok(snapshot);
        }
        let progress = &snapshot.progress;
        debug!(
            scanned = progress.scanned_directories,
            total = progress.total_directories,
            found = progress.found_workspaces,
            current = ?progress.current_directory,
            "Scanning"
        );
    }
}

/// Analyzes one directory and prints the candidate.
async fn run_analyze(
    dir: &Utf8Path,
    exclude: &[String],
    format: OutputFormat,
) -> color_eyre::Result<()> {
    validate_dir(dir)?;
    let analyzer = WorkspaceAnalyzer::with_policy(ExclusionPolicy::new(exclude));
    let candidate = analyzer.analyze(dir).await;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match (format, candidate) {
        (OutputFormat::Json, candidate) => {
            writeln!(handle, "{}", serde_json::to_string_pretty(&candidate)?)?;
        }
        (OutputFormat::Text, Some(candidate)) => write_candidate_detail(&mut handle, &candidate)?,
        (OutputFormat::Text, None) => {
            writeln!(handle, "{dir}: not a documentation workspace (no markdown files)")?;
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_scan_text(
    snapshot: &ScanSnapshot,
    cached: &CachedRecommendations,
) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let progress = &snapshot.progress;

    writeln!(handle)?;
    writeln!(handle, "Scan {} ({})", snapshot.id, snapshot.status.label())?;
    writeln!(handle, "==============================")?;
    writeln!(
        handle,
        "Directories scanned: {} / {}",
        progress.scanned_directories, progress.total_directories
    )?;
    writeln!(handle, "Workspaces found:    {}", progress.found_workspaces)?;
    writeln!(handle, "Duration:            {} ms", snapshot.duration_ms)?;
    if let Some(error) = &snapshot.error {
        writeln!(handle, "Error:               {error}")?;
    }

    if !snapshot.recommendations.is_empty() {
        writeln!(handle)?;
        writeln!(handle, "Recommendations ({}):", snapshot.recommendations.len())?;
        write_ranked(&mut handle, &snapshot.recommendations)?;
    }

    if cached.count > 0 {
        writeln!(handle)?;
        writeln!(handle, "Cached recommendations ({}):", cached.count)?;
        write_ranked(&mut handle, &cached.recommendations)?;
    }
    Ok(())
}

fn print_scan_json(
    snapshot: &ScanSnapshot,
    cached: &CachedRecommendations,
) -> color_eyre::Result<()> {
    #[derive(serde::Serialize)]
    struct Report<'a> {
        scan: &'a ScanSnapshot,
        cached: &'a CachedRecommendations,
    }

    let report = Report {
        scan: snapshot,
        cached,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

fn write_ranked(out: &mut impl Write, candidates: &[WorkspaceCandidate]) -> std::io::Result<()> {
    for (rank, candidate) in candidates.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:.3}  {:>4} md  {}{}",
            rank + 1,
            candidate.score,
            candidate.markdown_count,
            candidate.path,
            flags(candidate)
        )?;
    }
    Ok(())
}

fn write_candidate_detail(
    out: &mut impl Write,
    candidate: &WorkspaceCandidate,
) -> std::io::Result<()> {
    writeln!(out, "{} ({})", candidate.name, candidate.path)?;
    writeln!(out, "  Score:          {:.3}", candidate.score)?;
    writeln!(out, "  Markdown files: {}", candidate.markdown_count)?;
    writeln!(out, "  Total files:    {}", candidate.total_files)?;
    writeln!(out, "  Subdirectories: {}", candidate.subdirectory_count())?;
    writeln!(out, "  Signals:       {}", flags(candidate))?;
    if !candidate.preview.markdown_files.is_empty() {
        writeln!(out, "  Markdown:       {}", candidate.preview.markdown_files.join(", "))?;
    }
    if !candidate.preview.directories.is_empty() {
        writeln!(out, "  Directories:    {}", candidate.preview.directories.join(", "))?;
    }
    Ok(())
}

fn flags(candidate: &WorkspaceCandidate) -> String {
    let mut out = String::new();
    for (set, label) in [
        (candidate.has_readme, " [readme]"),
        (candidate.has_docs, " [docs]"),
        (candidate.has_guides, " [guides]"),
    ] {
        if set {
            out.push_str(label);
        }
    }
    out
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let config = load_config(cli.config.as_deref())?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Scan(args) => run_scan(&config, args).await,
        Commands::Analyze {
            dir,
            exclude,
            format,
        } => run_analyze(dir, exclude, *format).await,
    }
}
