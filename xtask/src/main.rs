//! Build automation tasks for the docscout workspace.
//!
//! Run with: `cargo run -p xtask -- <command>`
//!
//! # Available Commands
//!
//! - `check`: Run all checks (fmt, clippy, test)
//! - `fmt`: Format code with rustfmt
//! - `lint`: Run clippy with all targets
//! - `test`: Run all tests
//! - `build`: Build release binary
//! - `clean`: Clean build artifacts
//! - `doc`: Build API documentation

// xtask is a build tool - printing to stderr is expected
#![allow(clippy::print_stderr)]

use std::process::Command;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};

/// Build automation for docscout
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for docscout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks (fmt --check, clippy, test)
    Check,
    /// Format code with rustfmt
    Fmt {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy lints
    Lint {
        /// Automatically fix lint warnings
        #[arg(long)]
        fix: bool,
    },
    /// Run all tests
    Test {
        /// Run tests with release optimizations
        #[arg(long)]
        release: bool,
    },
    /// Build release binary
    Build {
        /// Build in debug mode
        #[arg(long)]
        debug: bool,
    },
    /// Clean build artifacts
    Clean,
    /// Generate documentation
    Doc {
        /// Open in browser after building
        #[arg(long)]
        open: bool,
    },
}

/// Returns the workspace root (the parent of this crate's manifest dir).
fn workspace_root() -> Result<Utf8PathBuf> {
    let manifest_dir = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Utf8Path::to_owned)
        .context("xtask manifest has no parent directory")
}

/// Runs `cargo` with `args` in the workspace root.
fn cargo(root: &Utf8Path, args: &[&str]) -> Result<()> {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned());
    eprintln!("$ cargo {}", args.join(" "));

    let status = Command::new(&cargo)
        .args(args)
        .current_dir(root)
        .status()
        .with_context(|| format!("failed to run {cargo}"))?;

    if !status.success() {
        bail!("cargo {} failed with {status}", args.join(" "));
    }
    Ok(())
}

fn fmt(root: &Utf8Path, check: bool) -> Result<()> {
    if check {
        cargo(root, &["fmt", "--all", "--", "--check"])
    } else {
        cargo(root, &["fmt", "--all"])
    }
}

fn lint(root: &Utf8Path, fix: bool) -> Result<()> {
    let mut args = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty"]);
    }
    args.extend(["--", "-D", "warnings"]);
    cargo(root, &args)
}

fn test(root: &Utf8Path, release: bool) -> Result<()> {
    let mut args = vec!["test", "--workspace"];
    if release {
        args.push("--release");
    }
    cargo(root, &args)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace_root()?;

    match cli.command {
        Commands::Check => {
            fmt(&root, true)?;
            lint(&root, false)?;
            test(&root, false)?;
        }
        Commands::Fmt { check } => fmt(&root, check)?,
        Commands::Lint { fix } => lint(&root, fix)?,
        Commands::Test { release } => test(&root, release)?,
        Commands::Build { debug } => {
            let mut args = vec!["build", "--package", "ds-cli"];
            if !debug {
                args.push("--release");
            }
            cargo(&root, &args)?;
        }
        Commands::Clean => cargo(&root, &["clean"])?,
        Commands::Doc { open } => {
            let mut args = vec!["doc", "--workspace", "--no-deps"];
            if open {
                args.push("--open");
            }
            cargo(&root, &args)?;
        }
    }

    Ok(())
}
