//! Core types, configuration, and errors for docscout.
//!
//! This crate provides the foundational types shared by the scanner engine
//! and the command-line front end:
//!
//! - Configuration structures ([`ScanOptions`], [`CacheConfig`], [`RegistryConfig`])
//! - Error types for configuration loading and validation ([`ConfigError`])
//! - Domain types ([`ScanId`], [`SessionStatus`], [`ScanProgress`],
//!   [`ScanSnapshot`], [`WorkspaceCandidate`])

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheConfig, Config, RegistryConfig, ScanOptions};
pub use error::ConfigError;
pub use types::{
    CachedRecommendations, ScanId, ScanProgress, ScanSnapshot, SessionStatus, WorkspaceCandidate,
    WorkspacePreview,
};
