//! Domain types for docscout.
//!
//! # Module Organization
//!
//! - [`candidate`] - Scored workspace candidates and their previews
//! - [`session`] - Scan identifiers, progress counters, and snapshots
//! - [`status`] - Scan session lifecycle states
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use ds_core::{ScanId, SessionStatus, WorkspaceCandidate};
//! ```

pub mod candidate;
pub mod session;
mod status;

pub use candidate::{CachedRecommendations, WorkspaceCandidate, WorkspacePreview};
pub use session::{ScanId, ScanProgress, ScanSnapshot};
pub use status::SessionStatus;
