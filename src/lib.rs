//! # snapcheck
//!
//! A command-line tool that inspects an exported Kubernetes manifest tree
//! (`<namespace>/<kind>/<name>.yaml`, with cluster-scoped resources under
//! `_cluster/`) and reports two kinds of drift:
//!
//! - broken cross-resource references: selectors, subjects, backends, and
//!   scale targets that name resources absent from the export;
//! - orphaned resources: workloads without owners, and ConfigMaps, Secrets,
//!   Services, and PersistentVolumeClaims nothing uses.
//!
//! Everything works from the files on disk; no cluster connection is made.
//!
//! ## Usage as a library
//!
//! ```no_run
//! use snapcheck::snapshot::ResourceIndex;
//! use std::path::Path;
//!
//! let index = ResourceIndex::load(Path::new("./export"))?;
//! let validation = snapcheck::validation::validate(&index);
//! let orphans = snapcheck::orphaned::detect(&index);
//! println!(
//!     "{} broken reference(s), {} orphan(s)",
//!     validation.summary.broken_references,
//!     orphans.summary.total_orphaned_resources,
//! );
//! # Ok::<(), snapcheck::error::SnapcheckError>(())
//! ```

pub mod cli;
pub mod error;
pub mod handlers;
pub mod orphaned;
pub mod output;
pub mod snapshot;
pub mod validation;

pub use error::{Result, SnapcheckError};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use cli::Commands;

/// Dispatch a parsed command and return the process exit code.
pub fn run_command(command: Commands) -> Result<i32> {
    match command {
        Commands::Validate { path, output } => handlers::validate::handle_validate(&path, &output),
        Commands::Analyze { path, output } => handlers::analyze::handle_analyze(&path, &output),
    }
}
