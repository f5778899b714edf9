//! Handler for the `analyze` command.

use crate::error::Result;
use crate::orphaned;
use crate::output;
use crate::snapshot::ResourceIndex;
use log::info;
use std::path::Path;

/// Load the export tree, run orphan detection, and print the result.
/// Findings are advisory, so the exit code is 0 whenever the run completes.
pub fn handle_analyze(path: &Path, format: &str) -> Result<i32> {
    let format = output::parse_format(format)?;

    let index = ResourceIndex::load(path)?;
    info!(
        "loaded {} resource(s) from {}",
        index.len(),
        path.display()
    );

    let result = orphaned::detect(&index);
    print!("{}", output::render_orphans(&result, format)?);

    Ok(0)
}
