//! Handler for the `validate` command.

use crate::error::Result;
use crate::output;
use crate::snapshot::ResourceIndex;
use crate::validation;
use log::info;
use std::path::Path;

/// Load the export tree, validate cross-resource references, and print the
/// result. Returns the process exit code: 0 when no reference is broken,
/// 1 otherwise.
pub fn handle_validate(path: &Path, format: &str) -> Result<i32> {
    let format = output::parse_format(format)?;

    let index = ResourceIndex::load(path)?;
    info!(
        "loaded {} resource(s) from {}",
        index.len(),
        path.display()
    );

    let result = validation::validate(&index);
    print!("{}", output::render_validation(&result, format)?);

    if result.summary.broken_references > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
