//! JSON formatter.

use crate::error::Result;
use crate::orphaned::OrphanResult;
use crate::validation::ValidationResult;

/// Serialize a validation result as pretty-printed JSON.
pub fn format_validation(result: &ValidationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Serialize an orphan-analysis result as pretty-printed JSON.
pub fn format_orphans(result: &OrphanResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
