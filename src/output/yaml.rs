//! YAML formatter.

use crate::error::Result;
use crate::orphaned::OrphanResult;
use crate::validation::ValidationResult;

/// Serialize a validation result as YAML.
pub fn format_validation(result: &ValidationResult) -> Result<String> {
    Ok(serde_yaml::to_string(result)?)
}

/// Serialize an orphan-analysis result as YAML.
pub fn format_orphans(result: &OrphanResult) -> Result<String> {
    Ok(serde_yaml::to_string(result)?)
}
