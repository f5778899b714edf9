//! Output renderers for validation and orphan-analysis results.

pub mod json;
pub mod table;
pub mod yaml;

use crate::error::{Result, SnapcheckError};
use crate::orphaned::OrphanResult;
use crate::validation::ValidationResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table output.
    #[default]
    Table,
    /// JSON output.
    Json,
    /// YAML output.
    Yaml,
}

impl OutputFormat {
    /// Parse from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Some(Self::Table),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse an `--output` value, turning an unknown name into an error.
pub fn parse_format(s: &str) -> Result<OutputFormat> {
    OutputFormat::parse(s).ok_or_else(|| SnapcheckError::UnknownFormat(s.to_string()))
}

/// Render a validation result in the requested format.
pub fn render_validation(result: &ValidationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table::format_validation(result)),
        OutputFormat::Json => json::format_validation(result),
        OutputFormat::Yaml => yaml::format_validation(result),
    }
}

/// Render an orphan-analysis result in the requested format.
pub fn render_orphans(result: &OrphanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table::format_orphans(result)),
        OutputFormat::Json => json::format_orphans(result),
        OutputFormat::Yaml => yaml::format_orphans(result),
    }
}
