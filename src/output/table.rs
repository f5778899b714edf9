//! Human-readable table formatter.

use crate::orphaned::OrphanResult;
use crate::validation::{Reference, ValidationResult};
use colored::Colorize;

fn reference_line(reference: &Reference) -> String {
    format!(
        "  {}/{} ({}) -> {}/{} ({}) via {}\n",
        reference.source_namespace,
        reference.source_name,
        reference.source_type,
        reference.target_namespace,
        reference.target_name,
        reference.target_type,
        reference.field,
    )
}

/// Format a validation result as readable text. Valid references are
/// summarized by count only; broken and warning references are listed.
pub fn format_validation(result: &ValidationResult) -> String {
    let mut output = String::new();

    if !result.broken_references.is_empty() {
        output.push_str(&format!(
            "{}\n",
            format!("Broken references ({}):", result.broken_references.len()).red()
        ));
        for reference in &result.broken_references {
            output.push_str(&reference_line(reference));
        }
        output.push('\n');
    }

    if !result.warning_references.is_empty() {
        output.push_str(&format!(
            "{}\n",
            format!(
                "Unverifiable references ({}):",
                result.warning_references.len()
            )
            .yellow()
        ));
        for reference in &result.warning_references {
            output.push_str(&reference_line(reference));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Checked {} reference(s): {} valid, {} broken, {} warning.\n",
        result.summary.total_references,
        result.summary.valid_references,
        result.summary.broken_references,
        result.summary.warning_references,
    ));

    if result.summary.broken_references == 0 {
        output.push_str(&format!("{}\n", "No broken references found.".green()));
    }

    output
}

/// Format an orphan-analysis result as readable text.
pub fn format_orphans(result: &OrphanResult) -> String {
    let mut output = String::new();

    if result.orphaned_resources.is_empty() {
        output.push_str(&format!("{}\n", "No orphaned resources found.".green()));
        return output;
    }

    output.push_str(&format!(
        "{}\n",
        format!(
            "Orphaned resources ({}):",
            result.summary.total_orphaned_resources
        )
        .yellow()
    ));
    for finding in &result.orphaned_resources {
        output.push_str(&format!(
            "  {}/{} ({}): {}\n",
            finding.namespace, finding.name, finding.resource_type, finding.details,
        ));
        output.push_str(&format!("    file: {}\n", finding.file));
    }

    output.push('\n');
    output.push_str("By type:\n");
    for (resource_type, count) in &result.summary.by_type {
        output.push_str(&format!("  {}: {}\n", resource_type, count));
    }

    output
}
