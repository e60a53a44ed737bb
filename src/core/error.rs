use thiserror::Error;

use super::numeric::NonNumericField;
use super::types::Role;

/// Errors that can occur while ingesting, classifying or exporting CFDIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    /// A single XML entry is not well-formed. Recovered per entry by the
    /// archive extractor; never aborts a batch.
    #[error("malformed CFDI document '{source_name}': {reason}")]
    MalformedDocument { source_name: String, reason: String },

    /// The uploaded bundle itself could not be opened.
    #[error("archive error: {0}")]
    Archive(String),

    /// One or more numeric fields need an operator-supplied value.
    #[error("{} numeric value(s) require correction: {}", .0.len(), summarize(.0))]
    NonNumeric(Vec<NonNumericField>),

    /// A batch contains a record whose counterpart tax ID is not the operator's.
    #[error("batch rejected for {role}: '{source_name}' carries RFC '{tax_id}'")]
    BatchRoleMismatch {
        role: Role,
        source_name: String,
        tax_id: String,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// CSV or workbook generation failed.
    #[error("export error: {0}")]
    Export(String),

    /// A saved workbook could not be read back.
    #[error("import error: {0}")]
    Import(String),
}

fn summarize(issues: &[NonNumericField]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// One entry of an archive that was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Archive-relative entry name.
    pub entry_name: String,
    /// Human-readable reason (parse or read error).
    pub reason: String,
}

impl std::fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.entry_name, self.reason)
    }
}
