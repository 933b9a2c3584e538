use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, scoring or exporting channel tables.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The source table could not be opened or read.
    #[error("failed to read channel data from {}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The source table was readable but its content is malformed.
    #[error("invalid channel data: {reason}")]
    InvalidInput { reason: String },
    /// A criterion, weight or filter references a column absent from the table.
    #[error("column `{column}` is not a numeric column of the table")]
    MissingColumn { column: String },
    /// Weights summing to zero leave the score undefined.
    #[error("criterion weights sum to zero")]
    ZeroWeightSum,
    /// A weight is negative or not finite.
    #[error("weight {weight} for `{criterion}` must be a non-negative finite number")]
    InvalidWeight { criterion: String, weight: f64 },
    /// More positional weights were supplied than criteria exist.
    #[error("{weights} weights supplied for {criteria} criteria")]
    WeightCountMismatch { weights: usize, criteria: usize },
    /// Writing or re-reading an export failed.
    #[error("failed to process exported table")]
    Export(#[from] csv::Error),
}

impl ScoreError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
