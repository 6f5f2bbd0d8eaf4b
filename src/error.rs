use std::path::PathBuf;
use thiserror::Error;

/// Conditions raised while reading summaries or reference data.
///
/// None of these abort a run: a missing directory yields no data, a bad
/// table is skipped, and a missing reference file behaves as an empty lookup.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input directory not found: {0:?}")]
    MissingInputDirectory(PathBuf),

    #[error("failed to process {path:?}: {reason}")]
    MalformedInputFile { path: PathBuf, reason: String },

    #[error("reference file {path:?} unavailable: {reason}")]
    MissingReferenceFile { path: PathBuf, reason: String },
}

impl InputError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedInputFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing_reference(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MissingReferenceFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
