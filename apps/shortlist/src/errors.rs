#![allow(dead_code)]

use thiserror::Error;

/// Application-level error type shared by every module.
/// Remote and storage faults carry a generic user-facing message; the
/// underlying cause goes to the tracing log at the failure site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("At most {limit} feedback dimensions can be selected at once")]
    SelectionLimit { limit: usize },

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Analysis failed. Please try again.")]
    Submission,

    #[error("No analysis results yet — submit CVs before exporting")]
    NothingAnalyzed,

    #[error("No CVs scored at or above the current cutoff")]
    NoMatchesAboveCutoff,

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
