//! Error taxonomy for the grading harness.
//!
//! Only faults that indicate a malformed test suite live here. A candidate
//! that panics or runs out of time is graded, not raised: see
//! [`Verdict::CandidateCrashed`](crate::Verdict::CandidateCrashed).

use thiserror::Error;

/// Hard errors that abort a driver run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// Random generator asked for an empty range
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },

    /// CLI dispatcher has no entry point registered under this name
    #[error("Unknown program: {0}")]
    UnknownProgram(String),

    /// The trusted reference implementation faulted
    #[error("Reference fault in case #{case} {label}({args}): {reason}")]
    ReferenceFault {
        case: usize,
        label: String,
        args: String,
        reason: String,
    },

    /// Writing or serializing the report failed
    #[error("Report error: {0}")]
    Report(String),

    /// Another hard error, tagged with the case that raised it
    #[error("Case #{case} {label}({args}): {source}")]
    InCase {
        case: usize,
        label: String,
        args: String,
        source: Box<HarnessError>,
    },
}

impl HarnessError {
    /// Returns the error code string for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HarnessError::InvalidRange { .. } => "INVALID_RANGE",
            HarnessError::UnknownProgram(_) => "UNKNOWN_PROGRAM",
            HarnessError::ReferenceFault { .. } => "REFERENCE_FAULT",
            HarnessError::Report(_) => "REPORT_ERROR",
            HarnessError::InCase { source, .. } => source.error_code(),
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Report(err.to_string())
    }
}

/// Result type alias using HarnessError
pub type HarnessResult<T> = Result<T, HarnessError>;
