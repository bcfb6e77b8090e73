//! Rating store ingestion errors.

use super::error_code::{self, ConcordErrorCode};

/// Errors that can occur while building a rating store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate assignment id: {assignment}")]
    DuplicateAssignment { assignment: String },

    #[error("rating references unknown assignment: {assignment}")]
    UnknownAssignment { assignment: String },

    #[error("assignment {assignment} has no ratings")]
    EmptyAssignment { assignment: String },

    #[error("non-finite vote {vote} in assignment {assignment} for ({algorithm}, {file}, {rating_name})")]
    NonFiniteVote {
        assignment: String,
        algorithm: String,
        file: String,
        rating_name: String,
        vote: f64,
    },

    #[error(
        "conflicting votes from worker {worker} for ({algorithm}, {file}, {rating_name}) \
         submitted at the same time"
    )]
    AmbiguousDuplicate {
        worker: String,
        algorithm: String,
        file: String,
        rating_name: String,
    },

    #[error("store has no ratings")]
    Empty,

    #[error("corrupt store snapshot: {message}")]
    CorruptSnapshot { message: String },
}

impl ConcordErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AmbiguousDuplicate { .. } => error_code::AMBIGUOUS_DUPLICATE,
            _ => error_code::STORE_ERROR,
        }
    }
}
