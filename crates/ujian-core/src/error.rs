//! Error types for the collaborators around the evaluation engine.
//!
//! The engine itself is total and has no error type; these cover loading
//! catalogs and submissions, and applying manual review scores.

use thiserror::Error;

/// Errors from a [`CatalogProvider`](crate::traits::CatalogProvider) or
/// [`AnswerStore`](crate::traits::AnswerStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested package or submission does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The stored data could not be parsed.
    #[error("malformed {what}: {message}")]
    Malformed { what: String, message: String },

    /// An I/O failure while reading the store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if the entry simply does not exist.
    pub fn is_missing(&self) -> bool {
        match self {
            StoreError::NotFound(_) => true,
            StoreError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            StoreError::Malformed { .. } => false,
        }
    }
}

/// Errors when applying a manual review score.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("score {score} for question {question_id} is outside 0..={max}")]
    ScoreOutOfRange {
        question_id: String,
        score: f64,
        max: f64,
    },
}
