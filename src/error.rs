//! Error types for the predictor library

use thiserror::Error;

use crate::model::MatchId;

pub type Result<T> = std::result::Result<T, PredictorError>;

#[derive(Error, Debug)]
pub enum PredictorError {
    /// A fixture record is missing a required field or carries a bad value.
    #[error("invalid match at index {index} ({field}): {reason}")]
    InvalidMatch {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("invalid prediction {0:?} (expected home, draw or away)")]
    InvalidOutcome(String),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("match {0} has already started, prediction is locked")]
    PredictionLocked(MatchId),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PredictorError {
    pub fn invalid_match(index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidMatch {
            index,
            field,
            reason: reason.into(),
        }
    }
}
