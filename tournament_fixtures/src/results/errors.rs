//! Results error types.

use super::models::MatchStatus;
use crate::db::StoreError;
use crate::fixtures::models::MatchId;
use thiserror::Error;

/// Results errors
#[derive(Debug, Error)]
pub enum ResultsError {
    /// No stored match with this ID
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Status change not allowed by the match lifecycle
    #[error("Invalid status transition for match {match_id}: {from} -> {to}")]
    InvalidStatusTransition {
        match_id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },

    /// A result was submitted for a bye or an unresolved bracket slot
    #[error("Match {0} has no resolved home and away teams")]
    MissingTeams(MatchId),

    /// Store failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl ResultsError {
    /// Message safe to show to API clients
    ///
    /// Backend details are replaced with a generic message.
    pub fn client_message(&self) -> String {
        match self {
            ResultsError::Persistence(StoreError::Backend(_)) => {
                "Internal storage error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for results operations
pub type ResultsResult<T> = Result<T, ResultsError>;
