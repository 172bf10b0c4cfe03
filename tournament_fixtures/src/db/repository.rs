//! Repository trait for match results and standings.
//!
//! The results manager only reaches storage through this trait, so a real
//! backend and the in-memory store are interchangeable.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::fixtures::models::{Match, TeamId};
use crate::results::models::{MatchEvent, MatchRecord, StandingsUpdate};

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write conflicts with stored state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations needed by the results manager
#[async_trait]
pub trait ResultsStore: Send + Sync {
    /// Find a match by ID
    async fn find_match(&self, match_id: &str) -> StoreResult<Option<MatchRecord>>;

    /// Completed matches of a phase, restricted to one group when given
    async fn completed_matches(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> StoreResult<Vec<MatchRecord>>;

    /// Every match of a phase, in any status
    async fn phase_matches(&self, phase_id: &str) -> StoreResult<Vec<MatchRecord>>;

    /// Display names for the given teams (unknown IDs are left out)
    async fn team_names(&self, team_ids: &[TeamId]) -> StoreResult<HashMap<TeamId, String>>;

    /// Stored standings for a scope
    async fn get_standings(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> StoreResult<Option<StandingsUpdate>>;

    /// Replace stored standings for a scope
    async fn upsert_standings(&self, update: StandingsUpdate) -> StoreResult<()>;

    /// Atomically store a match result, its events and the recomputed standings
    ///
    /// Either all three writes become visible or none do.
    async fn commit_result(
        &self,
        record: MatchRecord,
        events: Vec<MatchEvent>,
        update: StandingsUpdate,
    ) -> StoreResult<()>;

    /// Persist generated fixtures, assigning match IDs
    async fn insert_fixtures(
        &self,
        phase_id: &str,
        matches: Vec<Match>,
    ) -> StoreResult<Vec<MatchRecord>>;
}
