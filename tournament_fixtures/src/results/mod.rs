//! Match results and standings.
//!
//! This module provides:
//! - Match lifecycle and result models
//! - Standings computation with configurable tie-break chains
//! - A results manager that commits a result and its standings together
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use tournament_fixtures::fixtures::Match;
//! use tournament_fixtures::results::{
//!     ClassificationConfig, MatchRecord, MatchStatus, Scoreline, StandingsCalculator,
//! };
//!
//! let mut record = MatchRecord::scheduled("league", Match::fixture("a", "b", 1, 1));
//! record.status = MatchStatus::Completed;
//! record.score = Some(Scoreline { home_score: 2, away_score: 0, ..Default::default() });
//!
//! let config = ClassificationConfig::default();
//! let table = StandingsCalculator::new(&config).calculate(&[record], &HashMap::new());
//! assert_eq!(table[0].team_id, "a");
//! assert_eq!(table[0].points, 3);
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod standings;

pub use errors::{ResultsError, ResultsResult};
pub use manager::{RecordedResult, ResultsManager};
pub use models::{
    ClassificationConfig, FormResult, HeadToHead, MatchEvent, MatchEventType, MatchRecord,
    MatchResult, MatchStatus, PhaseId, Scoreline, Side, SortOrder, StandingsScope,
    StandingsUpdate, TeamStanding, TiebreakType, TiebreakingRule,
};
pub use standings::StandingsCalculator;
