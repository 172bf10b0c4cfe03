//! Fixture generation for every phase format.
//!
//! This module provides:
//! - Round robin via the circle method (single and double, with byes)
//! - Seeded single-elimination brackets with placeholder rounds
//! - Group draws with seeded pots
//! - Multi-division levels with promotion and relegation
//! - An orchestrator that validates input, dates, constrains and checks
//!   the result
//!
//! ## Example
//!
//! ```
//! use tournament_fixtures::fixtures::{FixtureGenerator, PhaseConfig, Team};
//!
//! let teams: Vec<Team> = (1..=6)
//!     .map(|i| Team::new(format!("team_{i}"), format!("Team {i}")))
//!     .collect();
//!
//! let result = FixtureGenerator::new().generate_seeded(&teams, &PhaseConfig::league(2), 42);
//! assert!(result.success);
//! assert_eq!(result.metadata.total_matches, 30);
//! assert_eq!(result.metadata.total_rounds, 10);
//! ```

pub mod errors;
pub mod generator;
pub mod groups;
pub mod knockout;
pub mod levels;
pub mod models;
pub mod round_robin;

pub use errors::{FixtureError, FixtureResult};
pub use generator::{
    FixtureAlgorithm, FixtureGenerator, FixtureStatistics, PhaseGenerator, expand_legs,
};
pub use groups::GroupsGenerator;
pub use knockout::{BracketSize, KnockoutGenerator};
pub use levels::{LevelMovement, LevelsGenerator, MovementKind};
pub use models::{
    FixtureGenerationResult, GeneratedFixtures, GenerationMetadata, Group, GroupId, Level, Match,
    MatchId, MatchType, PhaseConfig, PhaseType, ScheduleSettings, Team, TeamId, VenueId,
};
pub use round_robin::RoundRobinGenerator;
