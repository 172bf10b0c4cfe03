//! # Tournament Fixtures
//!
//! Fixture generation, scheduling constraints and standings for
//! multi-format tournaments.
//!
//! ## Architecture
//!
//! A phase is generated by one of four formats, dispatched through
//! `enum_dispatch`:
//!
//! - **League**: circle-method round robin, single or double, with byes
//! - **Knockout**: seeded single-elimination bracket with placeholder rounds
//! - **Groups**: seeded group draw, round robin inside each group
//! - **Levels**: seed-ordered divisions with promotion and relegation
//!
//! Generated fixtures are dated, checked against scheduling constraints,
//! expanded into legs and structurally validated before being returned.
//! Results recorded through [`results::ResultsManager`] rebuild the
//! standings of their group in the same store commit.
//!
//! ## Core Modules
//!
//! - [`fixtures`]: Generators, fixture models and the orchestrator
//! - [`constraints`]: Calendar assignment and constraint enforcement
//! - [`results`]: Standings, tie-breaks and result recording
//! - [`validation`]: Tournament, phase and fixture checks
//! - [`db`]: Storage seam and the in-memory store
//!
//! ## Example
//!
//! ```
//! use tournament_fixtures::{FixtureGenerator, PhaseConfig, Team};
//!
//! let teams: Vec<Team> = (1..=5)
//!     .map(|i| Team::new(format!("team_{i}"), format!("Team {i}")))
//!     .collect();
//!
//! let result = FixtureGenerator::new().generate_seeded(&teams, &PhaseConfig::league(1), 7);
//! assert!(result.success);
//! assert_eq!(result.metadata.total_rounds, 5);
//! assert_eq!(result.metadata.byes_generated, 5);
//! ```

/// Scheduling constraints and round dating.
pub mod constraints;

/// Storage trait and in-memory implementation.
pub mod db;

/// Fixture generation for all phase formats.
pub mod fixtures;
pub use fixtures::{
    FixtureError, FixtureGenerationResult, FixtureGenerator, Match, MatchType, PhaseConfig,
    PhaseType, ScheduleSettings, Team,
};

/// Results recording and standings.
pub mod results;
pub use results::{ClassificationConfig, MatchResult, ResultsManager, TeamStanding};

/// Tournament and fixture validation.
pub mod validation;
pub use validation::{TournamentValidator, ValidationResult};
