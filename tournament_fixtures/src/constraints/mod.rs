//! Scheduling constraints applied to generated fixtures.
//!
//! This module provides:
//! - Round dating and venue assignment from a phase calendar
//! - Rest-day, home/away run, venue and blackout-date rules
//! - Bounded repair of hard constraints; warnings for soft ones
//!
//! ## Example
//!
//! ```
//! use tournament_fixtures::constraints::{ConstraintEngine, SchedulingConstraint};
//! use tournament_fixtures::fixtures::{Match, PhaseConfig};
//!
//! let engine = ConstraintEngine::new(vec![
//!     SchedulingConstraint::no_consecutive_home_away(2).hard(),
//! ]);
//! let mut matches = vec![
//!     Match::fixture("a", "b", 1, 1),
//!     Match::fixture("a", "c", 2, 1),
//!     Match::fixture("a", "d", 3, 1),
//! ];
//!
//! let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));
//! assert!(outcome.is_satisfied());
//! ```

pub mod engine;
pub mod models;
pub mod scheduler;

pub use engine::ConstraintEngine;
pub use models::{ConstraintConfig, ConstraintOutcome, ConstraintType, SchedulingConstraint};
pub use scheduler::Scheduler;
