//! Tournament and fixture validation.
//!
//! This module provides:
//! - Structural checks on tournament plans and their phases
//! - Calendar checks on fixtures (venues, rest, blackout dates, daily load)
//! - The structural fixture check every generation run ends with
//!
//! Errors make a result invalid; warnings are advisory.

pub mod models;
pub mod validator;

pub use models::{
    IssueCode, PhaseDefinition, Severity, TimeSlot, TournamentConstraints, TournamentDefinition,
    ValidationIssue, ValidationResult,
};
pub use validator::{TournamentValidator, validate_fixture_structure};
