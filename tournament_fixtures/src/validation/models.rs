//! Validation data models.

use crate::fixtures::models::{PhaseConfig, PhaseType, TeamId, VenueId};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable issue code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidDateRange,
    InsufficientTeamsLeague,
    NonPowerOfTwoKnockout,
    InvalidPointsConfig,
    TeamCountOutOfRange,
    DuplicatePhaseOrder,
    VenueConflict,
    InsufficientRest,
    BlackoutDate,
    VenueNotAllowed,
    TooManyMatchesPerDay,
    UnscheduledMatch,
    OutsidePreferredSlot,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            IssueCode::InvalidDateRange => "INVALID_DATE_RANGE",
            IssueCode::InsufficientTeamsLeague => "INSUFFICIENT_TEAMS_LEAGUE",
            IssueCode::NonPowerOfTwoKnockout => "NON_POWER_OF_TWO_KNOCKOUT",
            IssueCode::InvalidPointsConfig => "INVALID_POINTS_CONFIG",
            IssueCode::TeamCountOutOfRange => "TEAM_COUNT_OUT_OF_RANGE",
            IssueCode::DuplicatePhaseOrder => "DUPLICATE_PHASE_ORDER",
            IssueCode::VenueConflict => "VENUE_CONFLICT",
            IssueCode::InsufficientRest => "INSUFFICIENT_REST",
            IssueCode::BlackoutDate => "BLACKOUT_DATE",
            IssueCode::VenueNotAllowed => "VENUE_NOT_ALLOWED",
            IssueCode::TooManyMatchesPerDay => "TOO_MANY_MATCHES_PER_DAY",
            IssueCode::UnscheduledMatch => "UNSCHEDULED_MATCH",
            IssueCode::OutsidePreferredSlot => "OUTSIDE_PREFERRED_SLOT",
        };
        write!(f, "{code}")
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub severity: Severity,
    /// Offending input field, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            field: None,
            suggestion: None,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Outcome of a validation pass
///
/// `is_valid` is true exactly when there are no errors; warnings never
/// invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// File an issue under errors or warnings by its severity
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => {
                self.is_valid = false;
                self.errors.push(issue);
            }
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// Fold another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        for issue in other.errors.into_iter().chain(other.warnings) {
            self.push(issue);
        }
    }

    /// Whether any issue carries the code
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }
}

/// Preferred kickoff window on one weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimeSlot {
    /// Whether a kickoff falls on the slot's day within its window (inclusive)
    pub fn contains(&self, kickoff: DateTime<Utc>) -> bool {
        let time = kickoff.time();
        kickoff.weekday() == self.day_of_week && time >= self.start_time && time <= self.end_time
    }
}

/// Limits a tournament's phases and fixtures are checked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConstraints {
    pub min_teams: usize,
    pub max_teams: usize,
    pub min_rest_days: u32,
    pub max_matches_per_day: usize,
    /// Empty means every venue is allowed
    #[serde(default)]
    pub allowed_venues: Vec<VenueId>,
    #[serde(default)]
    pub blackout_dates: Vec<NaiveDate>,
    /// Empty means any kickoff time is fine
    #[serde(default)]
    pub preferred_time_slots: Vec<TimeSlot>,
}

impl Default for TournamentConstraints {
    fn default() -> Self {
        let afternoon = |day_of_week| TimeSlot {
            day_of_week,
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        };

        Self {
            min_teams: 2,
            max_teams: 64,
            min_rest_days: 3,
            max_matches_per_day: 8,
            allowed_venues: Vec::new(),
            blackout_dates: Vec::new(),
            preferred_time_slots: vec![afternoon(Weekday::Sat), afternoon(Weekday::Sun)],
        }
    }
}

/// Tournament header being validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentDefinition {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A phase as planned, before fixtures exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub id: String,
    pub name: String,
    pub phase_type: PhaseType,
    pub phase_order: u32,
    #[serde(default)]
    pub participants: Vec<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PhaseConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_push_sorts_by_severity() {
        let mut result = ValidationResult::default();
        result.push(ValidationIssue::warning(IssueCode::InsufficientRest, "tired"));
        assert!(result.is_valid);

        result.push(ValidationIssue::error(IssueCode::VenueConflict, "clash"));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.has_code(IssueCode::InsufficientRest));
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&IssueCode::NonPowerOfTwoKnockout).unwrap();
        assert_eq!(json, r#""NON_POWER_OF_TWO_KNOCKOUT""#);
        assert_eq!(IssueCode::VenueNotAllowed.to_string(), "VENUE_NOT_ALLOWED");
    }

    #[test]
    fn test_default_slots_are_weekend_afternoons() {
        let constraints = TournamentConstraints::default();
        assert_eq!(constraints.preferred_time_slots.len(), 2);

        // 2025-03-08 is a Saturday
        let saturday = Utc.with_ymd_and_hms(2025, 3, 8, 16, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 3, 8, 19, 0, 0).unwrap();
        assert!(constraints.preferred_time_slots.iter().any(|slot| slot.contains(saturday)));
        assert!(!constraints.preferred_time_slots.iter().any(|slot| slot.contains(monday)));
        assert!(!constraints.preferred_time_slots.iter().any(|slot| slot.contains(late)));
    }
}
