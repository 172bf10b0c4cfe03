//! Scheduling constraint models.

use crate::fixtures::models::{Match, TeamId, VenueId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of scheduling rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// A venue hosts at most one match per time window
    VenueAvailability,
    /// Minimum days between a team's matches
    TeamRestDays,
    /// Cap on consecutive home (or away) matches
    NoConsecutiveHomeAway,
    /// Dates on which nothing may be played
    BlackoutDates,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::VenueAvailability => write!(f, "venue_availability"),
            ConstraintType::TeamRestDays => write!(f, "team_rest_days"),
            ConstraintType::NoConsecutiveHomeAway => write!(f, "no_consecutive_home_away"),
            ConstraintType::BlackoutDates => write!(f, "blackout_dates"),
        }
    }
}

/// Constraint parameters
///
/// Known keys are typed; anything else is kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// TeamRestDays: minimum days between matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days: Option<u32>,
    /// NoConsecutiveHomeAway: longest allowed run (default 2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive: Option<u32>,
    /// VenueAvailability: hours a venue stays busy (default 2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_hours: Option<u32>,
    /// BlackoutDates: forbidden dates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<NaiveDate>,
    /// BlackoutDates: how far a match may be moved (default 30 days)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shift_days: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A scheduling rule applied after generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConstraint {
    pub constraint_type: ConstraintType,
    /// Restrict to one team (all teams when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    /// Restrict to one venue (all venues when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<VenueId>,
    #[serde(default)]
    pub config: ConstraintConfig,
    /// Higher priority constraints are applied first
    #[serde(default)]
    pub priority: i32,
    /// Hard constraints are repaired and fail generation if still broken;
    /// soft constraints only produce warnings
    #[serde(default)]
    pub is_hard_constraint: bool,
}

impl SchedulingConstraint {
    fn of(constraint_type: ConstraintType, config: ConstraintConfig) -> Self {
        Self {
            constraint_type,
            team_id: None,
            venue_id: None,
            config,
            priority: 0,
            is_hard_constraint: false,
        }
    }

    /// Soft rest-day rule for every team
    pub fn rest_days(min_days: u32) -> Self {
        Self::of(
            ConstraintType::TeamRestDays,
            ConstraintConfig {
                min_days: Some(min_days),
                ..Default::default()
            },
        )
    }

    /// Soft home/away run limit for every team
    pub fn no_consecutive_home_away(max_consecutive: u32) -> Self {
        Self::of(
            ConstraintType::NoConsecutiveHomeAway,
            ConstraintConfig {
                max_consecutive: Some(max_consecutive),
                ..Default::default()
            },
        )
    }

    /// Soft venue double-booking rule for every venue
    pub fn venue_availability(window_hours: u32) -> Self {
        Self::of(
            ConstraintType::VenueAvailability,
            ConstraintConfig {
                window_hours: Some(window_hours),
                ..Default::default()
            },
        )
    }

    /// Soft blackout rule
    pub fn blackout_dates(dates: Vec<NaiveDate>) -> Self {
        Self::of(
            ConstraintType::BlackoutDates,
            ConstraintConfig {
                dates,
                ..Default::default()
            },
        )
    }

    /// Make the constraint hard
    pub fn hard(mut self) -> Self {
        self.is_hard_constraint = true;
        self
    }

    /// Restrict to one team
    pub fn for_team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Restrict to one venue
    pub fn at_venue(mut self, venue_id: impl Into<VenueId>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the match falls under this constraint's team/venue filter
    pub fn applies_to(&self, fixture: &Match) -> bool {
        let team_ok = self
            .team_id
            .as_deref()
            .is_none_or(|team| fixture.involves(team));
        let venue_ok = self
            .venue_id
            .as_ref()
            .is_none_or(|venue| fixture.venue_id.as_ref() == Some(venue));
        team_ok && venue_ok
    }
}

/// Result of running the constraint engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintOutcome {
    /// Soft constraint findings
    pub warnings: Vec<String>,
    /// Hard constraint findings left after repair
    pub violations: Vec<String>,
    /// Matches moved or flipped during repair
    pub adjustments: usize,
}

impl ConstraintOutcome {
    /// Whether every hard constraint holds
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_from_json_keeps_unknown_keys() {
        let json = r#"{
            "constraint_type": "blackout_dates",
            "config": {"dates": ["2025-12-25"], "reason": "holiday"},
            "is_hard_constraint": true,
            "priority": 5
        }"#;
        let constraint: SchedulingConstraint = serde_json::from_str(json).unwrap();

        assert_eq!(constraint.constraint_type, ConstraintType::BlackoutDates);
        assert_eq!(
            constraint.config.dates,
            vec![NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()]
        );
        assert_eq!(
            constraint.config.extra.get("reason"),
            Some(&serde_json::Value::String("holiday".to_string()))
        );
        assert!(constraint.is_hard_constraint);
    }

    #[test]
    fn test_applies_to_filters() {
        let mut fixture = Match::fixture("a", "b", 1, 1);
        fixture.venue_id = Some("v1".to_string());

        assert!(SchedulingConstraint::rest_days(3).applies_to(&fixture));
        assert!(SchedulingConstraint::rest_days(3).for_team("b").applies_to(&fixture));
        assert!(!SchedulingConstraint::rest_days(3).for_team("c").applies_to(&fixture));
        assert!(
            SchedulingConstraint::venue_availability(2)
                .at_venue("v1")
                .applies_to(&fixture)
        );
        assert!(
            !SchedulingConstraint::venue_availability(2)
                .at_venue("v2")
                .applies_to(&fixture)
        );
    }
}
