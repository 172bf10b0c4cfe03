//! Tournament, phase and fixture validation.

use super::models::{
    IssueCode, PhaseDefinition, TournamentConstraints, TournamentDefinition, ValidationIssue,
    ValidationResult,
};
use crate::fixtures::models::{Match, PhaseType};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Window within which two matches at one venue clash
const VENUE_WINDOW_HOURS: i64 = 2;

/// Checks tournament plans and generated fixtures against constraints
#[derive(Debug, Clone, Default)]
pub struct TournamentValidator {
    constraints: TournamentConstraints,
}

impl TournamentValidator {
    /// Create a new validator
    pub fn new(constraints: TournamentConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &TournamentConstraints {
        &self.constraints
    }

    /// Validate a tournament header and all its phases
    ///
    /// # Arguments
    ///
    /// * `tournament` - Name and date range
    /// * `phases` - Planned phases with participants
    ///
    /// # Returns
    ///
    /// * `ValidationResult` - Errors and warnings from every phase, plus
    ///   tournament-wide checks
    pub fn validate_tournament(
        &self,
        tournament: &TournamentDefinition,
        phases: &[PhaseDefinition],
    ) -> ValidationResult {
        let mut result = ValidationResult::default();

        if tournament.start_date >= tournament.end_date {
            result.push(
                ValidationIssue::error(
                    IssueCode::InvalidDateRange,
                    format!(
                        "Start date {} must be before end date {}",
                        tournament.start_date, tournament.end_date
                    ),
                )
                .with_field("dates"),
            );
        }

        for phase in phases {
            result.merge(self.validate_phase(phase));
        }

        let mut orders = HashSet::new();
        let duplicates: Vec<u32> = phases
            .iter()
            .map(|phase| phase.phase_order)
            .filter(|order| !orders.insert(*order))
            .collect();
        if !duplicates.is_empty() {
            result.push(ValidationIssue::error(
                IssueCode::DuplicatePhaseOrder,
                format!("Phases share execution order: {duplicates:?}"),
            ));
        }

        log::debug!(
            "Validated tournament {}: {} errors, {} warnings",
            tournament.name,
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    /// Validate one phase definition
    pub fn validate_phase(&self, phase: &PhaseDefinition) -> ValidationResult {
        let mut result = ValidationResult::default();
        let team_count = phase.participants.len();

        if team_count < self.constraints.min_teams || team_count > self.constraints.max_teams {
            result.push(
                ValidationIssue::error(
                    IssueCode::TeamCountOutOfRange,
                    format!(
                        "Phase {} has {} teams, allowed range is {}..={}",
                        phase.name, team_count, self.constraints.min_teams, self.constraints.max_teams
                    ),
                )
                .with_field("participants"),
            );
        }

        match phase.phase_type {
            PhaseType::Knockout if team_count > 2 && !team_count.is_power_of_two() => {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::NonPowerOfTwoKnockout,
                        format!(
                            "Knockout phase {} with {} teams will need byes",
                            phase.name, team_count
                        ),
                    )
                    .with_suggestion("Use a power of two team count for a balanced bracket"),
                );
            }
            PhaseType::League => {
                if team_count < 3 {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InsufficientTeamsLeague,
                            format!("League phase {} needs at least 3 teams", phase.name),
                        )
                        .with_field("participants"),
                    );
                }
                if phase
                    .config
                    .as_ref()
                    .is_some_and(|config| config.points_for_win == 0)
                {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidPointsConfig,
                            format!("League phase {} must award points for a win", phase.name),
                        )
                        .with_field("config.points_for_win"),
                    );
                }
            }
            _ => {}
        }

        result
    }

    /// Validate the calendar of a set of fixtures
    ///
    /// Byes and unresolved bracket slots are ignored. Dated matches are
    /// checked in kickoff order.
    pub fn validate_fixtures(&self, matches: &[Match]) -> ValidationResult {
        let mut result = ValidationResult::default();

        let mut dated: Vec<(&Match, DateTime<Utc>)> = Vec::new();
        for fixture in matches.iter().filter(|fixture| fixture.teams().is_some()) {
            match fixture.match_date {
                Some(kickoff) => dated.push((fixture, kickoff)),
                None => result.push(ValidationIssue::warning(
                    IssueCode::UnscheduledMatch,
                    format!("{} has no kickoff date", describe(fixture)),
                )),
            }
        }
        dated.sort_by_key(|(fixture, _)| fixture.chronological_key());

        let window = Duration::hours(VENUE_WINDOW_HOURS);
        let min_rest = Duration::days(i64::from(self.constraints.min_rest_days));
        let blackout: HashSet<NaiveDate> = self.constraints.blackout_dates.iter().copied().collect();

        let mut venue_bookings: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();
        let mut last_played: HashMap<&str, DateTime<Utc>> = HashMap::new();
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

        for (fixture, kickoff) in dated {
            let day = kickoff.date_naive();

            if let Some(venue) = fixture.venue_id.as_deref() {
                if !self.constraints.allowed_venues.is_empty()
                    && !self.constraints.allowed_venues.iter().any(|allowed| allowed == venue)
                {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::VenueNotAllowed,
                            format!("{} is played at unlisted venue {}", describe(fixture), venue),
                        )
                        .with_field("venue_id"),
                    );
                }

                let bookings = venue_bookings.entry(venue).or_default();
                if bookings
                    .iter()
                    .any(|booked| (kickoff - *booked).abs() < window)
                {
                    result.push(ValidationIssue::error(
                        IssueCode::VenueConflict,
                        format!("Venue {} is double-booked on {}", venue, day),
                    ));
                }
                bookings.push(kickoff);
            }

            if let Some((home, away)) = fixture.teams() {
                for team in [home, away] {
                    let rested = last_played
                        .insert(team, kickoff)
                        .is_none_or(|previous| kickoff - previous >= min_rest);
                    if !rested {
                        result.push(
                            ValidationIssue::warning(
                                IssueCode::InsufficientRest,
                                format!(
                                    "Team {} has less than {} days of rest before {}",
                                    team, self.constraints.min_rest_days, day
                                ),
                            )
                            .with_suggestion("Consider rescheduling the match"),
                        );
                    }
                }
            }

            if blackout.contains(&day) {
                result.push(ValidationIssue::error(
                    IssueCode::BlackoutDate,
                    format!("{} is scheduled on blackout date {}", describe(fixture), day),
                ));
            }

            if !self.constraints.preferred_time_slots.is_empty()
                && !self
                    .constraints
                    .preferred_time_slots
                    .iter()
                    .any(|slot| slot.contains(kickoff))
            {
                result.push(ValidationIssue::warning(
                    IssueCode::OutsidePreferredSlot,
                    format!("{} kicks off outside the preferred time slots", describe(fixture)),
                ));
            }

            *per_day.entry(day).or_default() += 1;
        }

        for (day, count) in per_day {
            if count > self.constraints.max_matches_per_day {
                result.push(ValidationIssue::warning(
                    IssueCode::TooManyMatchesPerDay,
                    format!(
                        "{} matches on {}, limit is {}",
                        count, day, self.constraints.max_matches_per_day
                    ),
                ));
            }
        }

        result
    }
}

fn describe(fixture: &Match) -> String {
    match fixture.teams() {
        Some((home, away)) => format!(
            "Match {} vs {} (round {})",
            home, away, fixture.round_number
        ),
        None => format!("Match {} of round {}", fixture.match_number, fixture.round_number),
    }
}

/// Structural checks run on every generated fixture list
///
/// Returns one message per problem: duplicate pairings within the same
/// group, cycle and leg; teams playing themselves; round numbers below 1;
/// byes carrying an away team.
pub fn validate_fixture_structure(matches: &[Match]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen: HashSet<(Option<&str>, u32, u8, (String, String))> = HashSet::new();

    for fixture in matches {
        if fixture.round_number < 1 {
            problems.push(format!(
                "Match {} has invalid round number {}",
                fixture.match_number, fixture.round_number
            ));
        }

        if fixture.is_bye {
            if fixture.away_team_id.is_some() {
                problems.push(format!(
                    "Bye in round {} must not have an away team",
                    fixture.round_number
                ));
            }
            continue;
        }

        let (Some(home), Some(away)) = (
            fixture.home_team_id.as_deref(),
            fixture.away_team_id.as_deref(),
        ) else {
            continue;
        };

        if home == away {
            problems.push(format!(
                "Team {} cannot play itself in round {}",
                home, fixture.round_number
            ));
            continue;
        }

        if let Some(pair) = fixture.pair_key() {
            let key = (
                fixture.group_id.as_deref(),
                fixture.cycle,
                fixture.leg_number,
                pair,
            );
            if !seen.insert(key) {
                problems.push(format!(
                    "Duplicate match found: {} vs {} in round {}",
                    home, away, fixture.round_number
                ));
            }
        }
    }

    problems
}
