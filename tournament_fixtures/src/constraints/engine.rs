//! Constraint checking and bounded repair.
//!
//! Hard constraints are repaired one finding at a time, re-checking after
//! every change, until they hold or the pass budget runs out. Whatever is
//! still broken afterwards is reported as a violation. Soft constraints are
//! only checked.

use super::models::{ConstraintOutcome, ConstraintType, SchedulingConstraint};
use crate::fixtures::models::{Match, PhaseConfig};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

const DEFAULT_MAX_CONSECUTIVE: u32 = 2;
const DEFAULT_WINDOW_HOURS: u32 = 2;
const DEFAULT_MAX_SHIFT_DAYS: u32 = 30;
const MIN_REPAIR_PASSES: usize = 64;

/// How a finding can be repaired
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fix {
    Reschedule(DateTime<Utc>),
    FlipSides,
    Unfixable,
}

#[derive(Debug, Clone)]
struct Finding {
    index: usize,
    message: String,
    fix: Fix,
}

/// Applies scheduling constraints to a generated fixture list
#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    constraints: Vec<SchedulingConstraint>,
}

impl ConstraintEngine {
    /// Create a new engine; constraints run in descending priority order
    pub fn new(mut constraints: Vec<SchedulingConstraint>) -> Self {
        constraints.sort_by_key(|c| std::cmp::Reverse(c.priority));
        Self { constraints }
    }

    /// Constraints in application order
    pub fn constraints(&self) -> &[SchedulingConstraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Repair hard constraints, then report what still does not hold
    pub fn apply(&self, matches: &mut [Match], config: &PhaseConfig) -> ConstraintOutcome {
        let mut outcome = ConstraintOutcome::default();

        for constraint in self.constraints.iter().filter(|c| c.is_hard_constraint) {
            outcome.adjustments += self.repair(constraint, matches, config);
        }

        for constraint in &self.constraints {
            let messages = self.check(constraint, matches, config);
            if constraint.is_hard_constraint {
                outcome.violations.extend(messages);
            } else {
                outcome.warnings.extend(messages);
            }
        }

        if !outcome.violations.is_empty() {
            log::warn!(
                "{} hard constraint violations left after repair",
                outcome.violations.len()
            );
        }
        log::debug!(
            "Constraints applied: {} adjustments, {} warnings",
            outcome.adjustments,
            outcome.warnings.len()
        );

        outcome
    }

    /// Messages for every place the constraint does not hold
    pub fn check(
        &self,
        constraint: &SchedulingConstraint,
        matches: &[Match],
        config: &PhaseConfig,
    ) -> Vec<String> {
        findings(constraint, matches, config)
            .into_iter()
            .map(|finding| format!("{}: {}", constraint.constraint_type, finding.message))
            .collect()
    }

    fn repair(
        &self,
        constraint: &SchedulingConstraint,
        matches: &mut [Match],
        config: &PhaseConfig,
    ) -> usize {
        let budget = matches.len().saturating_mul(4).max(MIN_REPAIR_PASSES);
        let mut adjustments = 0;

        for _ in 0..budget {
            let Some(finding) = findings(constraint, matches, config)
                .into_iter()
                .find(|finding| finding.fix != Fix::Unfixable)
            else {
                break;
            };

            match finding.fix {
                Fix::Reschedule(kickoff) => matches[finding.index].match_date = Some(kickoff),
                Fix::FlipSides => flip_with_mirrors(matches, finding.index),
                Fix::Unfixable => break,
            }
            adjustments += 1;
        }

        adjustments
    }
}

fn findings(
    constraint: &SchedulingConstraint,
    matches: &[Match],
    config: &PhaseConfig,
) -> Vec<Finding> {
    match constraint.constraint_type {
        ConstraintType::TeamRestDays => rest_day_findings(constraint, matches, config),
        ConstraintType::NoConsecutiveHomeAway => home_away_findings(constraint, matches),
        ConstraintType::VenueAvailability => venue_findings(constraint, matches),
        ConstraintType::BlackoutDates => blackout_findings(constraint, matches),
    }
}

/// Indices of each team's fixtures in playing order
fn team_schedules<'a>(
    constraint: &SchedulingConstraint,
    matches: &'a [Match],
    dated_only: bool,
) -> HashMap<&'a str, Vec<usize>> {
    let mut schedules: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, fixture) in matches.iter().enumerate() {
        if dated_only && fixture.match_date.is_none() {
            continue;
        }
        if !constraint.applies_to(fixture) {
            continue;
        }
        let Some((home, away)) = fixture.teams() else {
            continue;
        };
        for team in [home, away] {
            if constraint.team_id.as_deref().is_none_or(|only| only == team) {
                schedules.entry(team).or_default().push(index);
            }
        }
    }
    for indices in schedules.values_mut() {
        indices.sort_by_key(|index| matches[*index].chronological_key());
    }
    schedules
}

fn sorted_teams<'a>(schedules: &HashMap<&'a str, Vec<usize>>) -> Vec<&'a str> {
    let mut teams: Vec<&str> = schedules.keys().copied().collect();
    teams.sort_unstable();
    teams
}

fn rest_day_findings(
    constraint: &SchedulingConstraint,
    matches: &[Match],
    config: &PhaseConfig,
) -> Vec<Finding> {
    let min_days = constraint.config.min_days.unwrap_or(config.min_rest_days);
    if min_days == 0 {
        return Vec::new();
    }

    let schedules = team_schedules(constraint, matches, true);
    let mut found = Vec::new();
    for team in sorted_teams(&schedules) {
        for pair in schedules[team].windows(2) {
            let (Some(earlier), Some(later)) =
                (matches[pair[0]].match_date, matches[pair[1]].match_date)
            else {
                continue;
            };
            let gap = (later.date_naive() - earlier.date_naive()).num_days();
            if gap < i64::from(min_days) {
                found.push(Finding {
                    index: pair[1],
                    message: format!(
                        "{team} has {gap} days rest before round {} (minimum {min_days})",
                        matches[pair[1]].round_number
                    ),
                    fix: Fix::Reschedule(later + Duration::days(i64::from(min_days) - gap)),
                });
            }
        }
    }
    found
}

fn home_away_findings(constraint: &SchedulingConstraint, matches: &[Match]) -> Vec<Finding> {
    let max_run = constraint
        .config
        .max_consecutive
        .unwrap_or(DEFAULT_MAX_CONSECUTIVE)
        .max(1) as usize;

    let schedules = team_schedules(constraint, matches, false);
    let mut found = Vec::new();
    for team in sorted_teams(&schedules) {
        let mut run = 0;
        let mut last_home = None;
        for &index in &schedules[team] {
            let at_home = matches[index].home_team_id.as_deref() == Some(team);
            if last_home == Some(at_home) {
                run += 1;
            } else {
                run = 1;
                last_home = Some(at_home);
            }
            if run == max_run + 1 {
                let side = if at_home { "home" } else { "away" };
                found.push(Finding {
                    index,
                    message: format!(
                        "{team} plays more than {max_run} consecutive {side} matches (round {})",
                        matches[index].round_number
                    ),
                    fix: Fix::FlipSides,
                });
            }
        }
    }
    found
}

fn venue_findings(constraint: &SchedulingConstraint, matches: &[Match]) -> Vec<Finding> {
    let window = Duration::hours(i64::from(
        constraint.config.window_hours.unwrap_or(DEFAULT_WINDOW_HOURS),
    ));

    let mut by_venue: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, fixture) in matches.iter().enumerate() {
        if fixture.is_bye || fixture.match_date.is_none() || !constraint.applies_to(fixture) {
            continue;
        }
        if let Some(venue) = fixture.venue_id.as_deref() {
            by_venue.entry(venue).or_default().push(index);
        }
    }

    let mut venues: Vec<&str> = by_venue.keys().copied().collect();
    venues.sort_unstable();

    let mut found = Vec::new();
    for venue in venues {
        let mut indices = by_venue[venue].clone();
        indices.sort_by_key(|index| matches[*index].chronological_key());
        for pair in indices.windows(2) {
            let (Some(first), Some(second)) =
                (matches[pair[0]].match_date, matches[pair[1]].match_date)
            else {
                continue;
            };
            if second - first < window {
                found.push(Finding {
                    index: pair[1],
                    message: format!(
                        "venue {venue} double-booked: round {} match {} starts within {}h of round {} match {}",
                        matches[pair[1]].round_number,
                        matches[pair[1]].match_number,
                        window.num_hours(),
                        matches[pair[0]].round_number,
                        matches[pair[0]].match_number
                    ),
                    fix: Fix::Reschedule(first + window),
                });
            }
        }
    }
    found
}

fn blackout_findings(constraint: &SchedulingConstraint, matches: &[Match]) -> Vec<Finding> {
    let blackout: HashSet<NaiveDate> = constraint.config.dates.iter().copied().collect();
    if blackout.is_empty() {
        return Vec::new();
    }
    let max_shift = constraint
        .config
        .max_shift_days
        .unwrap_or(DEFAULT_MAX_SHIFT_DAYS);

    let mut found = Vec::new();
    for (index, fixture) in matches.iter().enumerate() {
        if fixture.is_bye || !constraint.applies_to(fixture) {
            continue;
        }
        let Some(kickoff) = fixture.match_date else {
            continue;
        };
        let day = kickoff.date_naive();
        if !blackout.contains(&day) {
            continue;
        }

        let fix = (1..=max_shift)
            .map(|shift| kickoff + Duration::days(i64::from(shift)))
            .find(|candidate| {
                let candidate_day = candidate.date_naive();
                !blackout.contains(&candidate_day)
                    && !team_busy_on(matches, index, candidate_day)
            })
            .map_or(Fix::Unfixable, Fix::Reschedule);

        found.push(Finding {
            index,
            message: format!(
                "round {} match {} falls on blackout date {day}",
                fixture.round_number, fixture.match_number
            ),
            fix,
        });
    }
    found
}

/// Whether either team of `matches[index]` already plays on `day`
fn team_busy_on(matches: &[Match], index: usize, day: NaiveDate) -> bool {
    let fixture = &matches[index];
    let teams: Vec<&str> = [&fixture.home_team_id, &fixture.away_team_id]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    matches.iter().enumerate().any(|(other, candidate)| {
        other != index
            && candidate.match_date.map(|d| d.date_naive()) == Some(day)
            && teams.iter().any(|team| candidate.involves(team))
    })
}

/// Swap sides of a match and of every other meeting of the same pair
///
/// Mirrors are the pair's fixtures in other cycles and in the other leg, so
/// reversals between meetings survive the flip. Venues follow the new home
/// side where one of the meetings already used its ground.
fn flip_with_mirrors(matches: &mut [Match], index: usize) {
    let Some(pair) = matches[index].pair_key() else {
        return;
    };
    let group = matches[index].group_id.clone();

    let meetings: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|(other, m)| {
            *other == index || (m.group_id == group && m.pair_key().as_ref() == Some(&pair))
        })
        .map(|(other, _)| other)
        .collect();

    let grounds: HashMap<String, String> = meetings
        .iter()
        .filter_map(|&i| Some((matches[i].home_team_id.clone()?, matches[i].venue_id.clone()?)))
        .collect();

    for i in meetings {
        let fixture = &mut matches[i];
        fixture.swap_sides();
        if let Some(venue) = fixture
            .home_team_id
            .as_ref()
            .and_then(|home| grounds.get(home))
        {
            fixture.venue_id = Some(venue.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn dated(home: &str, away: &str, round: u32, kickoff: DateTime<Utc>) -> Match {
        let mut fixture = Match::fixture(home, away, round, 1);
        fixture.match_date = Some(kickoff);
        fixture
    }

    #[test]
    fn test_priority_order() {
        let engine = ConstraintEngine::new(vec![
            SchedulingConstraint::rest_days(2).with_priority(1),
            SchedulingConstraint::venue_availability(2).with_priority(10),
            SchedulingConstraint::blackout_dates(vec![]).with_priority(1),
        ]);
        let order: Vec<_> = engine
            .constraints()
            .iter()
            .map(|c| c.constraint_type)
            .collect();
        assert_eq!(
            order,
            vec![
                ConstraintType::VenueAvailability,
                ConstraintType::TeamRestDays,
                ConstraintType::BlackoutDates
            ]
        );
    }

    #[test]
    fn test_hard_rest_days_pushes_later_match() {
        let mut matches = vec![dated("a", "b", 1, at(1, 15)), dated("a", "c", 2, at(3, 15))];
        let engine = ConstraintEngine::new(vec![SchedulingConstraint::rest_days(3).hard()]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.adjustments, 1);
        assert_eq!(matches[1].match_date, Some(at(4, 15)));
    }

    #[test]
    fn test_soft_rest_days_only_warns() {
        let mut matches = vec![dated("a", "b", 1, at(1, 15)), dated("a", "c", 2, at(3, 15))];
        let engine = ConstraintEngine::new(vec![SchedulingConstraint::rest_days(3)]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("team_rest_days"));
        assert_eq!(matches[1].match_date, Some(at(3, 15)));
    }

    #[test]
    fn test_rest_days_default_from_phase_config() {
        let mut matches = vec![dated("a", "b", 1, at(1, 15)), dated("b", "c", 2, at(2, 15))];
        let mut constraint = SchedulingConstraint::rest_days(0).hard();
        constraint.config.min_days = None;
        let engine = ConstraintEngine::new(vec![constraint]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1).with_min_rest_days(4));
        assert!(outcome.is_satisfied());
        assert_eq!(matches[1].match_date, Some(at(5, 15)));
    }

    #[test]
    fn test_home_run_broken_with_mirror() {
        let mut matches = vec![
            Match::fixture("a", "b", 1, 1),
            Match::fixture("a", "c", 2, 1),
            Match::fixture("a", "d", 3, 1),
            Match {
                cycle: 2,
                ..Match::fixture("d", "a", 4, 1)
            },
        ];
        let engine =
            ConstraintEngine::new(vec![SchedulingConstraint::no_consecutive_home_away(2).hard()]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(2));

        assert!(outcome.is_satisfied(), "{:?}", outcome.violations);
        assert_eq!(matches[2].home_team_id.as_deref(), Some("d"));
        assert_eq!(matches[3].home_team_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_home_run_flip_carries_second_leg_and_venues() {
        let with_venue = |mut fixture: Match, venue: &str| {
            fixture.venue_id = Some(venue.to_string());
            fixture
        };
        let mut matches = vec![
            with_venue(Match::fixture("a", "b", 1, 1), "va"),
            with_venue(Match::fixture("a", "c", 2, 1), "va"),
            with_venue(Match::fixture("a", "d", 3, 1), "va"),
            with_venue(
                Match {
                    leg_number: 2,
                    ..Match::fixture("d", "a", 3, 2)
                },
                "vd",
            ),
        ];
        let engine =
            ConstraintEngine::new(vec![SchedulingConstraint::no_consecutive_home_away(2).hard()]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1).with_legs(2));

        assert!(outcome.is_satisfied(), "{:?}", outcome.violations);
        assert_eq!(matches[2].home_team_id.as_deref(), Some("d"));
        assert_eq!(matches[2].venue_id.as_deref(), Some("vd"));
        assert_eq!(matches[3].home_team_id.as_deref(), Some("a"));
        assert_eq!(matches[3].venue_id.as_deref(), Some("va"));
    }

    #[test]
    fn test_home_run_soft_warning() {
        let mut matches = vec![
            Match::fixture("a", "b", 1, 1),
            Match::fixture("a", "c", 2, 1),
            Match::fixture("a", "d", 3, 1),
        ];
        let engine = ConstraintEngine::new(vec![SchedulingConstraint::no_consecutive_home_away(2)]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("consecutive home"));
        assert_eq!(matches[2].home_team_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_venue_double_booking_repaired() {
        let mut first = dated("a", "b", 1, at(1, 15));
        first.venue_id = Some("arena".to_string());
        let mut second = dated("c", "d", 1, at(1, 16));
        second.venue_id = Some("arena".to_string());
        second.match_number = 2;
        let mut matches = vec![first, second];
        let engine = ConstraintEngine::new(vec![SchedulingConstraint::venue_availability(2).hard()]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert!(outcome.is_satisfied());
        assert_eq!(matches[1].match_date, Some(at(1, 17)));
    }

    #[test]
    fn test_blackout_moves_to_next_free_day() {
        let mut matches = vec![dated("a", "b", 1, at(10, 15)), dated("a", "c", 2, at(11, 15))];
        let blackout = vec![NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()];
        let engine =
            ConstraintEngine::new(vec![SchedulingConstraint::blackout_dates(blackout).hard()]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert!(outcome.is_satisfied());
        // Day 11 is taken by team a, so the match lands on day 12
        assert_eq!(matches[0].match_date, Some(at(12, 15)));
    }

    #[test]
    fn test_blackout_unfixable_is_violation() {
        let mut matches = vec![dated("a", "b", 1, at(10, 15))];
        let mut constraint = SchedulingConstraint::blackout_dates(vec![
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
        ])
        .hard();
        constraint.config.max_shift_days = Some(1);
        let engine = ConstraintEngine::new(vec![constraint]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));

        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].contains("blackout date 2025-03-10"));
    }

    #[test]
    fn test_undated_matches_satisfy_date_rules() {
        let mut matches = vec![Match::fixture("a", "b", 1, 1), Match::fixture("a", "c", 2, 1)];
        let engine = ConstraintEngine::new(vec![
            SchedulingConstraint::rest_days(5).hard(),
            SchedulingConstraint::venue_availability(2).hard(),
            SchedulingConstraint::blackout_dates(vec![NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()])
                .hard(),
        ]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));
        assert!(outcome.is_satisfied());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.adjustments, 0);
    }

    #[test]
    fn test_team_scoped_rest_days() {
        let mut matches = vec![dated("a", "b", 1, at(1, 15)), dated("c", "b", 2, at(2, 15))];
        let engine = ConstraintEngine::new(vec![SchedulingConstraint::rest_days(3).for_team("a")]);

        let outcome = engine.apply(&mut matches, &PhaseConfig::league(1));
        assert!(outcome.warnings.is_empty());
    }
}
