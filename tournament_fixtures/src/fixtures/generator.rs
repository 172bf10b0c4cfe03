//! Fixture generation orchestrator.
//!
//! Validates the request, dispatches to the generator for the phase format,
//! then runs the post-generation pipeline:
//!
//! 1. Dating (only when the phase carries a calendar)
//! 2. Scheduling constraints
//! 3. Second-leg expansion
//! 4. Structural validation
//!
//! Any failure yields an unsuccessful result with no matches.

use super::errors::{FixtureError, FixtureResult};
use super::groups::GroupsGenerator;
use super::knockout::KnockoutGenerator;
use super::levels::LevelsGenerator;
use super::models::{
    FixtureGenerationResult, GeneratedFixtures, GenerationMetadata, Match, PhaseConfig, PhaseType,
    Team, TeamId, VenueId,
};
use super::round_robin::RoundRobinGenerator;
use crate::constraints::scheduler::fill_home_venues;
use crate::constraints::{ConstraintEngine, Scheduler, SchedulingConstraint};
use crate::validation::validate_fixture_structure;
use chrono::Duration;
use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// A fixture generation algorithm for one phase format
#[enum_dispatch]
pub trait FixtureAlgorithm {
    /// Name reported in generation metadata
    fn algorithm_name(&self) -> &'static str;

    /// Generate first-leg fixtures for the roster
    fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        rng: &mut dyn RngCore,
    ) -> FixtureResult<GeneratedFixtures>;
}

/// Generator selected by phase format
#[enum_dispatch(FixtureAlgorithm)]
#[derive(Debug, Clone, Copy)]
pub enum PhaseGenerator {
    RoundRobinGenerator,
    KnockoutGenerator,
    GroupsGenerator,
    LevelsGenerator,
}

impl PhaseGenerator {
    /// Pick the generator for a phase format
    ///
    /// Combined phases are generated as groups.
    pub fn for_phase(phase_type: PhaseType) -> Self {
        match phase_type {
            PhaseType::League => RoundRobinGenerator::new().into(),
            PhaseType::Knockout => KnockoutGenerator::new().into(),
            PhaseType::Groups => GroupsGenerator::new().into(),
            PhaseType::Levels => LevelsGenerator::new().into(),
            PhaseType::Combined => {
                log::warn!("Combined phase generated as groups");
                GroupsGenerator::new().into()
            }
        }
    }
}

/// Double every non-bye match for two-legged phases
///
/// Leg 1 keeps its sides and takes odd match numbers; leg 2 swaps sides,
/// takes the following even number and keeps the round. Dated second legs
/// are played after the whole first-leg calendar, at a venue the new home
/// side already used in leg 1.
pub fn expand_legs(matches: Vec<Match>, config: &PhaseConfig) -> Vec<Match> {
    if config.home_away_legs != 2 {
        return matches;
    }

    let offset = second_leg_offset(&matches, config);
    let mut home_venues: HashMap<TeamId, VenueId> = HashMap::new();
    for fixture in &matches {
        if let (Some(home), Some(venue)) = (&fixture.home_team_id, &fixture.venue_id) {
            home_venues
                .entry(home.clone())
                .or_insert_with(|| venue.clone());
        }
    }

    let mut legs = Vec::with_capacity(matches.len() * 2);
    for mut first in matches {
        let number = first.match_number;
        first.match_number = number * 2 - 1;
        if first.is_bye {
            legs.push(first);
            continue;
        }

        let mut second = first.clone();
        second.swap_sides();
        second.id = None;
        second.match_number = number * 2;
        second.leg_number = 2;
        second.match_date = first.match_date.map(|kickoff| kickoff + offset);
        if first.venue_id.is_some() {
            second.venue_id = second
                .home_team_id
                .as_ref()
                .and_then(|home| home_venues.get(home))
                .cloned();
        }

        legs.push(first);
        legs.push(second);
    }
    legs
}

fn second_leg_offset(matches: &[Match], config: &PhaseConfig) -> Duration {
    let interval = i64::from(
        config
            .schedule
            .as_ref()
            .map_or(7, |schedule| schedule.days_between_rounds),
    );
    let dates: Vec<_> = matches
        .iter()
        .filter_map(|m| m.match_date.map(|d| d.date_naive()))
        .collect();
    let span = match (dates.iter().min(), dates.iter().max()) {
        (Some(first), Some(last)) => (*last - *first).num_days(),
        _ => 0,
    };
    Duration::days(span + interval)
}

/// Orchestrates fixture generation for a phase
#[derive(Debug, Clone, Default)]
pub struct FixtureGenerator {
    engine: ConstraintEngine,
}

impl FixtureGenerator {
    /// Create a new fixture generator without scheduling constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new fixture generator that enforces `constraints`
    pub fn with_constraints(constraints: Vec<SchedulingConstraint>) -> Self {
        Self {
            engine: ConstraintEngine::new(constraints),
        }
    }

    /// Generate fixtures with a deterministic RNG
    pub fn generate_seeded(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        seed: u64,
    ) -> FixtureGenerationResult {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(teams, config, &mut rng)
    }

    /// Generate fixtures for a phase
    ///
    /// # Arguments
    ///
    /// * `teams` - Phase roster
    /// * `config` - Phase configuration
    /// * `rng` - Randomness for group draws
    ///
    /// # Returns
    ///
    /// A successful result with every fixture, or an unsuccessful one with
    /// the error message, no matches and zeroed metadata
    pub fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        rng: &mut dyn RngCore,
    ) -> FixtureGenerationResult {
        let started = Instant::now();
        let generator = PhaseGenerator::for_phase(config.phase_type);
        let algorithm = generator.algorithm_name();

        match self.run(&generator, teams, config, rng) {
            Ok((fixtures, warnings)) => {
                let elapsed = started.elapsed().as_millis() as u64;
                log::info!(
                    "Generated {} matches over {} rounds for {} teams using {} ({} ms)",
                    fixtures.matches.len(),
                    fixtures.total_rounds,
                    teams.len(),
                    algorithm,
                    elapsed
                );
                FixtureGenerationResult {
                    metadata: GenerationMetadata {
                        total_matches: fixtures.matches.len(),
                        total_rounds: fixtures.total_rounds,
                        algorithm_used: algorithm.to_string(),
                        generation_time_ms: elapsed,
                        byes_generated: fixtures.byes_generated,
                    },
                    matches: fixtures.matches,
                    success: true,
                    error: None,
                    warnings,
                }
            }
            Err(err) => {
                log::warn!("Fixture generation failed ({algorithm}): {err}");
                FixtureGenerationResult::failure(algorithm, err.to_string())
            }
        }
    }

    /// Reject rosters and configurations no generator can handle
    pub fn validate_input(teams: &[Team], config: &PhaseConfig) -> FixtureResult<()> {
        if teams.len() < 2 {
            return Err(FixtureError::InsufficientTeams {
                needed: 2,
                actual: teams.len(),
            });
        }

        let mut seen = HashSet::with_capacity(teams.len());
        if let Some(duplicate) = teams.iter().find(|team| !seen.insert(team.id.as_str())) {
            return Err(FixtureError::DuplicateTeam(duplicate.id.clone()));
        }

        if !(1..=2).contains(&config.home_away_legs) {
            return Err(FixtureError::InvalidConfig(format!(
                "home_away_legs must be 1 or 2, got {}",
                config.home_away_legs
            )));
        }
        if config.rounds < 1 {
            return Err(FixtureError::InvalidConfig(
                "rounds must be at least 1".to_string(),
            ));
        }

        match config.phase_type {
            PhaseType::Knockout if teams.len() < 4 => Err(FixtureError::InsufficientTeams {
                needed: 4,
                actual: teams.len(),
            }),
            PhaseType::Groups | PhaseType::Combined => {
                let groups = config.effective_groups_count(teams.len());
                if groups < 2 {
                    Err(FixtureError::InvalidGroupCount(groups))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    fn run(
        &self,
        generator: &PhaseGenerator,
        teams: &[Team],
        config: &PhaseConfig,
        rng: &mut dyn RngCore,
    ) -> FixtureResult<(GeneratedFixtures, Vec<String>)> {
        Self::validate_input(teams, config)?;

        let mut fixtures = generator.generate(teams, config, rng)?;

        if let Some(schedule) = &config.schedule {
            Scheduler::new(schedule).assign(&mut fixtures.matches, teams);
        }

        // Second legs carry their own dates and venues, so constraints run
        // over the expanded list
        fixtures.matches = expand_legs(std::mem::take(&mut fixtures.matches), config);
        if config.schedule.is_some() {
            fill_home_venues(&mut fixtures.matches, teams);
        }

        let outcome = self.engine.apply(&mut fixtures.matches, config);
        if !outcome.is_satisfied() {
            return Err(FixtureError::ConstraintViolation(outcome.violations));
        }

        let problems = validate_fixture_structure(&fixtures.matches);
        if !problems.is_empty() {
            return Err(FixtureError::InvalidFixtures(problems));
        }

        Ok((fixtures, outcome.warnings))
    }
}

/// Summary counts over a fixture list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureStatistics {
    pub total_matches: usize,
    pub real_matches: usize,
    pub byes: usize,
    pub rounds: u32,
    pub matches_per_round: BTreeMap<u32, usize>,
    /// Non-bye matches per team
    pub matches_per_team: BTreeMap<TeamId, usize>,
    pub home_matches_per_team: BTreeMap<TeamId, usize>,
    pub byes_per_team: BTreeMap<TeamId, usize>,
}

impl FixtureStatistics {
    /// Compute statistics for a fixture list
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut stats = Self {
            total_matches: matches.len(),
            ..Self::default()
        };

        for fixture in matches {
            stats.rounds = stats.rounds.max(fixture.round_number);
            *stats
                .matches_per_round
                .entry(fixture.round_number)
                .or_default() += 1;

            if fixture.is_bye {
                stats.byes += 1;
                if let Some(team) = &fixture.home_team_id {
                    *stats.byes_per_team.entry(team.clone()).or_default() += 1;
                }
                continue;
            }

            if let Some((home, away)) = fixture.teams() {
                stats.real_matches += 1;
                *stats.matches_per_team.entry(home.to_string()).or_default() += 1;
                *stats.matches_per_team.entry(away.to_string()).or_default() += 1;
                *stats
                    .home_matches_per_team
                    .entry(home.to_string())
                    .or_default() += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::models::{MatchType, ScheduleSettings};
    use chrono::NaiveDate;

    fn teams(n: usize) -> Vec<Team> {
        (1..=n)
            .map(|i| Team::new(format!("t{i}"), format!("Team {i}")))
            .collect()
    }

    #[test]
    fn test_league_metadata() {
        let result = FixtureGenerator::new().generate_seeded(&teams(6), &PhaseConfig::league(1), 1);

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.metadata.total_matches, 15);
        assert_eq!(result.metadata.total_rounds, 5);
        assert_eq!(result.metadata.algorithm_used, "round_robin_circle_method");
        assert_eq!(result.metadata.byes_generated, 0);
    }

    #[test]
    fn test_two_legs_double_and_swap() {
        let config = PhaseConfig::league(1).with_legs(2);
        let result = FixtureGenerator::new().generate_seeded(&teams(4), &config, 1);

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.matches.len(), 12);

        for first in result.matches.iter().filter(|m| m.leg_number == 1) {
            assert_eq!(first.match_number % 2, 1);
            let second = result
                .matches
                .iter()
                .find(|m| {
                    m.leg_number == 2
                        && m.round_number == first.round_number
                        && m.match_number == first.match_number + 1
                })
                .unwrap();
            assert_eq!(second.home_team_id, first.away_team_id);
            assert_eq!(second.away_team_id, first.home_team_id);
        }
    }

    #[test]
    fn test_second_leg_dated_after_first_leg_calendar() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let config = PhaseConfig::league(1)
            .with_legs(2)
            .with_schedule(ScheduleSettings::weekly(start));
        let result = FixtureGenerator::new().generate_seeded(&teams(4), &config, 1);
        assert!(result.success, "{:?}", result.error);

        let last_first_leg = result
            .matches
            .iter()
            .filter(|m| m.leg_number == 1)
            .filter_map(|m| m.match_date)
            .max()
            .unwrap();
        let first_second_leg = result
            .matches
            .iter()
            .filter(|m| m.leg_number == 2)
            .filter_map(|m| m.match_date)
            .min()
            .unwrap();
        assert!(first_second_leg > last_first_leg);
        assert_eq!((first_second_leg - last_first_leg).num_days(), 7);
    }

    #[test]
    fn test_second_leg_uses_new_home_venue() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let roster = vec![
            Team::new("a", "A").with_home_venue("va"),
            Team::new("b", "B").with_home_venue("vb"),
        ];
        let config = PhaseConfig::league(1)
            .with_legs(2)
            .with_schedule(ScheduleSettings::weekly(start));
        let result = FixtureGenerator::new().generate_seeded(&roster, &config, 1);
        assert!(result.success, "{:?}", result.error);

        for m in &result.matches {
            let expected = if m.home_team_id.as_deref() == Some("a") {
                "va"
            } else {
                "vb"
            };
            assert_eq!(m.venue_id.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_knockout_needs_four_teams() {
        let result = FixtureGenerator::new().generate_seeded(&teams(3), &PhaseConfig::knockout(), 1);

        assert!(!result.success);
        assert!(result.matches.is_empty());
        assert_eq!(result.metadata.total_matches, 0);
        assert_eq!(result.metadata.total_rounds, 0);
        assert_eq!(
            result.error.as_deref(),
            Some("Insufficient teams: need at least 4, have 3")
        );
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let mut roster = teams(4);
        roster.push(Team::new("t2", "Again"));
        let result = FixtureGenerator::new().generate_seeded(&roster, &PhaseConfig::league(1), 1);

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Duplicate team in roster: t2"));
    }

    #[test]
    fn test_invalid_legs_rejected() {
        let result = FixtureGenerator::new().generate_seeded(
            &teams(4),
            &PhaseConfig::league(1).with_legs(3),
            1,
        );
        assert!(!result.success);
        assert!(result.error.unwrap().contains("home_away_legs"));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let result = FixtureGenerator::new().generate_seeded(&teams(4), &PhaseConfig::league(0), 1);
        assert!(!result.success);
    }

    #[test]
    fn test_single_group_rejected() {
        let result =
            FixtureGenerator::new().generate_seeded(&teams(4), &PhaseConfig::groups(None), 1);
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Group phase requires at least 2 groups, got 1")
        );
    }

    #[test]
    fn test_combined_falls_back_to_groups() {
        let mut config = PhaseConfig::groups(Some(2));
        config.phase_type = PhaseType::Combined;
        let result = FixtureGenerator::new().generate_seeded(&teams(8), &config, 9);

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.metadata.algorithm_used, GroupsGenerator::ALGORITHM);
        assert!(result.matches.iter().all(|m| m.group_id.is_some()));
    }

    #[test]
    fn test_knockout_through_orchestrator() {
        let result = FixtureGenerator::new().generate_seeded(
            &teams(8),
            &PhaseConfig::knockout().with_consolation(),
            1,
        );
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.matches.len(), 8);
        assert!(
            result
                .matches
                .iter()
                .any(|m| m.match_type == MatchType::Consolation)
        );
    }

    #[test]
    fn test_same_seed_same_groups() {
        let generator = FixtureGenerator::new();
        let config = PhaseConfig::groups(Some(3));
        let first = generator.generate_seeded(&teams(12), &config, 77);
        let second = generator.generate_seeded(&teams(12), &config, 77);
        assert_eq!(first.matches, second.matches);
    }

    #[test]
    fn test_hard_constraint_failure_discards_matches() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let mut blackout = SchedulingConstraint::blackout_dates(vec![start]).hard();
        blackout.config.max_shift_days = Some(0);
        let config = PhaseConfig::league(1).with_schedule(ScheduleSettings::weekly(start));

        let result =
            FixtureGenerator::with_constraints(vec![blackout]).generate_seeded(&teams(4), &config, 1);

        assert!(!result.success);
        assert!(result.matches.is_empty());
        assert!(result.error.unwrap().starts_with("Hard constraint violated"));
    }

    #[test]
    fn test_second_leg_blackout_is_enforced() {
        // Second legs of this calendar open on Aug 23
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let mut blackout =
            SchedulingConstraint::blackout_dates(vec![NaiveDate::from_ymd_opt(2025, 8, 23).unwrap()])
                .hard();
        blackout.config.max_shift_days = Some(0);
        let config = PhaseConfig::league(1)
            .with_legs(2)
            .with_schedule(ScheduleSettings::weekly(start));

        let result =
            FixtureGenerator::with_constraints(vec![blackout]).generate_seeded(&teams(4), &config, 1);

        assert!(!result.success);
        assert!(result.error.unwrap().contains("2025-08-23"));
    }

    #[test]
    fn test_soft_constraint_warns_but_succeeds() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let blackout = SchedulingConstraint::blackout_dates(vec![start]);
        let config = PhaseConfig::league(1).with_schedule(ScheduleSettings::weekly(start));

        let result =
            FixtureGenerator::with_constraints(vec![blackout]).generate_seeded(&teams(4), &config, 1);

        assert!(result.success);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_statistics() {
        let result = FixtureGenerator::new().generate_seeded(&teams(5), &PhaseConfig::league(1), 1);
        let stats = FixtureStatistics::from_matches(&result.matches);

        assert_eq!(stats.total_matches, 15);
        assert_eq!(stats.real_matches, 10);
        assert_eq!(stats.byes, 5);
        assert_eq!(stats.rounds, 5);
        assert!(stats.matches_per_team.values().all(|count| *count == 4));
        assert!(stats.byes_per_team.values().all(|count| *count == 1));
        assert!(stats.matches_per_round.values().all(|count| *count == 3));
    }
}
