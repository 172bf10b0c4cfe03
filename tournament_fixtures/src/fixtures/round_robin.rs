//! Round-robin scheduling using the circle method.

use super::errors::FixtureResult;
use super::generator::FixtureAlgorithm;
use super::models::{GeneratedFixtures, Match, PhaseConfig, Team};
use rand::RngCore;
use std::collections::HashMap;

/// Circle-method round-robin generator
///
/// The first team stays fixed while the others rotate one position per round.
/// Odd rosters get an empty slot; whoever is paired with it sits out that
/// round and receives a bye match.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinGenerator;

impl RoundRobinGenerator {
    pub const ALGORITHM: &'static str = "round_robin_circle_method";

    /// Create a new round-robin generator
    pub fn new() -> Self {
        Self
    }

    /// Generate every pass of the round robin
    ///
    /// An empty roster yields no matches.
    pub fn schedule(&self, teams: &[Team], config: &PhaseConfig) -> GeneratedFixtures {
        if teams.is_empty() {
            return GeneratedFixtures::default();
        }

        let mut slots: Vec<Option<&Team>> = teams.iter().map(Some).collect();
        let has_bye = slots.len() % 2 != 0;
        if has_bye {
            slots.push(None);
        }

        let rounds_per_cycle = (slots.len() - 1) as u32;
        let mut matches =
            Vec::with_capacity(slots.len() / 2 * rounds_per_cycle as usize * config.rounds as usize);

        for cycle in 1..=config.rounds {
            for inner_round in 1..=rounds_per_cycle {
                matches.extend(Self::single_round(&slots, inner_round, cycle));
            }
        }

        let total_rounds = rounds_per_cycle * config.rounds;
        GeneratedFixtures {
            matches,
            total_rounds,
            byes_generated: if has_bye { total_rounds as usize } else { 0 },
        }
    }

    fn single_round(slots: &[Option<&Team>], inner_round: u32, cycle: u32) -> Vec<Match> {
        let n = slots.len();
        let rotation = (inner_round as usize - 1) % (n - 1);

        let mut order = Vec::with_capacity(n);
        order.push(slots[0]);
        order.extend(slots[1..].iter().cycle().skip(rotation).take(n - 1).copied());

        let round_number = (cycle - 1) * (n as u32 - 1) + inner_round;

        (0..n / 2)
            .filter_map(|i| {
                let match_number = i as u32 + 1;
                let fixture = match (order[i], order[n - 1 - i]) {
                    (Some(first), Some(second)) => {
                        let mut fixture =
                            Match::fixture(&first.id, &second.id, round_number, match_number);
                        // Second pass mirrors the first; parity balances venues within a pass
                        if cycle % 2 == 0 {
                            fixture.swap_sides();
                        }
                        if inner_round % 2 == 0 {
                            fixture.swap_sides();
                        }
                        fixture
                    }
                    (Some(team), None) | (None, Some(team)) => {
                        Match::bye(&team.id, round_number, match_number)
                    }
                    (None, None) => return None,
                };
                Some(Match { cycle, ..fixture })
            })
            .collect()
    }

    /// Check that every pair of teams meets exactly `rounds` times
    pub fn validate_pair_counts(&self, matches: &[Match], rounds: u32) -> bool {
        let mut pairs: HashMap<(String, String), u32> = HashMap::new();
        for pair in matches.iter().filter_map(Match::pair_key) {
            *pairs.entry(pair).or_default() += 1;
        }
        pairs.values().all(|count| *count == rounds)
    }
}

impl FixtureAlgorithm for RoundRobinGenerator {
    fn algorithm_name(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        _rng: &mut dyn RngCore,
    ) -> FixtureResult<GeneratedFixtures> {
        Ok(self.schedule(teams, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn teams(n: usize) -> Vec<Team> {
        (1..=n)
            .map(|i| Team::new(format!("t{i}"), format!("Team {i}")))
            .collect()
    }

    #[test]
    fn test_four_teams_single_round_robin() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(4), &PhaseConfig::league(1));

        assert_eq!(fixtures.matches.len(), 6);
        assert_eq!(fixtures.total_rounds, 3);
        assert_eq!(fixtures.byes_generated, 0);

        let pairs: HashSet<_> = fixtures.matches.iter().filter_map(Match::pair_key).collect();
        assert_eq!(pairs.len(), 6, "Each pair should appear exactly once");
    }

    #[test]
    fn test_pairing_completeness_for_small_rosters() {
        let generator = RoundRobinGenerator::new();
        for n in 2..=12 {
            let fixtures = generator.schedule(&teams(n), &PhaseConfig::league(1));
            let real: Vec<_> = fixtures.matches.iter().filter(|m| !m.is_bye).collect();
            assert_eq!(real.len(), n * (n - 1) / 2, "wrong match count for {n} teams");
            assert!(generator.validate_pair_counts(&fixtures.matches, 1));
        }
    }

    #[test]
    fn test_five_teams_get_one_bye_each() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(5), &PhaseConfig::league(1));

        assert_eq!(fixtures.total_rounds, 5);
        assert_eq!(fixtures.byes_generated, 5);

        let mut byes: HashMap<String, usize> = HashMap::new();
        for m in fixtures.matches.iter().filter(|m| m.is_bye) {
            assert!(m.away_team_id.is_none());
            *byes.entry(m.home_team_id.clone().unwrap()).or_default() += 1;
        }
        assert_eq!(byes.len(), 5);
        assert!(byes.values().all(|count| *count == 1));

        let real = fixtures.matches.iter().filter(|m| !m.is_bye).count();
        assert_eq!(real, 10);
    }

    #[test]
    fn test_every_team_plays_once_per_round() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(7), &PhaseConfig::league(1));
        for round in 1..=fixtures.total_rounds {
            let mut seen = HashSet::new();
            for m in fixtures.matches.iter().filter(|m| m.round_number == round) {
                for team in [&m.home_team_id, &m.away_team_id].into_iter().flatten() {
                    assert!(seen.insert(team.clone()), "{team} twice in round {round}");
                }
            }
            assert_eq!(seen.len(), 7);
        }
    }

    #[test]
    fn test_double_round_robin_reverses_sides() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(4), &PhaseConfig::league(2));

        assert_eq!(fixtures.matches.len(), 12);
        assert_eq!(fixtures.total_rounds, 6);

        let mut sides: HashMap<(String, String), Vec<(String, String)>> = HashMap::new();
        for m in &fixtures.matches {
            let (home, away) = m.teams().unwrap();
            sides
                .entry(m.pair_key().unwrap())
                .or_default()
                .push((home.to_string(), away.to_string()));
        }

        assert_eq!(sides.len(), 6);
        for occurrences in sides.values() {
            assert_eq!(occurrences.len(), 2);
            assert_eq!(occurrences[0].0, occurrences[1].1);
            assert_eq!(occurrences[0].1, occurrences[1].0);
        }
    }

    #[test]
    fn test_global_round_numbers_and_cycles() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(4), &PhaseConfig::league(2));
        for m in &fixtures.matches {
            assert!((1..=6).contains(&m.round_number));
            let expected_cycle = if m.round_number <= 3 { 1 } else { 2 };
            assert_eq!(m.cycle, expected_cycle);
        }
    }

    #[test]
    fn test_match_numbers_unique_within_round() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(6), &PhaseConfig::league(1));
        let mut seen = HashSet::new();
        for m in &fixtures.matches {
            assert!(seen.insert((m.round_number, m.match_number)));
        }
    }

    #[test]
    fn test_empty_roster_yields_no_matches() {
        let fixtures = RoundRobinGenerator::new().schedule(&[], &PhaseConfig::league(1));
        assert!(fixtures.matches.is_empty());
        assert_eq!(fixtures.total_rounds, 0);
    }

    #[test]
    fn test_single_team_only_gets_a_bye() {
        let fixtures = RoundRobinGenerator::new().schedule(&teams(1), &PhaseConfig::league(1));
        assert_eq!(fixtures.matches.len(), 1);
        assert!(fixtures.matches[0].is_bye);
    }

    #[test]
    fn test_validate_pair_counts_detects_missing_pair() {
        let generator = RoundRobinGenerator::new();
        let mut fixtures = generator.schedule(&teams(4), &PhaseConfig::league(1));
        let extra = fixtures.matches[0].clone();
        fixtures.matches.push(extra);
        assert!(!generator.validate_pair_counts(&fixtures.matches, 1));
    }
}
