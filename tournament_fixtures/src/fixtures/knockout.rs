//! Seeded single-elimination brackets.
//!
//! Only the first round names teams. Later rounds are placeholders resolved
//! as results come in.
//!
//! The bracket interleaves the top half of the seed list with the reversed
//! bottom half. This keeps neighbouring seeds apart in the first round but
//! does not guarantee the top two seeds can only meet in the final.

use super::errors::{FixtureError, FixtureResult};
use super::generator::{FixtureAlgorithm, expand_legs};
use super::models::{GeneratedFixtures, Match, MatchType, PhaseConfig, Team};
use rand::RngCore;

/// Single-elimination bracket generator
#[derive(Debug, Clone, Copy, Default)]
pub struct KnockoutGenerator;

/// Bracket dimensions for a roster size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketSize {
    /// Number of rounds, ceil(log2 N)
    pub rounds: u32,
    /// Bracket slots, the next power of two
    pub slots: usize,
    /// Teams advancing without playing the first round
    pub byes: usize,
}

impl BracketSize {
    /// Compute bracket dimensions for `team_count` teams
    pub fn for_teams(team_count: usize) -> Self {
        let slots = team_count.max(1).next_power_of_two();
        Self {
            rounds: slots.trailing_zeros(),
            slots,
            byes: slots - team_count.max(1),
        }
    }
}

impl KnockoutGenerator {
    pub const ALGORITHM: &'static str = "knockout_seeded";

    /// Create a new knockout generator
    pub fn new() -> Self {
        Self
    }

    /// Order teams into bracket positions
    ///
    /// Teams are ranked by seed (unseeded last, input order kept among equals),
    /// then the top half is interleaved with the reversed bottom half.
    pub fn bracket<'a>(&self, teams: &'a [Team]) -> Vec<&'a Team> {
        let mut ranked: Vec<&Team> = teams.iter().collect();
        ranked.sort_by_key(|team| team.seed_rank());

        let top_len = ranked.len().div_ceil(2);
        let (top, bottom) = ranked.split_at(top_len);

        let mut bracket = Vec::with_capacity(ranked.len());
        let mut bottom_rev = bottom.iter().rev();
        for team in top {
            bracket.push(*team);
            if let Some(opponent) = bottom_rev.next() {
                bracket.push(*opponent);
            }
        }
        bracket
    }

    /// Build the full bracket
    ///
    /// # Arguments
    ///
    /// * `teams` - Roster, at least two teams
    /// * `config` - Phase configuration (only `has_consolation` is read)
    ///
    /// # Returns
    ///
    /// First-round fixtures and byes followed by placeholder rounds
    pub fn schedule(&self, teams: &[Team], config: &PhaseConfig) -> FixtureResult<GeneratedFixtures> {
        if teams.len() < 2 {
            return Err(FixtureError::InsufficientTeams {
                needed: 2,
                actual: teams.len(),
            });
        }

        let size = BracketSize::for_teams(teams.len());
        let bracket = self.bracket(teams);
        let playing = teams.len() - size.byes;
        let first_round_type = Self::round_type(1, size.rounds);

        let mut matches = Vec::with_capacity(size.slots);
        let mut match_number = 1;

        for pair in bracket[..playing].chunks_exact(2) {
            let mut fixture = Match::fixture(&pair[0].id, &pair[1].id, 1, match_number);
            fixture.match_type = first_round_type;
            matches.push(fixture);
            match_number += 1;
        }

        for team in &bracket[playing..] {
            let mut bye = Match::bye(&team.id, 1, match_number);
            bye.match_type = first_round_type;
            matches.push(bye);
            match_number += 1;
        }

        let mut round_matches = teams.len().div_ceil(2);
        for round in 2..=size.rounds {
            round_matches = round_matches.div_ceil(2);
            let match_type = Self::round_type(round, size.rounds);
            for number in 1..=round_matches {
                matches.push(Match::placeholder(round, number as u32, match_type));
            }
        }

        if config.has_consolation && size.rounds > 1 {
            let final_count = matches
                .iter()
                .filter(|m| m.round_number == size.rounds)
                .count() as u32;
            matches.push(Match::placeholder(
                size.rounds,
                final_count + 1,
                MatchType::Consolation,
            ));
        }

        log::debug!(
            "Knockout bracket: {} teams, {} rounds, {} byes",
            teams.len(),
            size.rounds,
            size.byes
        );

        Ok(GeneratedFixtures {
            matches,
            total_rounds: size.rounds,
            byes_generated: size.byes,
        })
    }

    /// Double every non-bye tie when the phase is two-legged
    pub fn generate_legs(&self, matches: Vec<Match>, config: &PhaseConfig) -> Vec<Match> {
        expand_legs(matches, config)
    }

    /// Opening ties are regular fixtures unless the bracket is a lone final
    fn round_type(round: u32, total_rounds: u32) -> MatchType {
        if round == total_rounds {
            MatchType::Final
        } else if round == 1 {
            MatchType::Regular
        } else {
            MatchType::Playoff
        }
    }
}

impl FixtureAlgorithm for KnockoutGenerator {
    fn algorithm_name(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        _rng: &mut dyn RngCore,
    ) -> FixtureResult<GeneratedFixtures> {
        self.schedule(teams, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(n: usize) -> Vec<Team> {
        (1..=n)
            .map(|i| Team::new(format!("t{i}"), format!("Team {i}")).with_seed(i as u32))
            .collect()
    }

    fn ids(teams: &[&Team]) -> Vec<String> {
        teams.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_bracket_size() {
        assert_eq!(
            BracketSize::for_teams(5),
            BracketSize {
                rounds: 3,
                slots: 8,
                byes: 3
            }
        );
        assert_eq!(BracketSize::for_teams(8).byes, 0);
        assert_eq!(BracketSize::for_teams(8).rounds, 3);
        assert_eq!(BracketSize::for_teams(9).rounds, 4);
    }

    #[test]
    fn test_eight_team_bracket() {
        let fixtures = KnockoutGenerator::new()
            .schedule(&seeded(8), &PhaseConfig::knockout())
            .unwrap();

        assert_eq!(fixtures.total_rounds, 3);
        assert_eq!(fixtures.byes_generated, 0);
        assert_eq!(fixtures.matches.len(), 7);

        let first: Vec<_> = fixtures
            .matches
            .iter()
            .filter(|m| m.round_number == 1)
            .collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].home_team_id.as_deref(), Some("t1"));
        assert_eq!(first[0].away_team_id.as_deref(), Some("t8"));

        let finals: Vec<_> = fixtures
            .matches
            .iter()
            .filter(|m| m.match_type == MatchType::Final)
            .collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].round_number, 3);
        assert!(finals[0].home_team_id.is_none());

        assert!(first.iter().all(|m| m.match_type == MatchType::Regular));
        assert!(
            fixtures
                .matches
                .iter()
                .filter(|m| m.round_number == 2)
                .all(|m| m.match_type == MatchType::Playoff)
        );
    }

    #[test]
    fn test_two_team_bracket_is_a_final() {
        let fixtures = KnockoutGenerator::new()
            .schedule(&seeded(2), &PhaseConfig::knockout())
            .unwrap();

        assert_eq!(fixtures.matches.len(), 1);
        assert_eq!(fixtures.matches[0].match_type, MatchType::Final);
    }

    #[test]
    fn test_five_teams_get_three_byes() {
        let fixtures = KnockoutGenerator::new()
            .schedule(&seeded(5), &PhaseConfig::knockout())
            .unwrap();

        assert_eq!(fixtures.total_rounds, 3);
        assert_eq!(fixtures.byes_generated, 3);

        let first: Vec<_> = fixtures
            .matches
            .iter()
            .filter(|m| m.round_number == 1)
            .collect();
        let real = first.iter().filter(|m| !m.is_bye).count();
        let byes = first.iter().filter(|m| m.is_bye).count();
        assert_eq!(real, 1);
        assert_eq!(byes, 3);

        let round_two = fixtures
            .matches
            .iter()
            .filter(|m| m.round_number == 2)
            .count();
        assert_eq!(round_two, 2);
    }

    #[test]
    fn test_bracket_interleaves_halves() {
        let teams = seeded(6);
        let generator = KnockoutGenerator::new();
        assert_eq!(
            ids(&generator.bracket(&teams)),
            vec!["t1", "t6", "t2", "t5", "t3", "t4"]
        );
    }

    #[test]
    fn test_unseeded_teams_rank_last() {
        let teams = vec![
            Team::new("u1", "Unseeded 1"),
            Team::new("s2", "Seed 2").with_seed(2),
            Team::new("u2", "Unseeded 2"),
            Team::new("s1", "Seed 1").with_seed(1),
        ];
        let bracket = KnockoutGenerator::new().bracket(&teams);
        assert_eq!(ids(&bracket), vec!["s1", "u2", "s2", "u1"]);
    }

    #[test]
    fn test_consolation_match_in_final_round() {
        let fixtures = KnockoutGenerator::new()
            .schedule(&seeded(8), &PhaseConfig::knockout().with_consolation())
            .unwrap();

        let consolation: Vec<_> = fixtures
            .matches
            .iter()
            .filter(|m| m.match_type == MatchType::Consolation)
            .collect();
        assert_eq!(consolation.len(), 1);
        assert_eq!(consolation[0].round_number, 3);
        assert_eq!(consolation[0].match_number, 2);
        assert_eq!(fixtures.total_rounds, 3);
    }

    #[test]
    fn test_two_legged_ties() {
        let generator = KnockoutGenerator::new();
        let config = PhaseConfig::knockout().with_legs(2);
        let fixtures = generator.schedule(&seeded(4), &config).unwrap();
        let legs = generator.generate_legs(fixtures.matches, &config);

        assert_eq!(legs.len(), 6);
        let second_legs: Vec<_> = legs.iter().filter(|m| m.leg_number == 2).collect();
        assert_eq!(second_legs.len(), 3);
        let first_tie = legs
            .iter()
            .find(|m| m.leg_number == 2 && m.round_number == 1 && m.match_number == 2)
            .unwrap();
        assert_eq!(first_tie.home_team_id.as_deref(), Some("t4"));
        assert_eq!(first_tie.away_team_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_rejects_single_team() {
        let result = KnockoutGenerator::new().schedule(&seeded(1), &PhaseConfig::knockout());
        assert!(matches!(
            result,
            Err(FixtureError::InsufficientTeams { needed: 2, actual: 1 })
        ));
    }
}
