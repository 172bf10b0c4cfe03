//! Standings computation and tie-breaking.
//!
//! Tables are always rebuilt from the full list of completed matches, never
//! patched, so recomputing the same history gives the same table.
//!
//! Tie-breaks refine blocks of teams that are level on every earlier rule.
//! For plain statistics this is the same as sorting by the whole rule chain;
//! head-to-head differs because its mini-league only covers the teams in
//! the block.

use super::models::{
    ClassificationConfig, FormResult, HeadToHead, MatchRecord, Scoreline, Side, SortOrder,
    TeamStanding, TiebreakType, TiebreakingRule,
};
use crate::fixtures::models::TeamId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

const FORM_LENGTH: usize = 5;

/// How a match counts for the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Win(Side),
    Shootout(Side),
    Draw,
}

#[derive(Debug, Clone, Default)]
struct Tally {
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    points: u32,
    form: Vec<FormResult>,
    fair_play: u32,
}

impl Tally {
    fn record(&mut self, scored: u32, conceded: u32, points: u32, result: FormResult) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.points += points;
        match result {
            FormResult::W => self.wins += 1,
            FormResult::D => self.draws += 1,
            FormResult::L => self.losses += 1,
        }
        self.form.push(result);
    }

    fn goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }
}

/// Builds ranked tables from completed matches
#[derive(Debug, Clone, Copy)]
pub struct StandingsCalculator<'a> {
    config: &'a ClassificationConfig,
}

impl<'a> StandingsCalculator<'a> {
    /// Create a new calculator
    pub fn new(config: &'a ClassificationConfig) -> Self {
        Self { config }
    }

    fn outcome(&self, score: &Scoreline) -> Outcome {
        let (home, away) = if self.config.count_extra_time_as_draw {
            (score.home_score, score.away_score)
        } else {
            score.goals()
        };
        match home.cmp(&away) {
            Ordering::Greater => Outcome::Win(Side::Home),
            Ordering::Less => Outcome::Win(Side::Away),
            Ordering::Equal => score
                .shootout_side()
                .map_or(Outcome::Draw, Outcome::Shootout),
        }
    }

    /// Accumulate matches already in playing order
    fn tally<'m>(&self, records: &[&'m MatchRecord]) -> HashMap<&'m str, Tally> {
        let win = self.config.points_for_win;
        let draw = self.config.points_for_draw;
        let loss = self.config.points_for_loss;
        let shootout = self.config.penalty_shootout_winner_points.unwrap_or(win);

        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        for record in records {
            let (Some((home, away)), Some(score)) = (record.fixture.teams(), &record.score) else {
                continue;
            };
            let (home_goals, away_goals) = score.goals();

            let (home_points, away_points, home_result, away_result) = match self.outcome(score) {
                Outcome::Win(Side::Home) => (win, loss, FormResult::W, FormResult::L),
                Outcome::Win(Side::Away) => (loss, win, FormResult::L, FormResult::W),
                Outcome::Shootout(Side::Home) => (shootout, draw, FormResult::W, FormResult::L),
                Outcome::Shootout(Side::Away) => (draw, shootout, FormResult::L, FormResult::W),
                Outcome::Draw => (draw, draw, FormResult::D, FormResult::D),
            };

            tallies
                .entry(home)
                .or_default()
                .record(home_goals, away_goals, home_points, home_result);
            tallies
                .entry(away)
                .or_default()
                .record(away_goals, home_goals, away_points, away_result);

            for event in &record.events {
                let team = if event.team_id == home {
                    home
                } else if event.team_id == away {
                    away
                } else {
                    continue;
                };
                tallies.entry(team).or_default().fair_play +=
                    event.event_type.fair_play_points();
            }
        }
        tallies
    }

    fn counted<'m>(records: &'m [MatchRecord]) -> Vec<&'m MatchRecord> {
        let mut counted: Vec<&MatchRecord> = records
            .iter()
            .filter(|record| record.counts_for_standings())
            .collect();
        counted.sort_by_key(|record| record.fixture.chronological_key());
        counted
    }

    /// Ranked table for a scope
    ///
    /// # Arguments
    ///
    /// * `records` - Matches of the scope; only completed real fixtures count
    /// * `team_names` - Roster with display names; teams that have not
    ///   played yet still get a row
    ///
    /// # Returns
    ///
    /// Rows ordered by the tie-break chain with 1-based positions
    pub fn calculate(
        &self,
        records: &[MatchRecord],
        team_names: &HashMap<TeamId, String>,
    ) -> Vec<TeamStanding> {
        let counted = Self::counted(records);
        let tallies = self.tally(&counted);

        let mut ids: BTreeSet<&str> = team_names.keys().map(String::as_str).collect();
        ids.extend(tallies.keys().copied());

        let rows = ids
            .into_iter()
            .map(|id| {
                let name = team_names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string());
                let mut row = TeamStanding::new(id, name);
                let tally = tallies.get(id).cloned().unwrap_or_default();
                row.matches_played = tally.played;
                row.wins = tally.wins;
                row.draws = tally.draws;
                row.losses = tally.losses;
                row.goals_for = tally.goals_for;
                row.goals_against = tally.goals_against;
                row.goal_difference = tally.goal_difference();
                row.points = tally.points;
                row.fair_play_points = Some(tally.fair_play);
                let keep_from = tally.form.len().saturating_sub(FORM_LENGTH);
                row.form = tally.form[keep_from..].to_vec();
                row
            })
            .collect();

        self.rank(rows, &counted)
    }

    /// Direct record between two teams
    pub fn head_to_head(&self, records: &[MatchRecord], team_a: &str, team_b: &str) -> HeadToHead {
        let direct: Vec<&MatchRecord> = Self::counted(records)
            .into_iter()
            .filter(|record| record.fixture.involves(team_a) && record.fixture.involves(team_b))
            .collect();
        let tallies = self.tally(&direct);
        let a = tallies.get(team_a).cloned().unwrap_or_default();
        let b = tallies.get(team_b).cloned().unwrap_or_default();

        HeadToHead {
            matches_played: direct.len() as u32,
            team_a_points: a.points,
            team_b_points: b.points,
            team_a_goals: a.goals_for,
            team_b_goals: b.goals_for,
        }
    }

    fn rank(&self, rows: Vec<TeamStanding>, counted: &[&MatchRecord]) -> Vec<TeamStanding> {
        let mut rules = self.config.tiebreaking_rules.clone();
        rules.sort_by_key(|rule| rule.priority);

        let mut blocks = vec![rows];
        for rule in &rules {
            if blocks.iter().all(|block| block.len() < 2) {
                break;
            }
            blocks = blocks
                .into_iter()
                .flat_map(|block| self.refine(block, rule, counted))
                .collect();
        }

        let mut ranked: Vec<TeamStanding> = blocks.into_iter().flatten().collect();
        for (index, row) in ranked.iter_mut().enumerate() {
            row.position = index as u32 + 1;
        }
        ranked
    }

    /// Split a block of level teams by one rule
    fn refine(
        &self,
        block: Vec<TeamStanding>,
        rule: &TiebreakingRule,
        counted: &[&MatchRecord],
    ) -> Vec<Vec<TeamStanding>> {
        if block.len() < 2 {
            return vec![block];
        }

        let mut keyed: Vec<((i64, i64), TeamStanding)> = match rule.rule_type {
            TiebreakType::HeadToHead => self.head_to_head_keys(block, counted),
            TiebreakType::Random => self.random_keys(block),
            stat => block
                .into_iter()
                .map(|row| {
                    let value = match stat {
                        TiebreakType::Points => i64::from(row.points),
                        TiebreakType::GoalDifference => i64::from(row.goal_difference),
                        TiebreakType::GoalsFor => i64::from(row.goals_for),
                        TiebreakType::GoalsAgainst => i64::from(row.goals_against),
                        TiebreakType::FairPlay => i64::from(row.fair_play_points.unwrap_or(0)),
                        TiebreakType::HeadToHead | TiebreakType::Random => 0,
                    };
                    ((value, 0), row)
                })
                .collect(),
        };

        match (rule.rule_type, rule.order) {
            (TiebreakType::Random, _) | (_, SortOrder::Asc) => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            (_, SortOrder::Desc) => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }

        let mut split: Vec<Vec<TeamStanding>> = Vec::new();
        let mut last_key = None;
        for (key, row) in keyed {
            match split.last_mut() {
                Some(current) if last_key == Some(key) => current.push(row),
                _ => split.push(vec![row]),
            }
            last_key = Some(key);
        }
        split
    }

    /// Mini-league among the block: points, then goal difference
    fn head_to_head_keys(
        &self,
        block: Vec<TeamStanding>,
        counted: &[&MatchRecord],
    ) -> Vec<((i64, i64), TeamStanding)> {
        let members: HashSet<&str> = block.iter().map(|row| row.team_id.as_str()).collect();
        let direct: Vec<&MatchRecord> = counted
            .iter()
            .copied()
            .filter(|record| {
                record
                    .fixture
                    .teams()
                    .is_some_and(|(home, away)| members.contains(home) && members.contains(away))
            })
            .collect();
        let tallies = self.tally(&direct);

        let keyed: Vec<((i64, i64), TeamStanding)> = block
            .iter()
            .map(|row| {
                let tally = tallies.get(row.team_id.as_str()).cloned().unwrap_or_default();
                let mut row = row.clone();
                row.head_to_head_points = Some(tally.points);
                row.head_to_head_goal_diff = Some(tally.goal_difference());
                (
                    (i64::from(tally.points), i64::from(tally.goal_difference())),
                    row,
                )
            })
            .collect();
        keyed
    }

    /// Reproducible shuffle: teams in ID order, permuted by the seeded RNG
    fn random_keys(&self, mut block: Vec<TeamStanding>) -> Vec<((i64, i64), TeamStanding)> {
        block.sort_by(|a, b| a.team_id.cmp(&b.team_id));
        let mut slots: Vec<i64> = (0..block.len() as i64).collect();
        let mut rng = StdRng::seed_from_u64(self.config.random_seed);
        slots.shuffle(&mut rng);

        slots
            .into_iter()
            .zip(block)
            .map(|(slot, row)| ((slot, 0), row))
            .collect()
    }
}
