//! Multi-division play with promotion and relegation.

use super::errors::FixtureResult;
use super::generator::FixtureAlgorithm;
use super::models::{GeneratedFixtures, GroupId, Level, PhaseConfig, Team, TeamId};
use super::round_robin::RoundRobinGenerator;
use crate::results::models::TeamStanding;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Direction of a between-season move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Promoted,
    Relegated,
}

/// A team changing division at season end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMovement {
    pub team_id: TeamId,
    pub from_level: usize,
    pub to_level: usize,
    pub kind: MovementKind,
}

/// Ranked divisions, each playing its own round robin
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelsGenerator {
    round_robin: RoundRobinGenerator,
}

fn level_name(level_number: usize, total: usize) -> String {
    if total == 1 {
        return "Single Division".to_string();
    }
    match level_number {
        1 => "First Division".to_string(),
        2 => "Second Division".to_string(),
        3 => "Third Division".to_string(),
        n => format!("Division {n}"),
    }
}

fn level_id(level_number: usize) -> GroupId {
    format!("level_{level_number}")
}

impl LevelsGenerator {
    pub const ALGORITHM: &'static str = "levels_round_robin";

    /// Create a new levels generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the roster into divisions by seed, strongest first
    pub fn divisions(&self, teams: &[Team], config: &PhaseConfig) -> Vec<Level> {
        let mut ranked: Vec<&Team> = teams.iter().collect();
        ranked.sort_by_key(|team| team.seed_rank());

        let chunks: Vec<&[&Team]> = ranked.chunks(config.level_size()).collect();
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let level_number = index + 1;
                Level {
                    id: level_id(level_number),
                    name: level_name(level_number, total),
                    level_number,
                    teams: chunk.iter().map(|team| (*team).clone()).collect(),
                }
            })
            .collect()
    }

    /// Round-robin fixtures for every division
    pub fn schedule_levels(
        &self,
        levels: &[Level],
        config: &PhaseConfig,
    ) -> FixtureResult<GeneratedFixtures> {
        let mut fixtures = GeneratedFixtures::default();

        for level in levels {
            let generated = self.round_robin.schedule(&level.teams, config);
            fixtures.total_rounds = fixtures.total_rounds.max(generated.total_rounds);
            fixtures.byes_generated += generated.byes_generated;
            fixtures
                .matches
                .extend(generated.matches.into_iter().map(|mut fixture| {
                    fixture.group_id = Some(level.id.clone());
                    fixture
                }));
        }

        Ok(fixtures)
    }

    /// Season-end promotions and relegations
    ///
    /// The top `promoted_per_level` of every division but the first go up;
    /// the bottom `relegated_per_level` of every division but the last go
    /// down. A team never both rises and falls, even in tiny divisions.
    pub fn movements(
        &self,
        levels: &[Level],
        standings: &HashMap<GroupId, Vec<TeamStanding>>,
        config: &PhaseConfig,
    ) -> Vec<LevelMovement> {
        let promoted = config.promoted_per_level.unwrap_or(0);
        let relegated = config.relegated_per_level.unwrap_or(0);
        let last_level = levels.iter().map(|l| l.level_number).max().unwrap_or(0);

        let mut moves = Vec::new();
        for level in levels {
            let Some(rows) = standings.get(&level.id) else {
                log::warn!("No standings for {}, nobody moves", level.name);
                continue;
            };
            let mut table: Vec<&TeamStanding> = rows.iter().collect();
            table.sort_by_key(|row| row.position);

            let mut going_up = HashSet::new();
            if level.level_number > 1 {
                for row in table.iter().take(promoted) {
                    going_up.insert(row.team_id.as_str());
                    moves.push(LevelMovement {
                        team_id: row.team_id.clone(),
                        from_level: level.level_number,
                        to_level: level.level_number - 1,
                        kind: MovementKind::Promoted,
                    });
                }
            }

            if level.level_number < last_level {
                for row in table
                    .iter()
                    .rev()
                    .filter(|row| !going_up.contains(row.team_id.as_str()))
                    .take(relegated)
                {
                    moves.push(LevelMovement {
                        team_id: row.team_id.clone(),
                        from_level: level.level_number,
                        to_level: level.level_number + 1,
                        kind: MovementKind::Relegated,
                    });
                }
            }
        }
        moves
    }

    /// Apply movements and re-seed so regeneration reproduces the new layout
    ///
    /// Within a division, relegated arrivals rank first, then the teams that
    /// stayed (in their previous order), then promoted arrivals.
    pub fn next_season(&self, levels: &[Level], movements: &[LevelMovement]) -> Vec<Level> {
        let moving: HashMap<&str, &LevelMovement> = movements
            .iter()
            .map(|movement| (movement.team_id.as_str(), movement))
            .collect();
        let roster: HashMap<&str, &Team> = levels
            .iter()
            .flat_map(|level| level.teams.iter())
            .map(|team| (team.id.as_str(), team))
            .collect();

        let arrivals = |level_number: usize, kind: MovementKind| -> Vec<Team> {
            movements
                .iter()
                .filter(|m| m.to_level == level_number && m.kind == kind)
                .filter_map(|m| roster.get(m.team_id.as_str()).map(|team| (*team).clone()))
                .collect()
        };

        let mut seed = 0u32;
        let total = levels.len();
        levels
            .iter()
            .map(|level| {
                let mut teams = arrivals(level.level_number, MovementKind::Relegated);
                teams.extend(
                    level
                        .teams
                        .iter()
                        .filter(|team| !moving.contains_key(team.id.as_str()))
                        .cloned(),
                );
                teams.extend(arrivals(level.level_number, MovementKind::Promoted));

                for team in &mut teams {
                    seed += 1;
                    team.seed = Some(seed);
                }

                Level {
                    id: level.id.clone(),
                    name: level_name(level.level_number, total),
                    level_number: level.level_number,
                    teams,
                }
            })
            .collect()
    }
}

impl FixtureAlgorithm for LevelsGenerator {
    fn algorithm_name(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        _rng: &mut dyn RngCore,
    ) -> FixtureResult<GeneratedFixtures> {
        let levels = self.divisions(teams, config);
        log::debug!("Levels: {} divisions of up to {}", levels.len(), config.level_size());
        self.schedule_levels(&levels, config)
    }
}
