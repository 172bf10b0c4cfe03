//! Group-stage partitioning and fixtures.

use super::errors::{FixtureError, FixtureResult};
use super::generator::FixtureAlgorithm;
use super::models::{GeneratedFixtures, Group, GroupId, PhaseConfig, Team, TeamId};
use super::round_robin::RoundRobinGenerator;
use crate::results::models::TeamStanding;
use rand::RngCore;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Splits a roster into groups and plays a round robin inside each
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsGenerator {
    round_robin: RoundRobinGenerator,
}

/// Spreadsheet-style group letter: 0 -> A, 25 -> Z, 26 -> AA
fn group_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

impl GroupsGenerator {
    pub const ALGORITHM: &'static str = "groups_round_robin";

    /// Create a new groups generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign teams to groups
    ///
    /// Seeded teams are dealt one per group in seed order. The remaining
    /// teams are shuffled and each goes to the least-populated group that
    /// still has room.
    pub fn partition(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        rng: &mut dyn RngCore,
    ) -> FixtureResult<Vec<Group>> {
        let groups_count = config.effective_groups_count(teams.len());
        if groups_count < 2 {
            return Err(FixtureError::InvalidGroupCount(groups_count));
        }

        let capacity = config
            .teams_per_group
            .filter(|size| *size > 0)
            .unwrap_or_else(|| teams.len().div_ceil(groups_count));
        if capacity * groups_count < teams.len() {
            return Err(FixtureError::InvalidConfig(format!(
                "{groups_count} groups of {capacity} cannot hold {} teams",
                teams.len()
            )));
        }

        let (mut seeded, mut pool): (Vec<&Team>, Vec<&Team>) =
            teams.iter().partition(|team| team.seed.is_some());
        seeded.sort_by_key(|team| team.seed_rank());

        let mut slots: Vec<Vec<Team>> = vec![Vec::with_capacity(capacity); groups_count];
        for (i, team) in seeded.into_iter().enumerate() {
            slots[i % groups_count].push(team.clone());
        }

        pool.shuffle(rng);
        for team in pool {
            let target = slots
                .iter()
                .enumerate()
                .filter(|(_, group)| group.len() < capacity)
                .min_by_key(|(index, group)| (group.len(), *index))
                .map(|(index, _)| index)
                .ok_or_else(|| {
                    FixtureError::InvalidConfig("no group has room left".to_string())
                })?;
            slots[target].push(team.clone());
        }

        Ok(slots
            .into_iter()
            .enumerate()
            .map(|(index, teams)| {
                let letter = group_letter(index);
                Group {
                    id: format!("group_{}", letter.to_lowercase()),
                    name: format!("Group {letter}"),
                    teams,
                }
            })
            .collect())
    }

    /// Round-robin fixtures for already formed groups
    pub fn schedule_groups(
        &self,
        groups: &[Group],
        config: &PhaseConfig,
    ) -> FixtureResult<GeneratedFixtures> {
        let mut fixtures = GeneratedFixtures::default();

        for group in groups {
            // A lone team only gets a bye
            if group.teams.is_empty() {
                return Err(FixtureError::GroupGeneration {
                    group: group.name.clone(),
                    source: Box::new(FixtureError::InsufficientTeams {
                        needed: 1,
                        actual: 0,
                    }),
                });
            }

            let generated = self.round_robin.schedule(&group.teams, config);
            log::debug!(
                "{}: {} teams, {} matches",
                group.name,
                group.teams.len(),
                generated.matches.len()
            );

            fixtures.total_rounds = fixtures.total_rounds.max(generated.total_rounds);
            fixtures.byes_generated += generated.byes_generated;
            fixtures
                .matches
                .extend(generated.matches.into_iter().map(|mut fixture| {
                    fixture.group_id = Some(group.id.clone());
                    fixture
                }));
        }

        Ok(fixtures)
    }

    /// Teams advancing from each group, group winners first
    ///
    /// Returns A1, B1, C1, A2, B2, C2, ... for the top `qualified_per_group`
    /// positions. Groups without standings contribute nobody.
    pub fn qualified_teams(
        &self,
        groups: &[Group],
        standings: &HashMap<GroupId, Vec<TeamStanding>>,
        qualified_per_group: usize,
    ) -> Vec<TeamId> {
        let ranked: Vec<Vec<&TeamStanding>> = groups
            .iter()
            .map(|group| {
                let mut table: Vec<&TeamStanding> = standings
                    .get(&group.id)
                    .map(|rows| rows.iter().collect())
                    .unwrap_or_default();
                table.sort_by_key(|row| row.position);
                table
            })
            .collect();

        let ranked = &ranked;
        (0..qualified_per_group)
            .flat_map(move |place| {
                ranked
                    .iter()
                    .filter_map(move |table| table.get(place).map(|row| row.team_id.clone()))
            })
            .collect()
    }
}

impl FixtureAlgorithm for GroupsGenerator {
    fn algorithm_name(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn generate(
        &self,
        teams: &[Team],
        config: &PhaseConfig,
        rng: &mut dyn RngCore,
    ) -> FixtureResult<GeneratedFixtures> {
        let groups = self.partition(teams, config, rng)?;
        self.schedule_groups(&groups, config)
    }
}
