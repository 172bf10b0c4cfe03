//! In-memory `ResultsStore` used by tests and the command-line tool.
//!
//! All state sits behind one mutex, so `commit_result` is atomic: readers
//! see either the old match and standings or the new ones, never a mix.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::repository::{ResultsStore, StoreError, StoreResult};
use crate::fixtures::models::{GroupId, Match, MatchId, Team, TeamId};
use crate::results::models::{MatchEvent, MatchRecord, PhaseId, StandingsUpdate};

#[derive(Debug, Default)]
struct State {
    matches: HashMap<MatchId, MatchRecord>,
    /// Insertion order, for stable listings
    order: Vec<MatchId>,
    teams: HashMap<TeamId, String>,
    standings: HashMap<(PhaseId, Option<GroupId>), StandingsUpdate>,
    events: Vec<MatchEvent>,
}

/// Mutex-guarded store keeping everything in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_next_commit: AtomicBool,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    /// Register display names for teams
    pub fn register_teams(&self, teams: &[Team]) -> StoreResult<()> {
        let mut state = self.state()?;
        for team in teams {
            state.teams.insert(team.id.clone(), team.name.clone());
        }
        Ok(())
    }

    /// Store an existing record as-is (keeps its ID)
    pub fn insert_record(&self, record: MatchRecord) -> StoreResult<MatchId> {
        let id = record
            .fixture
            .id
            .clone()
            .ok_or_else(|| StoreError::Conflict("record has no match ID".to_string()))?;
        let mut state = self.state()?;
        if state.matches.insert(id.clone(), record).is_none() {
            state.order.push(id.clone());
        }
        Ok(id)
    }

    /// Events stored for a match, in submission order
    pub fn events_for(&self, match_id: &str) -> StoreResult<Vec<MatchEvent>> {
        Ok(self
            .state()?
            .events
            .iter()
            .filter(|event| event.match_id == match_id)
            .cloned()
            .collect())
    }

    /// Make the next `commit_result` fail without writing anything
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn in_order<'a>(state: &'a State) -> impl Iterator<Item = &'a MatchRecord> + 'a {
        state.order.iter().filter_map(|id| state.matches.get(id))
    }
}

#[async_trait]
impl ResultsStore for InMemoryStore {
    async fn find_match(&self, match_id: &str) -> StoreResult<Option<MatchRecord>> {
        Ok(self.state()?.matches.get(match_id).cloned())
    }

    async fn completed_matches(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> StoreResult<Vec<MatchRecord>> {
        let state = self.state()?;
        Ok(Self::in_order(&state)
            .filter(|record| {
                record.phase_id == phase_id
                    && record.fixture.group_id.as_deref() == group_id
                    && record.counts_for_standings()
            })
            .cloned()
            .collect())
    }

    async fn phase_matches(&self, phase_id: &str) -> StoreResult<Vec<MatchRecord>> {
        let state = self.state()?;
        Ok(Self::in_order(&state)
            .filter(|record| record.phase_id == phase_id)
            .cloned()
            .collect())
    }

    async fn team_names(&self, team_ids: &[TeamId]) -> StoreResult<HashMap<TeamId, String>> {
        let state = self.state()?;
        Ok(team_ids
            .iter()
            .filter_map(|id| state.teams.get(id).map(|name| (id.clone(), name.clone())))
            .collect())
    }

    async fn get_standings(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> StoreResult<Option<StandingsUpdate>> {
        let key = (phase_id.to_string(), group_id.map(str::to_string));
        Ok(self.state()?.standings.get(&key).cloned())
    }

    async fn upsert_standings(&self, update: StandingsUpdate) -> StoreResult<()> {
        let key = (update.phase_id.clone(), update.group_id.clone());
        self.state()?.standings.insert(key, update);
        Ok(())
    }

    async fn commit_result(
        &self,
        record: MatchRecord,
        events: Vec<MatchEvent>,
        update: StandingsUpdate,
    ) -> StoreResult<()> {
        let mut state = self.state()?;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("commit rejected".to_string()));
        }

        let id = record
            .fixture
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("match without ID".to_string()))?;
        if !state.matches.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let key = (update.phase_id.clone(), update.group_id.clone());
        state.matches.insert(id.clone(), record);
        state.events.retain(|event| event.match_id != id);
        state.events.extend(events);
        state.standings.insert(key, update);
        Ok(())
    }

    async fn insert_fixtures(
        &self,
        phase_id: &str,
        matches: Vec<Match>,
    ) -> StoreResult<Vec<MatchRecord>> {
        let mut state = self.state()?;
        let mut stored = Vec::with_capacity(matches.len());

        for mut fixture in matches {
            let id = match fixture.id.take() {
                Some(existing) if state.matches.contains_key(&existing) => {
                    return Err(StoreError::Conflict(format!(
                        "match {existing} already exists"
                    )));
                }
                Some(existing) => existing,
                None => Uuid::new_v4().to_string(),
            };
            fixture.id = Some(id.clone());

            let mut record = MatchRecord::scheduled(phase_id, fixture);
            record.updated_at = Some(Utc::now());
            state.matches.insert(id.clone(), record.clone());
            state.order.push(id);
            stored.push(record);
        }

        log::debug!("Stored {} fixtures for phase {}", stored.len(), phase_id);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::models::{MatchStatus, Scoreline, TeamStanding};

    fn update(phase: &str, group: Option<&str>, leader: &str) -> StandingsUpdate {
        let mut row = TeamStanding::new(leader, leader);
        row.position = 1;
        StandingsUpdate {
            phase_id: phase.to_string(),
            group_id: group.map(str::to_string),
            standings: vec![row],
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_fixtures_assigns_ids() {
        let store = InMemoryStore::new();
        let stored = store
            .insert_fixtures(
                "p1",
                vec![Match::fixture("a", "b", 1, 1), Match::fixture("c", "d", 1, 2)],
            )
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        let first_id = stored[0].fixture.id.clone().unwrap();
        assert_ne!(Some(first_id.clone()), stored[1].fixture.id);
        assert!(Uuid::parse_str(&first_id).is_ok());

        let found = store.find_match(&first_id).await.unwrap().unwrap();
        assert_eq!(found.status, MatchStatus::Scheduled);
        assert_eq!(store.phase_matches("p1").await.unwrap().len(), 2);
        assert!(store.phase_matches("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = InMemoryStore::new();
        let mut fixture = Match::fixture("a", "b", 1, 1);
        fixture.id = Some("m1".to_string());
        store.insert_fixtures("p1", vec![fixture.clone()]).await.unwrap();

        let err = store.insert_fixtures("p1", vec![fixture]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_completed_matches_filtered_by_group() {
        let store = InMemoryStore::new();
        let mut in_group = Match::fixture("a", "b", 1, 1);
        in_group.group_id = Some("group_a".to_string());
        let stored = store
            .insert_fixtures("p1", vec![in_group, Match::fixture("c", "d", 1, 2)])
            .await
            .unwrap();

        for record in stored {
            let mut done = record.clone();
            done.status = MatchStatus::Completed;
            done.score = Some(Scoreline::default());
            let scope_group = done.fixture.group_id.clone();
            store
                .commit_result(
                    done,
                    vec![],
                    update("p1", scope_group.as_deref(), "a"),
                )
                .await
                .unwrap();
        }

        let grouped = store.completed_matches("p1", Some("group_a")).await.unwrap();
        assert_eq!(grouped.len(), 1);
        let ungrouped = store.completed_matches("p1", None).await.unwrap();
        assert_eq!(ungrouped.len(), 1);
        assert_eq!(ungrouped[0].fixture.home_team_id.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let store = InMemoryStore::new();
        let stored = store
            .insert_fixtures("p1", vec![Match::fixture("a", "b", 1, 1)])
            .await
            .unwrap();
        let mut done = stored[0].clone();
        done.status = MatchStatus::Completed;

        store.fail_next_commit();
        let err = store
            .commit_result(done.clone(), vec![], update("p1", None, "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        let id = done.fixture.id.clone().unwrap();
        let found = store.find_match(&id).await.unwrap().unwrap();
        assert_eq!(found.status, MatchStatus::Scheduled);
        assert!(store.get_standings("p1", None).await.unwrap().is_none());

        // Only the next commit fails
        store
            .commit_result(done, vec![], update("p1", None, "a"))
            .await
            .unwrap();
        assert!(store.get_standings("p1", None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_commit_unknown_match() {
        let store = InMemoryStore::new();
        let mut fixture = Match::fixture("a", "b", 1, 1);
        fixture.id = Some("ghost".to_string());
        let err = store
            .commit_result(
                MatchRecord::scheduled("p1", fixture),
                vec![],
                update("p1", None, "a"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_team_names_skip_unknown() {
        let store = InMemoryStore::new();
        store
            .register_teams(&[Team::new("a", "Alpha"), Team::new("b", "Bravo")])
            .unwrap();

        let names = store
            .team_names(&["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["a"], "Alpha");
    }

    #[tokio::test]
    async fn test_upsert_standings_replaces() {
        let store = InMemoryStore::new();
        store.upsert_standings(update("p1", None, "a")).await.unwrap();
        store.upsert_standings(update("p1", None, "b")).await.unwrap();

        let stored = store.get_standings("p1", None).await.unwrap().unwrap();
        assert_eq!(stored.standings[0].team_id, "b");
    }
}
