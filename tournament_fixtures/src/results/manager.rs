//! Results manager: records match outcomes and keeps standings current.

use super::{
    errors::{ResultsError, ResultsResult},
    models::{
        ClassificationConfig, HeadToHead, MatchRecord, MatchResult, PhaseId, Scoreline,
        StandingsScope, StandingsUpdate, TeamStanding,
    },
    standings::StandingsCalculator,
};
use crate::db::ResultsStore;
use crate::fixtures::models::TeamId;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A stored result together with the table it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub record: MatchRecord,
    pub standings: StandingsUpdate,
}

/// Results manager
///
/// Submissions touching the same `(phase, group)` scope are serialized;
/// different scopes proceed in parallel.
pub struct ResultsManager<S: ResultsStore> {
    store: Arc<S>,
    scope_locks: Arc<RwLock<HashMap<StandingsScope, Arc<Mutex<()>>>>>,
    classification: Arc<RwLock<HashMap<PhaseId, ClassificationConfig>>>,
}

impl<S: ResultsStore> Clone for ResultsManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scope_locks: Arc::clone(&self.scope_locks),
            classification: Arc::clone(&self.classification),
        }
    }
}

impl<S: ResultsStore> ResultsManager<S> {
    /// Create a new results manager
    ///
    /// # Arguments
    ///
    /// * `store` - Backing store for matches and standings
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scope_locks: Arc::new(RwLock::new(HashMap::new())),
            classification: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Set the points table and tie-breaks used for a phase
    pub async fn set_classification(&self, phase_id: impl Into<PhaseId>, config: ClassificationConfig) {
        self.classification
            .write()
            .await
            .insert(phase_id.into(), config);
    }

    async fn classification_for(&self, phase_id: &str) -> ClassificationConfig {
        self.classification
            .read()
            .await
            .get(phase_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn scope_lock(&self, scope: &StandingsScope) -> Arc<Mutex<()>> {
        if let Some(lock) = self.scope_locks.read().await.get(scope) {
            return Arc::clone(lock);
        }
        let mut locks = self.scope_locks.write().await;
        Arc::clone(locks.entry(scope.clone()).or_default())
    }

    /// Record a match result and recompute the standings of its scope
    ///
    /// The updated match, its events and the new table are written with a
    /// single store commit.
    ///
    /// # Arguments
    ///
    /// * `result` - Submitted scores, status and events
    ///
    /// # Returns
    ///
    /// * `ResultsResult<RecordedResult>` - Stored record and new standings
    pub async fn record_match_result(&self, result: MatchResult) -> ResultsResult<RecordedResult> {
        let scope = self
            .store
            .find_match(&result.match_id)
            .await?
            .ok_or_else(|| ResultsError::MatchNotFound(result.match_id.clone()))?
            .scope();

        let lock = self.scope_lock(&scope).await;
        let _guard = lock.lock().await;

        // Re-read under the lock so concurrent submissions see each other
        let current = self
            .store
            .find_match(&result.match_id)
            .await?
            .ok_or_else(|| ResultsError::MatchNotFound(result.match_id.clone()))?;

        if current.fixture.teams().is_none() {
            return Err(ResultsError::MissingTeams(result.match_id));
        }
        if !current.status.can_transition_to(result.status) {
            return Err(ResultsError::InvalidStatusTransition {
                match_id: result.match_id,
                from: current.status,
                to: result.status,
            });
        }

        let score = Scoreline::from(&result);
        let record = MatchRecord {
            winner_team_id: current.determine_winner(&score),
            score: Some(score),
            status: result.status,
            events: result.match_events.clone(),
            updated_at: Some(Utc::now()),
            ..current
        };

        let (phase_id, group_id) = scope;
        let mut matches = self
            .store
            .completed_matches(&phase_id, group_id.as_deref())
            .await?;
        matches.retain(|stored| stored.fixture.id != record.fixture.id);
        matches.push(record.clone());

        let update = self
            .build_update(&phase_id, group_id.as_deref(), &matches)
            .await?;

        self.store
            .commit_result(record.clone(), result.match_events, update.clone())
            .await?;

        log::info!(
            "Recorded result for match {} ({}), winner: {}",
            result.match_id,
            record.status,
            record.winner_team_id.as_deref().unwrap_or("none")
        );

        Ok(RecordedResult {
            record,
            standings: update,
        })
    }

    /// Rebuild and store the standings of a scope from its completed matches
    pub async fn recompute_standings(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> ResultsResult<StandingsUpdate> {
        let scope = (phase_id.to_string(), group_id.map(str::to_string));
        let lock = self.scope_lock(&scope).await;
        let _guard = lock.lock().await;

        let matches = self.store.completed_matches(phase_id, group_id).await?;
        let update = self.build_update(phase_id, group_id, &matches).await?;
        self.store.upsert_standings(update.clone()).await?;

        log::debug!(
            "Recomputed standings for phase {} group {:?}: {} teams",
            phase_id,
            group_id,
            update.standings.len()
        );
        Ok(update)
    }

    /// Stored standings for a scope, empty when nothing has been recorded
    pub async fn get_standings(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
    ) -> ResultsResult<Vec<TeamStanding>> {
        Ok(self
            .store
            .get_standings(phase_id, group_id)
            .await?
            .map(|update| update.standings)
            .unwrap_or_default())
    }

    /// Direct record between two teams within a phase
    pub async fn calculate_head_to_head(
        &self,
        phase_id: &str,
        team_a: &str,
        team_b: &str,
    ) -> ResultsResult<HeadToHead> {
        let matches = self.store.phase_matches(phase_id).await?;
        let config = self.classification_for(phase_id).await;
        Ok(StandingsCalculator::new(&config).head_to_head(&matches, team_a, team_b))
    }

    /// Compute a fresh table over the scope's roster
    async fn build_update(
        &self,
        phase_id: &str,
        group_id: Option<&str>,
        matches: &[MatchRecord],
    ) -> ResultsResult<StandingsUpdate> {
        let roster: BTreeSet<TeamId> = self
            .store
            .phase_matches(phase_id)
            .await?
            .iter()
            .chain(matches)
            .filter(|record| record.fixture.group_id.as_deref() == group_id)
            .flat_map(|record| {
                [
                    record.fixture.home_team_id.clone(),
                    record.fixture.away_team_id.clone(),
                ]
            })
            .flatten()
            .collect();
        let roster: Vec<TeamId> = roster.into_iter().collect();

        let mut names = self.store.team_names(&roster).await?;
        for id in roster {
            names.entry(id.clone()).or_insert(id);
        }

        let config = self.classification_for(phase_id).await;
        let standings = StandingsCalculator::new(&config).calculate(matches, &names);

        Ok(StandingsUpdate {
            phase_id: phase_id.to_string(),
            group_id: group_id.map(str::to_string),
            standings,
            last_updated: Utc::now(),
        })
    }
}
