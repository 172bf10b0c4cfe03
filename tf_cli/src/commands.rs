//! Command implementations.
//!
//! Every command reads JSON inputs, runs the library and returns a
//! serializable report; printing is left to `main`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tournament_fixtures::{
    FixtureGenerationResult, FixtureGenerator, Match, PhaseConfig, Team,
    constraints::SchedulingConstraint,
    db::{InMemoryStore, ResultsStore, StoreError},
    results::{
        ClassificationConfig, HeadToHead, MatchResult, ResultsError, ResultsManager,
        StandingsUpdate,
    },
    validation::{
        PhaseDefinition, TournamentConstraints, TournamentDefinition, TournamentValidator,
        ValidationResult,
    },
};

use crate::config::CliConfig;
use crate::logging::log_timing;

/// Command error types
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{}", .0.client_message())]
    Results(#[from] ResultsError),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

/// Fixture input: a full generation result or a bare match list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixtureFile {
    Generated(FixtureGenerationResult),
    Matches(Vec<Match>),
}

impl FixtureFile {
    pub fn into_matches(self) -> Vec<Match> {
        match self {
            FixtureFile::Generated(result) => result.matches,
            FixtureFile::Matches(matches) => matches,
        }
    }
}

/// Tournament plan checked by `validate`
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentPlan {
    pub tournament: TournamentDefinition,
    #[serde(default)]
    pub phases: Vec<PhaseDefinition>,
    /// Overrides the limits from the environment
    #[serde(default)]
    pub constraints: Option<TournamentConstraints>,
}

/// Tables for every scope of a phase
#[derive(Debug, Clone, Serialize)]
pub struct StandingsReport {
    pub phase_id: String,
    pub results_recorded: usize,
    pub generated_at: DateTime<Utc>,
    pub tables: Vec<StandingsUpdate>,
}

/// Inputs of the `generate` command
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub teams: PathBuf,
    pub config: PathBuf,
    pub constraints: Option<PathBuf>,
}

/// Inputs shared by the results commands
#[derive(Debug, Clone)]
pub struct ResultsArgs {
    pub phase_id: String,
    pub fixtures: PathBuf,
    pub results: PathBuf,
    pub teams: Option<PathBuf>,
    pub classification: Option<PathBuf>,
}

/// Inputs of the `validate` command
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    pub tournament: PathBuf,
    pub fixtures: Option<PathBuf>,
}

/// Read and deserialize a JSON file
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> CommandResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CommandError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a report to a file, or to stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> CommandResult<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match output {
        Some(path) => fs::write(path, rendered + "\n").map_err(|source| CommandError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

/// Give every unlabelled match a readable, stable ID
///
/// The ID combines group, round, leg and match number, e.g.
/// `group_a-r2-l1-m3`, so result files can be written by hand.
pub fn label_matches(matches: &mut [Match]) {
    for fixture in matches.iter_mut().filter(|fixture| fixture.id.is_none()) {
        let prefix = fixture
            .group_id
            .as_deref()
            .map(|group| format!("{group}-"))
            .unwrap_or_default();
        fixture.id = Some(format!(
            "{}r{}-l{}-m{}",
            prefix, fixture.round_number, fixture.leg_number, fixture.match_number
        ));
    }
}

/// Generate fixtures for one phase
pub fn generate(args: &GenerateArgs, config: &CliConfig) -> CommandResult<FixtureGenerationResult> {
    let teams: Vec<Team> = read_json(&args.teams)?;
    let phase: PhaseConfig = read_json(&args.config)?;
    let constraints: Vec<SchedulingConstraint> = match &args.constraints {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let seed = config
        .default_seed
        .unwrap_or_else(|| rand::rng().random());
    tracing::info!(
        phase_type = %phase.phase_type,
        teams = teams.len(),
        seed = seed,
        "Generating fixtures"
    );

    let started = Instant::now();
    let mut result =
        FixtureGenerator::with_constraints(constraints).generate_seeded(&teams, &phase, seed);
    label_matches(&mut result.matches);
    log_timing(
        "generate",
        started.elapsed().as_millis() as u64,
        config.slow_operation_ms,
        Some(&result.metadata.algorithm_used),
    );

    Ok(result)
}

/// Replay results over stored fixtures and return the manager
async fn replay(args: &ResultsArgs) -> CommandResult<(ResultsManager<InMemoryStore>, usize)> {
    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = &args.teams {
        let teams: Vec<Team> = read_json(path)?;
        store.register_teams(&teams)?;
    }

    let mut matches = read_json::<FixtureFile>(&args.fixtures)?.into_matches();
    label_matches(&mut matches);
    store.insert_fixtures(&args.phase_id, matches).await?;
    let manager = ResultsManager::new(Arc::clone(&store));

    if let Some(path) = &args.classification {
        let classification: ClassificationConfig = read_json(path)?;
        manager
            .set_classification(args.phase_id.clone(), classification)
            .await;
    }

    let results: Vec<MatchResult> = read_json(&args.results)?;
    let count = results.len();
    for result in results {
        manager.record_match_result(result).await?;
    }
    Ok((manager, count))
}

/// Standings for every group of a phase (or the whole phase when ungrouped)
pub async fn standings(args: &ResultsArgs, config: &CliConfig) -> CommandResult<StandingsReport> {
    let started = Instant::now();
    let (manager, results_recorded) = replay(args).await?;

    let scopes: BTreeSet<Option<String>> = manager
        .store()
        .phase_matches(&args.phase_id)
        .await?
        .into_iter()
        .map(|record| record.fixture.group_id)
        .collect();

    let mut tables = Vec::with_capacity(scopes.len());
    for group in &scopes {
        tables.push(
            manager
                .recompute_standings(&args.phase_id, group.as_deref())
                .await?,
        );
    }

    log_timing(
        "standings",
        started.elapsed().as_millis() as u64,
        config.slow_operation_ms,
        None,
    );
    tracing::info!(
        phase_id = %args.phase_id,
        results = results_recorded,
        tables = tables.len(),
        "Standings computed"
    );

    Ok(StandingsReport {
        phase_id: args.phase_id.clone(),
        results_recorded,
        generated_at: Utc::now(),
        tables,
    })
}

/// Direct record between two teams after replaying results
pub async fn head_to_head(args: &ResultsArgs, team_a: &str, team_b: &str) -> CommandResult<HeadToHead> {
    let (manager, _) = replay(args).await?;
    Ok(manager
        .calculate_head_to_head(&args.phase_id, team_a, team_b)
        .await?)
}

/// Validate a tournament plan and, optionally, its fixtures
pub fn validate(args: &ValidateArgs, config: &CliConfig) -> CommandResult<ValidationResult> {
    let plan: TournamentPlan = read_json(&args.tournament)?;
    let constraints = plan
        .constraints
        .unwrap_or_else(|| config.validation.constraints());
    let validator = TournamentValidator::new(constraints);

    let mut result = validator.validate_tournament(&plan.tournament, &plan.phases);
    if let Some(path) = &args.fixtures {
        let matches = read_json::<FixtureFile>(path)?.into_matches();
        result.merge(validator.validate_fixtures(&matches));
    }

    tracing::info!(
        valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validation finished"
    );
    Ok(result)
}
