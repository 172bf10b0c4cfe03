//! Tournament fixture command-line tool.
//!
//! Generates fixtures from JSON rosters, replays result files into
//! standings tables and validates tournament plans.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Error, bail};
use log::info;
use pico_args::Arguments;

use commands::{GenerateArgs, ResultsArgs, ValidateArgs};
use config::CliConfig;

const HELP: &str = "\
Generate tournament fixtures and compute standings

USAGE:
  tf_cli <COMMAND> [OPTIONS]

COMMANDS:
  generate       Generate fixtures for one phase
  standings      Replay results and print every table of a phase
  head-to-head   Replay results and print the record between two teams
  validate       Check a tournament plan and optionally its fixtures

GENERATE OPTIONS:
  --teams        FILE        JSON array of teams
  --config       FILE        JSON phase configuration
  --constraints  FILE        JSON array of scheduling constraints
  --seed         N           Seed for draws  [default: env TF_SEED or random]

STANDINGS / HEAD-TO-HEAD OPTIONS:
  --fixtures       FILE      Generated fixtures (result object or match array)
  --results        FILE      JSON array of match results
  --teams          FILE      JSON array of teams, for display names
  --phase          ID        Phase ID  [default: phase]
  --classification FILE      JSON points and tie-break configuration
  --team-a         ID        First team (head-to-head only)
  --team-b         ID        Second team (head-to-head only)

VALIDATE OPTIONS:
  --tournament   FILE        JSON tournament plan
  --fixtures     FILE        Fixtures to check against the plan's constraints

COMMON OPTIONS:
  --output       FILE        Write JSON here instead of stdout

FLAGS:
  -h, --help                 Print help information

ENVIRONMENT:
  TF_SEED                    Default draw seed
  TF_MIN_TEAMS               Smallest phase roster  [default: 2]
  TF_MAX_TEAMS               Largest phase roster  [default: 64]
  TF_MIN_REST_DAYS           Rest days between a team's matches  [default: 3]
  TF_MAX_MATCHES_PER_DAY     Matches per calendar day  [default: 8]
  TF_PRETTY_OUTPUT           Pretty-print JSON  [default: true]
  TF_SLOW_OPERATION_MS       Slow operation threshold  [default: 1000]
  RUST_LOG                   Log filter  [default: info]
";

fn results_args(pargs: &mut Arguments) -> Result<ResultsArgs, Error> {
    Ok(ResultsArgs {
        phase_id: pargs
            .opt_value_from_str("--phase")?
            .unwrap_or_else(|| "phase".to_string()),
        fixtures: pargs.value_from_str("--fixtures")?,
        results: pargs.value_from_str("--results")?,
        teams: pargs.opt_value_from_str("--teams")?,
        classification: pargs.opt_value_from_str("--classification")?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    logging::init();

    let command = pargs.subcommand()?;
    let seed: Option<u64> = pargs.opt_value_from_str("--seed")?;
    let output: Option<PathBuf> = pargs.opt_value_from_str("--output")?;

    let config = CliConfig::from_env(seed)?;
    config.validate()?;

    match command.as_deref() {
        Some("generate") => {
            let args = GenerateArgs {
                teams: pargs.value_from_str("--teams")?,
                config: pargs.value_from_str("--config")?,
                constraints: pargs.opt_value_from_str("--constraints")?,
            };
            warn_unused(pargs);

            let result = commands::generate(&args, &config)?;
            commands::write_json(&result, output.as_deref(), config.pretty_output)?;
            if !result.success {
                bail!(
                    "fixture generation failed: {}",
                    result.error.unwrap_or_default()
                );
            }
            info!(
                "Wrote {} matches over {} rounds",
                result.metadata.total_matches, result.metadata.total_rounds
            );
        }
        Some("standings") => {
            let args = results_args(&mut pargs)?;
            warn_unused(pargs);

            let report = commands::standings(&args, &config).await?;
            commands::write_json(&report, output.as_deref(), config.pretty_output)?;
        }
        Some("head-to-head") => {
            let args = results_args(&mut pargs)?;
            let team_a: String = pargs.value_from_str("--team-a")?;
            let team_b: String = pargs.value_from_str("--team-b")?;
            warn_unused(pargs);

            let record = commands::head_to_head(&args, &team_a, &team_b).await?;
            commands::write_json(&record, output.as_deref(), config.pretty_output)?;
        }
        Some("validate") => {
            let args = ValidateArgs {
                tournament: pargs.value_from_str("--tournament")?,
                fixtures: pargs.opt_value_from_str("--fixtures")?,
            };
            warn_unused(pargs);

            let result = commands::validate(&args, &config)?;
            commands::write_json(&result, output.as_deref(), config.pretty_output)?;
            if !result.is_valid {
                bail!("validation failed with {} error(s)", result.errors.len());
            }
        }
        Some(other) => bail!("unknown command '{other}', see --help"),
        None => {
            print!("{HELP}");
            bail!("no command given");
        }
    }

    Ok(())
}

fn warn_unused(pargs: Arguments) {
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        tracing::warn!(arguments = ?remaining, "Ignoring unused arguments");
    }
}
