//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use tournament_fixtures::validation::TournamentConstraints;

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Seed used when `--seed` is not given; random when unset
    pub default_seed: Option<u64>,
    /// Pretty-print JSON output
    pub pretty_output: bool,
    /// Operations slower than this are logged at warn level
    pub slow_operation_ms: u64,
    /// Limits used by the `validate` command
    pub validation: ValidationDefaults,
}

/// Defaults for tournament validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDefaults {
    /// Smallest allowed phase roster
    pub min_teams: usize,
    /// Largest allowed phase roster
    pub max_teams: usize,
    /// Minimum days between a team's matches
    pub min_rest_days: u32,
    /// Matches allowed on one calendar day
    pub max_matches_per_day: usize,
}

impl ValidationDefaults {
    /// Tournament constraints with these limits applied
    pub fn constraints(&self) -> TournamentConstraints {
        TournamentConstraints {
            min_teams: self.min_teams,
            max_teams: self.max_teams,
            min_rest_days: self.min_rest_days,
            max_matches_per_day: self.max_matches_per_day,
            ..TournamentConstraints::default()
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `seed_override` - Optional seed override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<CliConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(seed_override: Option<u64>) -> Result<Self, ConfigError> {
        let default_seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_env_opt("TF_SEED")?,
        };

        let defaults = TournamentConstraints::default();
        let validation = ValidationDefaults {
            min_teams: parse_env_or("TF_MIN_TEAMS", defaults.min_teams),
            max_teams: parse_env_or("TF_MAX_TEAMS", defaults.max_teams),
            min_rest_days: parse_env_or("TF_MIN_REST_DAYS", defaults.min_rest_days),
            max_matches_per_day: parse_env_or("TF_MAX_MATCHES_PER_DAY", defaults.max_matches_per_day),
        };

        Ok(CliConfig {
            default_seed,
            pretty_output: parse_env_or("TF_PRETTY_OUTPUT", true),
            slow_operation_ms: parse_env_or("TF_SLOW_OPERATION_MS", 1000),
            validation,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.min_teams < 2 {
            return Err(ConfigError::Invalid {
                var: "TF_MIN_TEAMS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.validation.max_teams < self.validation.min_teams {
            return Err(ConfigError::Invalid {
                var: "TF_MAX_TEAMS".to_string(),
                reason: format!(
                    "Must be at least min teams ({})",
                    self.validation.min_teams
                ),
            });
        }

        if self.validation.max_matches_per_day == 0 {
            return Err(ConfigError::Invalid {
                var: "TF_MAX_MATCHES_PER_DAY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.slow_operation_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "TF_SLOW_OPERATION_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Optional variable that must parse when present
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse '{raw}'"),
        }),
        Err(_) => Ok(None),
    }
}
