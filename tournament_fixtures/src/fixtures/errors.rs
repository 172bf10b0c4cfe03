//! Fixture generation error types.

use thiserror::Error;

/// Fixture generation errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Not enough teams for the requested format
    #[error("Insufficient teams: need at least {needed}, have {actual}")]
    InsufficientTeams { needed: usize, actual: usize },

    /// A team ID appears more than once in the roster
    #[error("Duplicate team in roster: {0}")]
    DuplicateTeam(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Group phase would not produce enough groups
    #[error("Group phase requires at least 2 groups, got {0}")]
    InvalidGroupCount(usize),

    /// A group or division failed to generate
    #[error("Failed to generate fixtures for {group}: {source}")]
    GroupGeneration {
        group: String,
        #[source]
        source: Box<FixtureError>,
    },

    /// Hard scheduling constraints could not be satisfied
    #[error("Hard constraint violated: {}", .0.join("; "))]
    ConstraintViolation(Vec<String>),

    /// Final structural check failed
    #[error("Fixture validation failed: {}", .0.join(", "))]
    InvalidFixtures(Vec<String>),
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_teams_message() {
        let err = FixtureError::InsufficientTeams {
            needed: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Insufficient teams: need at least 4, have 3");
    }

    #[test]
    fn test_group_generation_names_group() {
        let err = FixtureError::GroupGeneration {
            group: "Group B".to_string(),
            source: Box::new(FixtureError::InvalidConfig("rounds must be at least 1".into())),
        };
        assert_eq!(
            err.to_string(),
            "Failed to generate fixtures for Group B: Invalid configuration: rounds must be at least 1"
        );
    }

    #[test]
    fn test_invalid_fixtures_consolidates_messages() {
        let err = FixtureError::InvalidFixtures(vec![
            "Duplicate match found: a-b".to_string(),
            "Team cannot play against itself: c".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Fixture validation failed: Duplicate match found: a-b, Team cannot play against itself: c"
        );
    }
}
