//! Fixture data models shared by every generator.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Team ID type
pub type TeamId = String;

/// Match ID type (assigned by the store, absent before persistence)
pub type MatchId = String;

/// Group or division ID type (`group_a`, `level_1`, ...)
pub type GroupId = String;

/// Venue ID type
pub type VenueId = String;

/// A participant in a phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team ID
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Abbreviated name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Seed rank (lower is stronger)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// Venue used when the team plays at home
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_venue_id: Option<VenueId>,
}

impl Team {
    /// Create an unseeded team
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: None,
            seed: None,
            home_venue_id: None,
        }
    }

    /// Set the seed rank
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the home venue
    pub fn with_home_venue(mut self, venue_id: impl Into<VenueId>) -> Self {
        self.home_venue_id = Some(venue_id.into());
        self
    }

    /// Sort key placing seeded teams first (by seed) and unseeded teams last
    pub(crate) fn seed_rank(&self) -> u32 {
        self.seed.unwrap_or(u32::MAX)
    }
}

/// Kind of fixture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    Regular,
    Playoff,
    Final,
    Consolation,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Regular => write!(f, "regular"),
            MatchType::Playoff => write!(f, "playoff"),
            MatchType::Final => write!(f, "final"),
            MatchType::Consolation => write!(f, "consolation"),
        }
    }
}

fn default_leg() -> u8 {
    1
}

fn default_cycle() -> u32 {
    1
}

/// A generated fixture
///
/// Bye slots carry the resting team as home side and no away side.
/// Knockout placeholders carry no teams until earlier rounds are decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Store-assigned ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MatchId>,
    /// Home side
    pub home_team_id: Option<TeamId>,
    /// Away side
    pub away_team_id: Option<TeamId>,
    /// Round number (1-indexed)
    pub round_number: u32,
    /// Match number, unique within a round and leg
    pub match_number: u32,
    /// Leg of a two-legged tie (1 or 2)
    #[serde(default = "default_leg")]
    pub leg_number: u8,
    /// Outer round-robin pass (1 for single round robin and knockout)
    #[serde(default = "default_cycle")]
    pub cycle: u32,
    /// Kickoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_date: Option<DateTime<Utc>>,
    /// Venue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<VenueId>,
    /// Whether this slot is a bye
    pub is_bye: bool,
    /// Fixture kind
    #[serde(default)]
    pub match_type: MatchType,
    /// Group or division tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl Match {
    /// Create a regular fixture between two teams
    pub fn fixture(home: &str, away: &str, round_number: u32, match_number: u32) -> Self {
        Self {
            id: None,
            home_team_id: Some(home.to_string()),
            away_team_id: Some(away.to_string()),
            round_number,
            match_number,
            leg_number: 1,
            cycle: 1,
            match_date: None,
            venue_id: None,
            is_bye: false,
            match_type: MatchType::Regular,
            group_id: None,
        }
    }

    /// Create a bye slot for a resting team
    pub fn bye(team: &str, round_number: u32, match_number: u32) -> Self {
        Self {
            away_team_id: None,
            is_bye: true,
            ..Self::fixture(team, team, round_number, match_number)
        }
    }

    /// Create a bracket slot whose teams are resolved later
    pub fn placeholder(round_number: u32, match_number: u32, match_type: MatchType) -> Self {
        Self {
            id: None,
            home_team_id: None,
            away_team_id: None,
            round_number,
            match_number,
            leg_number: 1,
            cycle: 1,
            match_date: None,
            venue_id: None,
            is_bye: false,
            match_type,
            group_id: None,
        }
    }

    /// Whether the team takes part in this fixture (home, away or bye)
    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team_id.as_deref() == Some(team_id)
            || self.away_team_id.as_deref() == Some(team_id)
    }

    /// Both teams, when this is a real fixture with resolved sides
    pub fn teams(&self) -> Option<(&str, &str)> {
        if self.is_bye {
            return None;
        }
        match (self.home_team_id.as_deref(), self.away_team_id.as_deref()) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    /// Order-independent pairing key
    pub fn pair_key(&self) -> Option<(String, String)> {
        self.teams().map(|(home, away)| {
            if home <= away {
                (home.to_string(), away.to_string())
            } else {
                (away.to_string(), home.to_string())
            }
        })
    }

    /// Swap home and away sides
    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.home_team_id, &mut self.away_team_id);
    }

    /// Sort key for playing order: date, then leg, round and match number
    ///
    /// Undated matches sort before dated ones and fall back to round order.
    pub fn chronological_key(&self) -> (Option<DateTime<Utc>>, u8, u32, u32) {
        (
            self.match_date,
            self.leg_number,
            self.round_number,
            self.match_number,
        )
    }
}

/// Tournament phase format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Knockout,
    League,
    Groups,
    Levels,
    /// Multi-stage phase; generated as groups
    Combined,
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseType::Knockout => write!(f, "knockout"),
            PhaseType::League => write!(f, "league"),
            PhaseType::Groups => write!(f, "groups"),
            PhaseType::Levels => write!(f, "levels"),
            PhaseType::Combined => write!(f, "combined"),
        }
    }
}

/// Calendar used to date generated rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Date of round 1
    pub start_date: NaiveDate,
    /// Days between consecutive rounds
    #[serde(default = "ScheduleSettings::default_interval")]
    pub days_between_rounds: u32,
    /// Kickoff time (UTC)
    #[serde(default = "ScheduleSettings::default_kickoff")]
    pub kickoff_time: NaiveTime,
}

impl ScheduleSettings {
    /// Weekly rounds starting at `start_date`, 15:00 kickoff
    pub fn weekly(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            days_between_rounds: Self::default_interval(),
            kickoff_time: Self::default_kickoff(),
        }
    }

    fn default_interval() -> u32 {
        7
    }

    fn default_kickoff() -> NaiveTime {
        NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Phase configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Phase format
    pub phase_type: PhaseType,
    /// 1 = single leg, 2 = home and away legs
    #[serde(default = "PhaseConfig::default_legs")]
    pub home_away_legs: u8,
    /// League passes: 1 = single round robin, 2 = double
    #[serde(default = "PhaseConfig::default_rounds")]
    pub rounds: u32,
    /// Minimum days between a team's matches
    #[serde(default)]
    pub min_rest_days: u32,
    /// Points for a win
    #[serde(default = "PhaseConfig::default_win_points")]
    pub points_for_win: u32,
    /// Points for a draw
    #[serde(default = "PhaseConfig::default_draw_points")]
    pub points_for_draw: u32,
    /// Points for a loss
    #[serde(default)]
    pub points_for_loss: u32,
    /// Knockout: add a third-place match
    #[serde(default)]
    pub has_consolation: bool,
    /// Groups: number of groups (default ceil(N/4))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_count: Option<usize>,
    /// Groups: capacity per group (default ceil(N/groups))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams_per_group: Option<usize>,
    /// Groups: teams advancing from each group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_per_group: Option<usize>,
    /// Levels: teams promoted from each division
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_per_level: Option<usize>,
    /// Levels: teams relegated from each division
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relegated_per_level: Option<usize>,
    /// Levels: division size (default 8)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams_per_level: Option<usize>,
    /// Calendar for dating fixtures (fixtures stay undated when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSettings>,
}

impl PhaseConfig {
    /// Default division size for levels play
    pub const DEFAULT_TEAMS_PER_LEVEL: usize = 8;

    fn base(phase_type: PhaseType) -> Self {
        Self {
            phase_type,
            home_away_legs: Self::default_legs(),
            rounds: Self::default_rounds(),
            min_rest_days: 0,
            points_for_win: Self::default_win_points(),
            points_for_draw: Self::default_draw_points(),
            points_for_loss: 0,
            has_consolation: false,
            groups_count: None,
            teams_per_group: None,
            qualified_per_group: None,
            promoted_per_level: None,
            relegated_per_level: None,
            teams_per_level: None,
            schedule: None,
        }
    }

    /// League phase with `rounds` round-robin passes, 3/1/0 points
    pub fn league(rounds: u32) -> Self {
        Self {
            rounds,
            ..Self::base(PhaseType::League)
        }
    }

    /// Single-elimination phase
    pub fn knockout() -> Self {
        Self::base(PhaseType::Knockout)
    }

    /// Group phase; `groups_count` of None picks ceil(N/4)
    pub fn groups(groups_count: Option<usize>) -> Self {
        Self {
            groups_count,
            ..Self::base(PhaseType::Groups)
        }
    }

    /// Divisions of `teams_per_level` teams
    pub fn levels(teams_per_level: usize) -> Self {
        Self {
            teams_per_level: Some(teams_per_level),
            ..Self::base(PhaseType::Levels)
        }
    }

    /// Set home and away legs
    pub fn with_legs(mut self, legs: u8) -> Self {
        self.home_away_legs = legs;
        self
    }

    /// Add a third-place match
    pub fn with_consolation(mut self) -> Self {
        self.has_consolation = true;
        self
    }

    /// Set minimum rest days
    pub fn with_min_rest_days(mut self, days: u32) -> Self {
        self.min_rest_days = days;
        self
    }

    /// Set the points table
    pub fn with_points(mut self, win: u32, draw: u32, loss: u32) -> Self {
        self.points_for_win = win;
        self.points_for_draw = draw;
        self.points_for_loss = loss;
        self
    }

    /// Set promotion and relegation counts
    pub fn with_movement(mut self, promoted: usize, relegated: usize) -> Self {
        self.promoted_per_level = Some(promoted);
        self.relegated_per_level = Some(relegated);
        self
    }

    /// Date fixtures with the given calendar
    pub fn with_schedule(mut self, schedule: ScheduleSettings) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Division size in effect
    pub fn level_size(&self) -> usize {
        self.teams_per_level
            .filter(|size| *size > 0)
            .unwrap_or(Self::DEFAULT_TEAMS_PER_LEVEL)
    }

    /// Group count in effect for `team_count` teams
    pub fn effective_groups_count(&self, team_count: usize) -> usize {
        self.groups_count
            .filter(|count| *count > 0)
            .unwrap_or_else(|| team_count.div_ceil(4))
    }

    fn default_legs() -> u8 {
        1
    }

    fn default_rounds() -> u32 {
        1
    }

    fn default_win_points() -> u32 {
        3
    }

    fn default_draw_points() -> u32 {
        1
    }
}

/// Generation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub total_matches: usize,
    pub total_rounds: u32,
    pub algorithm_used: String,
    pub generation_time_ms: u64,
    pub byes_generated: usize,
}

impl GenerationMetadata {
    /// Zeroed metadata reported on failure
    pub fn zeroed(algorithm_used: &str) -> Self {
        Self {
            algorithm_used: algorithm_used.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of a fixture generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureGenerationResult {
    pub matches: Vec<Match>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Advisory messages from soft constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub metadata: GenerationMetadata,
}

impl FixtureGenerationResult {
    /// Failed generation: no matches, zeroed metadata
    pub fn failure(algorithm_used: &str, error: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            success: false,
            error: Some(error.into()),
            warnings: Vec::new(),
            metadata: GenerationMetadata::zeroed(algorithm_used),
        }
    }
}

/// Output of a single generator before orchestration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFixtures {
    pub matches: Vec<Match>,
    pub total_rounds: u32,
    pub byes_generated: usize,
}

/// A round-robin group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub teams: Vec<Team>,
}

/// A ranked division
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: GroupId,
    pub name: String,
    /// 1 = top division
    pub level_number: usize,
    pub teams: Vec<Team>,
}
