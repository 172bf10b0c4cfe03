//! Results and standings data models.

use crate::fixtures::models::{GroupId, Match, MatchId, PhaseConfig, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase ID type
pub type PhaseId = String;

/// Lock and storage scope for standings: a phase, optionally one group of it
pub type StandingsScope = (PhaseId, Option<GroupId>);

/// Match lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    /// Terminal
    Suspended,
}

impl MatchStatus {
    /// Whether a match may move from `self` to `next`
    ///
    /// Completed -> Completed is allowed so results can be corrected.
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, next),
            (Scheduled, Live)
                | (Scheduled, Completed)
                | (Scheduled, Suspended)
                | (Live, Completed)
                | (Live, Suspended)
                | (Completed, Completed)
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Kind of in-match event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEventType {
    Goal,
    YellowCard,
    RedCard,
    Substitution,
    Other,
}

impl MatchEventType {
    /// Disciplinary points charged to the team (lower is better)
    pub fn fair_play_points(self) -> u32 {
        match self {
            MatchEventType::YellowCard => 1,
            MatchEventType::RedCard => 3,
            _ => 0,
        }
    }
}

/// An event recorded during a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub match_id: MatchId,
    pub team_id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub event_type: MatchEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MatchEvent {
    /// Create a new event without player details
    pub fn new(match_id: impl Into<MatchId>, team_id: impl Into<TeamId>, event_type: MatchEventType) -> Self {
        Self {
            match_id: match_id.into(),
            team_id: team_id.into(),
            player_name: None,
            event_type,
            minute: None,
            description: None,
        }
    }
}

/// A submitted match outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub home_score: u32,
    pub away_score: u32,
    /// Goals scored in extra time only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score_et: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score_et: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score_pen: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score_pen: Option<u32>,
    pub status: MatchStatus,
    #[serde(default)]
    pub match_events: Vec<MatchEvent>,
}

impl MatchResult {
    /// Completed result in regular time
    pub fn completed(match_id: impl Into<MatchId>, home_score: u32, away_score: u32) -> Self {
        Self {
            match_id: match_id.into(),
            home_score,
            away_score,
            home_score_et: None,
            away_score_et: None,
            home_score_pen: None,
            away_score_pen: None,
            status: MatchStatus::Completed,
            match_events: Vec::new(),
        }
    }

    /// Add extra-time goals
    pub fn with_extra_time(mut self, home: u32, away: u32) -> Self {
        self.home_score_et = Some(home);
        self.away_score_et = Some(away);
        self
    }

    /// Add a penalty shootout
    pub fn with_penalties(mut self, home: u32, away: u32) -> Self {
        self.home_score_pen = Some(home);
        self.away_score_pen = Some(away);
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }
}

/// Which side won, by the first stage that separated the teams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Scores of a match, as stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreline {
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score_et: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score_et: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score_pen: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score_pen: Option<u32>,
}

impl Scoreline {
    /// Goals including extra time
    pub fn goals(&self) -> (u32, u32) {
        (
            self.home_score + self.home_score_et.unwrap_or(0),
            self.away_score + self.away_score_et.unwrap_or(0),
        )
    }

    fn extra_time(&self) -> Option<(u32, u32)> {
        match (self.home_score_et, self.away_score_et) {
            (None, None) => None,
            (home, away) => Some((home.unwrap_or(0), away.unwrap_or(0))),
        }
    }

    fn penalties(&self) -> Option<(u32, u32)> {
        match (self.home_score_pen, self.away_score_pen) {
            (None, None) => None,
            (home, away) => Some((home.unwrap_or(0), away.unwrap_or(0))),
        }
    }

    /// Winning side: regular time, then with extra time, then penalties
    pub fn winning_side(&self) -> Option<Side> {
        let mut stages = vec![(self.home_score, self.away_score)];
        if self.extra_time().is_some() {
            stages.push(self.goals());
        }
        if let Some(penalties) = self.penalties() {
            stages.push(penalties);
        }

        stages.into_iter().find_map(|(home, away)| match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        })
    }

    /// Shootout winner, if a shootout separated the teams
    pub fn shootout_side(&self) -> Option<Side> {
        self.penalties().and_then(|(home, away)| match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        })
    }
}

impl From<&MatchResult> for Scoreline {
    fn from(result: &MatchResult) -> Self {
        Self {
            home_score: result.home_score,
            away_score: result.away_score,
            home_score_et: result.home_score_et,
            away_score_et: result.away_score_et,
            home_score_pen: result.home_score_pen,
            away_score_pen: result.away_score_pen,
        }
    }
}

/// A persisted match with its latest result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub phase_id: PhaseId,
    pub fixture: Match,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Scoreline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_team_id: Option<TeamId>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<MatchEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// A fixture awaiting its result
    pub fn scheduled(phase_id: impl Into<PhaseId>, fixture: Match) -> Self {
        Self {
            phase_id: phase_id.into(),
            fixture,
            score: None,
            winner_team_id: None,
            status: MatchStatus::Scheduled,
            events: Vec::new(),
            updated_at: None,
        }
    }

    /// Standings scope this match counts towards
    pub fn scope(&self) -> StandingsScope {
        (self.phase_id.clone(), self.fixture.group_id.clone())
    }

    /// Completed real fixture with a score
    pub fn counts_for_standings(&self) -> bool {
        self.status == MatchStatus::Completed && self.score.is_some() && self.fixture.teams().is_some()
    }

    /// Winning team ID for a scoreline on this fixture
    pub fn determine_winner(&self, score: &Scoreline) -> Option<TeamId> {
        match score.winning_side()? {
            Side::Home => self.fixture.home_team_id.clone(),
            Side::Away => self.fixture.away_team_id.clone(),
        }
    }
}

/// Single-match outcome letter for the form guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormResult {
    W,
    D,
    L,
}

/// A row of a standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// 1-based
    pub position: u32,
    /// Last five results, oldest first
    pub form: Vec<FormResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_to_head_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_to_head_goal_diff: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_play_points: Option<u32>,
}

impl TeamStanding {
    /// Create an empty row
    pub fn new(team_id: impl Into<TeamId>, team_name: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: team_name.into(),
            matches_played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            position: 0,
            form: Vec::new(),
            head_to_head_points: None,
            head_to_head_goal_diff: None,
            fair_play_points: None,
        }
    }
}

/// Tie-break criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakType {
    Points,
    GoalDifference,
    GoalsFor,
    GoalsAgainst,
    HeadToHead,
    FairPlay,
    Random,
}

/// Sort direction for a tie-break criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One link of the tie-break chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakingRule {
    pub rule_type: TiebreakType,
    pub order: SortOrder,
    /// Lower values are applied first
    pub priority: u32,
}

impl TiebreakingRule {
    pub fn new(rule_type: TiebreakType, order: SortOrder, priority: u32) -> Self {
        Self {
            rule_type,
            order,
            priority,
        }
    }

    /// Points, goal difference, goals for; all descending
    pub fn default_chain() -> Vec<Self> {
        vec![
            Self::new(TiebreakType::Points, SortOrder::Desc, 1),
            Self::new(TiebreakType::GoalDifference, SortOrder::Desc, 2),
            Self::new(TiebreakType::GoalsFor, SortOrder::Desc, 3),
        ]
    }
}

/// How results turn into a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub points_for_win: u32,
    pub points_for_draw: u32,
    pub points_for_loss: u32,
    #[serde(default = "TiebreakingRule::default_chain")]
    pub tiebreaking_rules: Vec<TiebreakingRule>,
    /// Treat a match level after regular time as a draw
    #[serde(default)]
    pub count_extra_time_as_draw: bool,
    /// Points for a shootout win (defaults to `points_for_win`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_shootout_winner_points: Option<u32>,
    /// Seed for the random tie-break
    #[serde(default)]
    pub random_seed: u64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            tiebreaking_rules: TiebreakingRule::default_chain(),
            count_extra_time_as_draw: false,
            penalty_shootout_winner_points: None,
            random_seed: 0,
        }
    }
}

impl ClassificationConfig {
    /// Points table taken from the phase configuration, default tie-breaks
    pub fn from_phase(config: &PhaseConfig) -> Self {
        Self {
            points_for_win: config.points_for_win,
            points_for_draw: config.points_for_draw,
            points_for_loss: config.points_for_loss,
            ..Self::default()
        }
    }

    /// Replace the tie-break chain
    pub fn with_rules(mut self, rules: Vec<TiebreakingRule>) -> Self {
        self.tiebreaking_rules = rules;
        self
    }
}

/// A freshly computed table for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsUpdate {
    pub phase_id: PhaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub standings: Vec<TeamStanding>,
    pub last_updated: DateTime<Utc>,
}

/// Direct record between two teams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub matches_played: u32,
    pub team_a_points: u32,
    pub team_b_points: u32,
    pub team_a_goals: u32,
    pub team_b_goals: u32,
}
