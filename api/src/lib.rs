pub mod client;
pub mod committer;
pub mod composer;
pub mod memory;
pub mod posts;
pub mod roster;
pub mod session;
pub mod standings;
pub mod store;
pub mod uploads;
pub mod wire;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use client::{ApiError, ApiResult};
pub use committer::CommitStep;

pub type TeamId = String;
pub type PlayerId = String;
pub type MatchId = String;
pub type PostId = String;

/// Latest minute a goal can be recorded at (extra time included).
pub const MAX_MINUTE: u8 = 120;

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Domain types, named after the hosted store's columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub representative_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
        }
    }

    /// Accepts full names, initials and the usual two-letter codes.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "goalkeeper" | "gk" | "g" | "keeper" => Some(Position::Goalkeeper),
            "defender" | "df" | "d" => Some(Position::Defender),
            "midfielder" | "mf" | "m" => Some(Position::Midfielder),
            "forward" | "fw" | "f" | "striker" => Some(Position::Forward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Player {
    /// "#9 Jane Doe", or just the name when no shirt is assigned.
    pub fn display_name(&self) -> String {
        match self.jersey_number {
            Some(n) => format!("#{n} {}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub match_day: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub match_date: NaiveDate,
    #[serde(default)]
    pub match_time: Option<NaiveTime>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Final score, present only once the match is completed.
    pub fn result(&self) -> Option<(u32, u32)> {
        if !self.is_completed {
            return None;
        }
        self.home_score.zip(self.away_score)
    }

    pub fn team_id(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team_id,
            Side::Away => &self.away_team_id,
        }
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Goal,
    Assist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(default)]
    pub id: String,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub event_type: EventType,
    #[serde(default)]
    pub minute: Option<u8>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the derived league table. Read-only from the application side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    #[serde(default)]
    pub id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub position: Option<u32>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

/// Goal and assist tally for one player across every recorded match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leader {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub goals: u32,
    pub assists: u32,
}

/// The two kinds of admin-written post. Each lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Blog,
    Notice,
}

impl PostKind {
    pub fn table(&self) -> &'static str {
        match self {
            PostKind::Blog => "blogs",
            PostKind::Notice => "notices",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostKind::Blog => "blog",
            PostKind::Notice => "notice",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

// ---------------------------------------------------------------------------
// Insert payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub representative_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
}

impl NewTeam {
    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.name.trim().is_empty() {
            return Err(LeagueError::InvalidInput("team name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub team_id: TeamId,
    pub jersey_number: Option<u32>,
    pub position: Option<Position>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
}

impl NewPlayer {
    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.name.trim().is_empty() {
            return Err(LeagueError::InvalidInput("player name is required".into()));
        }
        if self.team_id.is_empty() {
            return Err(LeagueError::InvalidInput("a player must belong to a team".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub match_day: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub match_date: NaiveDate,
    pub match_time: Option<NaiveTime>,
    pub venue: Option<String>,
}

impl NewMatch {
    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.match_day == 0 {
            return Err(LeagueError::InvalidInput("match day starts at 1".into()));
        }
        if self.home_team_id == self.away_team_id {
            return Err(LeagueError::InvalidInput(
                "home and away teams must differ".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatchEvent {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub event_type: EventType,
    pub minute: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author_email: Option<String>,
    /// Usually a URL handed back by the upload endpoint.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.title.trim().is_empty() {
            return Err(LeagueError::InvalidInput("post title is required".into()));
        }
        if self.body.trim().is_empty() {
            return Err(LeagueError::InvalidInput("post body is required".into()));
        }
        Ok(())
    }
}

/// Partial edit of a post; absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl PostUpdate {
    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(LeagueError::InvalidInput("post title cannot be blank".into()));
        }
        if self.body.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(LeagueError::InvalidInput("post body cannot be blank".into()));
        }
        Ok(())
    }

    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.trim().to_owned();
        }
        if let Some(body) = &self.body {
            post.body = body.clone();
        }
        if let Some(url) = &self.image_url {
            post.image_url = Some(url.clone());
        }
        if let Some(published) = self.is_published {
            post.is_published = published;
        }
    }
}

// ---------------------------------------------------------------------------
// Errors surfaced to the admin
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LeagueError {
    /// Goal-entry count disagrees with the declared score on either side.
    ScoreMismatch {
        home_declared: u32,
        home_entries: usize,
        away_declared: u32,
        away_entries: usize,
    },
    IncompleteGoalEntry { side: Side, index: usize },
    MinuteOutOfRange { side: Side, index: usize, minute: u8 },
    NoSuchEntry { side: Side, index: usize },
    /// A result commit step was rejected by the store.
    StoreOperationFailed { step: CommitStep, source: ApiError },
    Store(ApiError),
    UnauthorizedMutation,
    InvalidCredentials,
    MissingUpload,
    InvalidInput(String),
}

impl fmt::Display for LeagueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeagueError::ScoreMismatch {
                home_declared,
                home_entries,
                away_declared,
                away_entries,
            } => write!(
                f,
                "Goal details don't match the score. Home: {home_declared} goals vs {home_entries} entries, Away: {away_declared} goals vs {away_entries} entries"
            ),
            LeagueError::IncompleteGoalEntry { side, index } => write!(
                f,
                "{} goal {} has no scorer selected",
                side.label(),
                index + 1
            ),
            LeagueError::MinuteOutOfRange { side, index, minute } => write!(
                f,
                "{} goal {}: minute {minute} is outside 0-{MAX_MINUTE}",
                side.label(),
                index + 1
            ),
            LeagueError::NoSuchEntry { side, index } => {
                write!(f, "{} goal {} does not exist", side.label(), index + 1)
            }
            LeagueError::StoreOperationFailed { step, source } => {
                write!(f, "Error updating match ({}): {source}", step.label())
            }
            LeagueError::Store(e) => write!(f, "{e}"),
            LeagueError::UnauthorizedMutation => write!(f, "Unauthorized"),
            LeagueError::InvalidCredentials => write!(f, "Invalid credentials"),
            LeagueError::MissingUpload => write!(f, "No file provided"),
            LeagueError::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LeagueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeagueError::StoreOperationFailed { source, .. } => Some(source),
            LeagueError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for LeagueError {
    fn from(e: ApiError) -> Self {
        LeagueError::Store(e)
    }
}
