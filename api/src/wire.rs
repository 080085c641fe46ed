//! Request and response bodies specific to the hosted store's REST surface.
//! Domain rows deserialize directly into the crate-root types; these cover
//! the partial updates and error envelopes around them.

use crate::{NewPlayer, Position, PostUpdate};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body of the PATCH that records a final score.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScorePatch {
    pub home_score: u32,
    pub away_score: u32,
    pub is_completed: bool,
}

impl ScorePatch {
    pub fn completed(home_score: u32, away_score: u32) -> Self {
        Self { home_score, away_score, is_completed: true }
    }
}

/// Body of a player edit. The active flag is left alone; it only changes
/// through `ActivePatch`.
#[derive(Debug, Serialize)]
pub struct PlayerPatch<'a> {
    pub name: &'a str,
    pub team_id: &'a str,
    pub jersey_number: Option<u32>,
    pub position: Option<Position>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_phone: Option<&'a str>,
    pub contact_email: Option<&'a str>,
}

impl<'a> From<&'a NewPlayer> for PlayerPatch<'a> {
    fn from(p: &'a NewPlayer) -> Self {
        Self {
            name: p.name.trim(),
            team_id: &p.team_id,
            jersey_number: p.jersey_number,
            position: p.position,
            date_of_birth: p.date_of_birth,
            contact_phone: p.contact_phone.as_deref(),
            contact_email: p.contact_email.as_deref(),
        }
    }
}

/// Body of a post edit: the given fields plus the edit time.
#[derive(Debug, Serialize)]
pub struct PostPatch<'a> {
    #[serde(flatten)]
    pub update: &'a PostUpdate,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePatch {
    pub is_active: bool,
}

/// Error envelope returned by the REST layer (`{"message": ..., "code": ...}`).
#[derive(Debug, Deserialize, Default)]
pub struct StoreErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Object storage upload response (`{"Key": "uploads/<name>"}`).
#[derive(Debug, Deserialize, Default)]
pub struct UploadResponse {
    #[serde(rename = "Key", default)]
    pub key: String,
}

/// Column list the roster query asks for.
pub const ROSTER_COLUMNS: &str = "id,name,jersey_number,team_id,position";

/// `in.(a,b,c)` filter value.
pub fn in_filter(ids: &[String]) -> String {
    format!("in.({})", ids.join(","))
}

pub fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_filter_joins_ids() {
        assert_eq!(in_filter(&["tA".into(), "tB".into()]), "in.(tA,tB)");
    }

    #[test]
    fn player_patch_leaves_active_flag_out() {
        let player = NewPlayer {
            name: " Jane Doe ".into(),
            team_id: "tA".into(),
            jersey_number: Some(9),
            is_active: true,
            ..Default::default()
        };
        let body = serde_json::to_value(PlayerPatch::from(&player)).unwrap();
        assert_eq!(body["name"], "Jane Doe");
        assert!(body.get("is_active").is_none());
    }

    #[test]
    fn store_error_body_tolerates_missing_fields() {
        let body: StoreErrorBody =
            serde_json::from_str(r#"{"message":"duplicate key value"}"#).unwrap();
        assert_eq!(body.message, "duplicate key value");
        assert!(body.code.is_none());
    }
}
