//! Seams to the hosted league database and its object storage.
//!
//! Every method maps onto one query/insert/update/delete the site performs.
//! Ordering guarantees are part of the contract so callers never re-sort.

use crate::client::ApiResult;
use crate::{
    Match, MatchEvent, NewMatch, NewMatchEvent, NewPlayer, NewPost, NewTeam, Player, Post,
    PostKind, PostUpdate, Standing, Team, TeamId,
};
use chrono::{DateTime, Utc};
use std::future::Future;

pub trait EntityStore {
    /// All teams, ordered by name.
    fn list_teams(&self) -> impl Future<Output = ApiResult<Vec<Team>>> + Send;

    fn create_team(&self, team: &NewTeam) -> impl Future<Output = ApiResult<Team>> + Send;

    fn set_team_active(
        &self,
        team_id: &str,
        active: bool,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_team(&self, team_id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// All players, ordered by jersey number ascending (unnumbered last).
    fn list_players(&self) -> impl Future<Output = ApiResult<Vec<Player>>> + Send;

    /// Active players of any of `team_ids`, ordered by jersey number
    /// ascending with unnumbered players last.
    fn active_players(
        &self,
        team_ids: &[TeamId],
    ) -> impl Future<Output = ApiResult<Vec<Player>>> + Send;

    fn create_player(&self, player: &NewPlayer) -> impl Future<Output = ApiResult<Player>> + Send;

    /// Overwrites the player's details. The active flag is not touched.
    fn update_player(
        &self,
        player_id: &str,
        player: &NewPlayer,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn set_player_active(
        &self,
        player_id: &str,
        active: bool,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_player(&self, player_id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// All matches, ordered by match date ascending.
    fn list_matches(&self) -> impl Future<Output = ApiResult<Vec<Match>>> + Send;

    fn schedule_match(&self, fixture: &NewMatch) -> impl Future<Output = ApiResult<Match>> + Send;

    fn delete_match(&self, match_id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Sets both scores and marks the match completed.
    fn record_score(
        &self,
        match_id: &str,
        home_score: u32,
        away_score: u32,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    /// Removes every goal/assist row of one match. Succeeds when there are none.
    fn clear_match_events(&self, match_id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Inserts the rows as one batch.
    fn insert_match_events(
        &self,
        rows: &[NewMatchEvent],
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn list_match_events(&self) -> impl Future<Output = ApiResult<Vec<MatchEvent>>> + Send;

    /// Derived league table, best team first.
    fn standings(&self) -> impl Future<Output = ApiResult<Vec<Standing>>> + Send;
}

/// Blog and notice tables. Both kinds share one shape.
pub trait PostStore {
    /// Every post of `kind`, newest first.
    fn list_posts(&self, kind: PostKind) -> impl Future<Output = ApiResult<Vec<Post>>> + Send;

    /// One post; `ApiError::NotFound` when there is no such id.
    fn get_post(&self, kind: PostKind, id: &str) -> impl Future<Output = ApiResult<Post>> + Send;

    fn create_post(
        &self,
        kind: PostKind,
        post: &NewPost,
    ) -> impl Future<Output = ApiResult<Post>> + Send;

    /// Applies the given fields, stamps `updated_at` and returns the stored row.
    fn update_post(
        &self,
        kind: PostKind,
        id: &str,
        update: &PostUpdate,
        now: DateTime<Utc>,
    ) -> impl Future<Output = ApiResult<Post>> + Send;

    fn delete_post(&self, kind: PostKind, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

pub trait BlobStore {
    /// Stores `bytes` under `name` without overwriting; returns the stored path.
    fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = ApiResult<String>> + Send;

    fn public_url(&self, path: &str) -> String;
}
