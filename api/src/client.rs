use crate::store::{BlobStore, EntityStore, PostStore};
use crate::wire::{
    ActivePatch, PlayerPatch, PostPatch, ROSTER_COLUMNS, ScorePatch, StoreErrorBody, UploadResponse, eq_filter, in_filter,
};
use crate::{
    Match, MatchEvent, NewMatch, NewMatchEvent, NewPlayer, NewPost, NewTeam, Player, Post,
    PostKind, PostUpdate, Standing, Team, TeamId,
};
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const REST_PATH: &str = "rest/v1";
const STORAGE_PATH: &str = "storage/v1/object";
pub const UPLOAD_BUCKET: &str = "uploads";

/// Client for the hosted league database (PostgREST tables and views) and
/// its object storage.
#[derive(Debug, Clone)]
pub struct LeagueApi {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// The store answered with an error status; `message` is its own text.
    Rejected { status: u16, message: String },
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Rejected { message, .. } => write!(f, "{message}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl LeagueApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("league-admin/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/{REST_PATH}/{table}", self.base_url)
        } else {
            format!("{}/{REST_PATH}/{table}?{query}", self.base_url)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.timeout)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StoreErrorBody>(&body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        Err(ApiError::Rejected { status: status.as_u16(), message })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.send(self.request(Method::GET, url), url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    /// Insert and read the stored row back.
    async fn insert_returning<B, T>(&self, table: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, "");
        debug!("POST {url}");
        let builder = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<T> = self
            .send(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{table}: insert returned no row")))
    }

    async fn insert<B: Serialize + ?Sized>(&self, table: &str, body: &B) -> ApiResult<()> {
        let url = self.table_url(table, "");
        debug!("POST {url}");
        let builder = self
            .request(Method::POST, &url)
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(builder, &url).await.map(drop)
    }

    async fn patch<B: Serialize + ?Sized>(&self, table: &str, query: &str, body: &B) -> ApiResult<()> {
        let url = self.table_url(table, query);
        debug!("PATCH {url}");
        let builder = self.request(Method::PATCH, &url).json(body);
        self.send(builder, &url).await.map(drop)
    }

    /// Patch one row and read it back.
    async fn patch_returning<B, T>(&self, table: &str, query: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, query);
        debug!("PATCH {url}");
        let builder = self
            .request(Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<T> = self
            .send(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{table} {query}")))
    }

    async fn delete(&self, table: &str, query: &str) -> ApiResult<()> {
        let url = self.table_url(table, query);
        debug!("DELETE {url}");
        self.send(self.request(Method::DELETE, &url), &url)
            .await
            .map(drop)
    }
}

impl EntityStore for LeagueApi {
    async fn list_teams(&self) -> ApiResult<Vec<Team>> {
        self.get(&self.table_url("teams", "select=*&order=name.asc")).await
    }

    async fn create_team(&self, team: &NewTeam) -> ApiResult<Team> {
        self.insert_returning("teams", team).await
    }

    async fn set_team_active(&self, team_id: &str, active: bool) -> ApiResult<()> {
        let query = format!("id={}", eq_filter(team_id));
        self.patch("teams", &query, &ActivePatch { is_active: active }).await
    }

    async fn delete_team(&self, team_id: &str) -> ApiResult<()> {
        self.delete("teams", &format!("id={}", eq_filter(team_id))).await
    }

    async fn list_players(&self) -> ApiResult<Vec<Player>> {
        self.get(&self.table_url("players", "select=*&order=jersey_number.asc.nullslast"))
            .await
    }

    async fn active_players(&self, team_ids: &[TeamId]) -> ApiResult<Vec<Player>> {
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "select={ROSTER_COLUMNS}&team_id={}&is_active=eq.true&order=jersey_number.asc.nullslast",
            in_filter(team_ids)
        );
        self.get(&self.table_url("players", &query)).await
    }

    async fn create_player(&self, player: &NewPlayer) -> ApiResult<Player> {
        self.insert_returning("players", player).await
    }

    async fn update_player(&self, player_id: &str, player: &NewPlayer) -> ApiResult<()> {
        let query = format!("id={}", eq_filter(player_id));
        self.patch("players", &query, &PlayerPatch::from(player)).await
    }

    async fn set_player_active(&self, player_id: &str, active: bool) -> ApiResult<()> {
        let query = format!("id={}", eq_filter(player_id));
        self.patch("players", &query, &ActivePatch { is_active: active })
            .await
    }

    async fn delete_player(&self, player_id: &str) -> ApiResult<()> {
        self.delete("players", &format!("id={}", eq_filter(player_id)))
            .await
    }

    async fn list_matches(&self) -> ApiResult<Vec<Match>> {
        self.get(&self.table_url("matches", "select=*&order=match_date.asc"))
            .await
    }

    async fn schedule_match(&self, fixture: &NewMatch) -> ApiResult<Match> {
        self.insert_returning("matches", fixture).await
    }

    async fn delete_match(&self, match_id: &str) -> ApiResult<()> {
        self.delete("matches", &format!("id={}", eq_filter(match_id)))
            .await
    }

    async fn record_score(&self, match_id: &str, home_score: u32, away_score: u32) -> ApiResult<()> {
        let query = format!("id={}", eq_filter(match_id));
        self.patch("matches", &query, &ScorePatch::completed(home_score, away_score))
            .await
    }

    async fn clear_match_events(&self, match_id: &str) -> ApiResult<()> {
        self.delete("match_events", &format!("match_id={}", eq_filter(match_id)))
            .await
    }

    async fn insert_match_events(&self, rows: &[NewMatchEvent]) -> ApiResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.insert("match_events", rows).await
    }

    async fn list_match_events(&self) -> ApiResult<Vec<MatchEvent>> {
        self.get(&self.table_url("match_events", "select=*")).await
    }

    async fn standings(&self) -> ApiResult<Vec<Standing>> {
        self.get(&self.table_url("league_standings", "select=*&order=position.asc"))
            .await
    }
}

impl PostStore for LeagueApi {
    async fn list_posts(&self, kind: PostKind) -> ApiResult<Vec<Post>> {
        self.get(&self.table_url(kind.table(), "select=*&order=created_at.desc"))
            .await
    }

    async fn get_post(&self, kind: PostKind, id: &str) -> ApiResult<Post> {
        let query = format!("select=*&id={}", eq_filter(id));
        let rows: Vec<Post> = self.get(&self.table_url(kind.table(), &query)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{} {id}", kind.label())))
    }

    async fn create_post(&self, kind: PostKind, post: &NewPost) -> ApiResult<Post> {
        self.insert_returning(kind.table(), post).await
    }

    async fn update_post(
        &self,
        kind: PostKind,
        id: &str,
        update: &PostUpdate,
        now: DateTime<Utc>,
    ) -> ApiResult<Post> {
        let query = format!("id={}", eq_filter(id));
        let body = PostPatch { update, updated_at: now };
        self.patch_returning(kind.table(), &query, &body).await
    }

    async fn delete_post(&self, kind: PostKind, id: &str) -> ApiResult<()> {
        self.delete(kind.table(), &format!("id={}", eq_filter(id))).await
    }
}

impl BlobStore for LeagueApi {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: Option<&str>) -> ApiResult<String> {
        let url = format!("{}/{STORAGE_PATH}/{UPLOAD_BUCKET}/{name}", self.base_url);
        debug!("upload {url} ({} bytes)", bytes.len());
        let builder = self
            .request(Method::POST, &url)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream").to_owned(),
            )
            .body(bytes);
        let stored: UploadResponse = self
            .send(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;

        let prefix = format!("{UPLOAD_BUCKET}/");
        let path = stored
            .key
            .strip_prefix(prefix.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(name);
        Ok(path.to_owned())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{STORAGE_PATH}/public/{UPLOAD_BUCKET}/{path}", self.base_url)
    }
}
