//! In-process stand-in for the hosted store.
//!
//! Used when no hosted store is configured, and by tests that need to
//! inspect rows after a commit or make one store call fail.

use crate::client::{ApiError, ApiResult};
use crate::standings::compute_standings;
use crate::store::{BlobStore, EntityStore, PostStore};
use crate::{
    MAX_MINUTE, Match, MatchEvent, NewMatch, NewMatchEvent, NewPlayer, NewPost, NewTeam, Player,
    Post, PostKind, PostUpdate, Standing, Team, TeamId,
};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const DEMO_SEASON_JSON: &str = include_str!("../../data/demo_season.json");

/// Every persisted row, in the shape of the seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub match_events: Vec<MatchEvent>,
    #[serde(default)]
    pub blogs: Vec<Post>,
    #[serde(default)]
    pub notices: Vec<Post>,
}

impl LeagueSnapshot {
    fn ids(&self) -> impl Iterator<Item = &str> {
        let teams = self.teams.iter().map(|t| t.id.as_str());
        let players = self.players.iter().map(|p| p.id.as_str());
        let matches = self.matches.iter().map(|m| m.id.as_str());
        let events = self.match_events.iter().map(|e| e.id.as_str());
        let posts = self.blogs.iter().chain(&self.notices).map(|p| p.id.as_str());
        teams.chain(players).chain(matches).chain(events).chain(posts)
    }

    fn posts(&self, kind: PostKind) -> &[Post] {
        match kind {
            PostKind::Blog => &self.blogs,
            PostKind::Notice => &self.notices,
        }
    }

    fn posts_mut(&mut self, kind: PostKind) -> &mut Vec<Post> {
        match kind {
            PostKind::Blog => &mut self.blogs,
            PostKind::Notice => &mut self.notices,
        }
    }
}

/// Numeric tail of a `<prefix>-<n>` id.
fn id_number(id: &str) -> Option<u64> {
    id.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
}

/// Store operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListTeams,
    ListPlayers,
    ActivePlayers,
    ListMatches,
    RecordScore,
    ClearEvents,
    InsertEvents,
    ListEvents,
    Standings,
    SavePost,
    Upload,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: LeagueSnapshot,
    blobs: HashMap<String, (Vec<u8>, Option<String>)>,
    faults: HashMap<StoreOp, String>,
    next_id: u64,
}

impl Inner {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn take_fault(&mut self, op: StoreOp) -> ApiResult<()> {
        match self.faults.remove(&op) {
            Some(message) => Err(ApiError::Rejected { status: 503, message }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

fn rejected(status: u16, message: impl Into<String>) -> ApiError {
    ApiError::Rejected { status, message: message.into() }
}

fn not_found(table: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{table} row {id}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LeagueSnapshot) -> Self {
        let store = Self::default();
        {
            let mut inner = store.lock();
            inner.next_id = snapshot.ids().filter_map(id_number).max().unwrap_or(0);
            inner.snapshot = snapshot;
        }
        store
    }

    /// Load a seed file in the `LeagueSnapshot` JSON shape.
    pub fn from_seed_file(path: &Path) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::NotFound(format!("could not read {}: {e}", path.display())))?;
        let snapshot: LeagueSnapshot = serde_json::from_str(&content).map_err(|e| {
            ApiError::Other(format!("invalid seed json at {}: {e}", path.display()))
        })?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// The embedded demo season.
    pub fn demo() -> ApiResult<Self> {
        let snapshot: LeagueSnapshot = serde_json::from_str(DEMO_SEASON_JSON)
            .map_err(|e| ApiError::Other(format!("invalid embedded demo season: {e}")))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn snapshot(&self) -> LeagueSnapshot {
        self.lock().snapshot.clone()
    }

    /// Make the next call of `op` fail with `message`.
    pub fn fail_next(&self, op: StoreOp, message: impl Into<String>) {
        self.lock().faults.insert(op, message.into());
    }

    pub fn events_for(&self, match_id: &str) -> Vec<MatchEvent> {
        self.lock()
            .snapshot
            .match_events
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect()
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(path).map(|(bytes, _)| bytes.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sort_by_jersey(players: &mut [Player]) {
    players.sort_by_key(|p| (p.jersey_number.is_none(), p.jersey_number));
}

fn check_jersey(snapshot: &LeagueSnapshot, player: &NewPlayer, except: Option<&str>) -> ApiResult<()> {
    let Some(number) = player.jersey_number else {
        return Ok(());
    };
    let clash = snapshot.players.iter().any(|p| {
        p.team_id == player.team_id
            && p.jersey_number == Some(number)
            && Some(p.id.as_str()) != except
    });
    if clash {
        return Err(rejected(409, format!("jersey number {number} is already taken in this team")));
    }
    Ok(())
}

impl EntityStore for MemoryStore {
    async fn list_teams(&self) -> ApiResult<Vec<Team>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ListTeams)?;
        let mut teams = inner.snapshot.teams.clone();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn create_team(&self, team: &NewTeam) -> ApiResult<Team> {
        let mut inner = self.lock();
        let name = team.name.trim();
        if name.is_empty() {
            return Err(rejected(400, "team name is required"));
        }
        if inner.snapshot.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(rejected(409, format!("a team named {name} already exists")));
        }
        let row = Team {
            id: inner.fresh_id("team"),
            name: name.to_owned(),
            representative_name: team.representative_name.clone(),
            contact_phone: team.contact_phone.clone(),
            contact_email: team.contact_email.clone(),
            is_active: team.is_active,
            created_at: Some(Utc::now()),
        };
        inner.snapshot.teams.push(row.clone());
        Ok(row)
    }

    async fn set_team_active(&self, team_id: &str, active: bool) -> ApiResult<()> {
        let mut inner = self.lock();
        let team = inner
            .snapshot
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| not_found("teams", team_id))?;
        team.is_active = active;
        Ok(())
    }

    async fn delete_team(&self, team_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        let snapshot = &mut inner.snapshot;
        let referenced = snapshot.players.iter().any(|p| p.team_id == team_id)
            || snapshot.matches.iter().any(|m| m.involves(team_id));
        if referenced {
            return Err(rejected(
                409,
                "team is still referenced by players or matches; deactivate it instead",
            ));
        }
        snapshot.teams.retain(|t| t.id != team_id);
        Ok(())
    }

    async fn list_players(&self) -> ApiResult<Vec<Player>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ListPlayers)?;
        let mut players = inner.snapshot.players.clone();
        sort_by_jersey(&mut players);
        Ok(players)
    }

    async fn active_players(&self, team_ids: &[TeamId]) -> ApiResult<Vec<Player>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ActivePlayers)?;
        let mut players: Vec<Player> = inner
            .snapshot
            .players
            .iter()
            .filter(|p| p.is_active && team_ids.contains(&p.team_id))
            .cloned()
            .collect();
        sort_by_jersey(&mut players);
        Ok(players)
    }

    async fn create_player(&self, player: &NewPlayer) -> ApiResult<Player> {
        let mut inner = self.lock();
        if !inner.snapshot.teams.iter().any(|t| t.id == player.team_id) {
            return Err(rejected(409, format!("unknown team {}", player.team_id)));
        }
        check_jersey(&inner.snapshot, player, None)?;
        let row = Player {
            id: inner.fresh_id("player"),
            name: player.name.trim().to_owned(),
            team_id: player.team_id.clone(),
            jersey_number: player.jersey_number,
            position: player.position,
            date_of_birth: player.date_of_birth,
            contact_phone: player.contact_phone.clone(),
            contact_email: player.contact_email.clone(),
            is_active: player.is_active,
            created_at: Some(Utc::now()),
        };
        inner.snapshot.players.push(row.clone());
        Ok(row)
    }

    async fn update_player(&self, player_id: &str, player: &NewPlayer) -> ApiResult<()> {
        let mut inner = self.lock();
        check_jersey(&inner.snapshot, player, Some(player_id))?;
        let row = inner
            .snapshot
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| not_found("players", player_id))?;
        row.name = player.name.trim().to_owned();
        row.team_id = player.team_id.clone();
        row.jersey_number = player.jersey_number;
        row.position = player.position;
        row.date_of_birth = player.date_of_birth;
        row.contact_phone = player.contact_phone.clone();
        row.contact_email = player.contact_email.clone();
        Ok(())
    }

    async fn set_player_active(&self, player_id: &str, active: bool) -> ApiResult<()> {
        let mut inner = self.lock();
        let row = inner
            .snapshot
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| not_found("players", player_id))?;
        row.is_active = active;
        Ok(())
    }

    async fn delete_player(&self, player_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        let snapshot = &mut inner.snapshot;
        if snapshot.match_events.iter().any(|e| e.player_id == player_id) {
            return Err(rejected(409, "player has recorded goals or assists; deactivate instead"));
        }
        snapshot.players.retain(|p| p.id != player_id);
        Ok(())
    }

    async fn list_matches(&self) -> ApiResult<Vec<Match>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ListMatches)?;
        let mut matches = inner.snapshot.matches.clone();
        matches.sort_by_key(|m| (m.match_date, m.match_time));
        Ok(matches)
    }

    async fn schedule_match(&self, fixture: &NewMatch) -> ApiResult<Match> {
        let mut inner = self.lock();
        if fixture.home_team_id == fixture.away_team_id {
            return Err(rejected(400, "home and away teams must differ"));
        }
        for team_id in [&fixture.home_team_id, &fixture.away_team_id] {
            if !inner.snapshot.teams.iter().any(|t| &t.id == team_id) {
                return Err(rejected(409, format!("unknown team {team_id}")));
            }
        }
        let row = Match {
            id: inner.fresh_id("match"),
            match_day: fixture.match_day,
            home_team_id: fixture.home_team_id.clone(),
            away_team_id: fixture.away_team_id.clone(),
            match_date: fixture.match_date,
            match_time: fixture.match_time,
            venue: fixture.venue.clone(),
            home_score: None,
            away_score: None,
            is_completed: false,
            created_at: Some(Utc::now()),
        };
        inner.snapshot.matches.push(row.clone());
        Ok(row)
    }

    async fn delete_match(&self, match_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        let snapshot = &mut inner.snapshot;
        snapshot.match_events.retain(|e| e.match_id != match_id);
        snapshot.matches.retain(|m| m.id != match_id);
        Ok(())
    }

    async fn record_score(&self, match_id: &str, home_score: u32, away_score: u32) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::RecordScore)?;
        let row = inner
            .snapshot
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| not_found("matches", match_id))?;
        row.home_score = Some(home_score);
        row.away_score = Some(away_score);
        row.is_completed = true;
        Ok(())
    }

    async fn clear_match_events(&self, match_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ClearEvents)?;
        inner.snapshot.match_events.retain(|e| e.match_id != match_id);
        Ok(())
    }

    async fn insert_match_events(&self, rows: &[NewMatchEvent]) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::InsertEvents)?;

        // Validate the whole batch first so a bad row inserts nothing.
        for row in rows {
            let fixture = inner
                .snapshot
                .matches
                .iter()
                .find(|m| m.id == row.match_id)
                .ok_or_else(|| not_found("matches", &row.match_id))?;
            if !fixture.involves(&row.team_id) {
                return Err(rejected(
                    409,
                    format!("team {} does not play in match {}", row.team_id, row.match_id),
                ));
            }
            if row.minute.is_some_and(|m| m > MAX_MINUTE) {
                return Err(rejected(400, format!("minute must be between 0 and {MAX_MINUTE}")));
            }
        }

        let now = Utc::now();
        for row in rows {
            let id = inner.fresh_id("event");
            inner.snapshot.match_events.push(MatchEvent {
                id,
                match_id: row.match_id.clone(),
                player_id: row.player_id.clone(),
                team_id: row.team_id.clone(),
                event_type: row.event_type,
                minute: row.minute,
                created_at: Some(now),
            });
        }
        debug!("memory store: inserted {} event rows", rows.len());
        Ok(())
    }

    async fn list_match_events(&self) -> ApiResult<Vec<MatchEvent>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::ListEvents)?;
        Ok(inner.snapshot.match_events.clone())
    }

    async fn standings(&self) -> ApiResult<Vec<Standing>> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::Standings)?;
        Ok(compute_standings(&inner.snapshot.teams, &inner.snapshot.matches))
    }
}

impl PostStore for MemoryStore {
    async fn list_posts(&self, kind: PostKind) -> ApiResult<Vec<Post>> {
        let inner = self.lock();
        // Later inserts first, so equal timestamps still read newest first.
        let mut posts: Vec<Post> = inner.snapshot.posts(kind).iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_post(&self, kind: PostKind, id: &str) -> ApiResult<Post> {
        let inner = self.lock();
        inner
            .snapshot
            .posts(kind)
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(kind.table(), id))
    }

    async fn create_post(&self, kind: PostKind, post: &NewPost) -> ApiResult<Post> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::SavePost)?;
        let row = Post {
            id: inner.fresh_id(kind.label()),
            title: post.title.trim().to_owned(),
            body: post.body.clone(),
            author_email: post.author_email.clone(),
            image_url: post.image_url.clone(),
            is_published: post.is_published,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        inner.snapshot.posts_mut(kind).push(row.clone());
        Ok(row)
    }

    async fn update_post(
        &self,
        kind: PostKind,
        id: &str,
        update: &PostUpdate,
        now: DateTime<Utc>,
    ) -> ApiResult<Post> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::SavePost)?;
        let row = inner
            .snapshot
            .posts_mut(kind)
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(kind.table(), id))?;
        update.apply_to(row);
        row.updated_at = Some(now);
        Ok(row.clone())
    }

    async fn delete_post(&self, kind: PostKind, id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.snapshot.posts_mut(kind).retain(|p| p.id != id);
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: Option<&str>) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.take_fault(StoreOp::Upload)?;
        if inner.blobs.contains_key(name) {
            return Err(rejected(409, "The resource already exists"));
        }
        inner
            .blobs
            .insert(name.to_owned(), (bytes, content_type.map(str::to_owned)));
        Ok(name.to_owned())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://uploads/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventType;
    use chrono::NaiveDate;

    fn new_team(name: &str) -> NewTeam {
        NewTeam { name: name.into(), is_active: true, ..Default::default() }
    }

    #[test]
    fn embedded_demo_season_parses() {
        let store = MemoryStore::demo().expect("demo season should parse");
        let snapshot = store.snapshot();
        assert!(snapshot.teams.len() >= 4);
        assert!(snapshot.matches.iter().any(|m| m.is_completed));
        assert!(snapshot.matches.iter().any(|m| !m.is_completed));
    }

    #[test]
    fn demo_season_completed_matches_have_scores() {
        let snapshot = MemoryStore::demo().unwrap().snapshot();
        for m in &snapshot.matches {
            assert_eq!(m.is_completed, m.result().is_some(), "match {}", m.id);
        }
    }

    #[tokio::test]
    async fn team_names_are_unique() {
        let store = MemoryStore::new();
        store.create_team(&new_team("Class of 2010")).await.unwrap();
        let err = store.create_team(&new_team("class of 2010")).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn jersey_numbers_are_unique_within_a_team() {
        let store = MemoryStore::new();
        let a = store.create_team(&new_team("A")).await.unwrap();
        let b = store.create_team(&new_team("B")).await.unwrap();
        let player = |team: &str| NewPlayer {
            name: "X".into(),
            team_id: team.into(),
            jersey_number: Some(9),
            is_active: true,
            ..Default::default()
        };
        store.create_player(&player(&a.id)).await.unwrap();
        store.create_player(&player(&b.id)).await.expect("other team may reuse 9");
        assert!(store.create_player(&player(&a.id)).await.is_err());
    }

    #[tokio::test]
    async fn active_players_orders_numbered_first() {
        let store = MemoryStore::new();
        let a = store.create_team(&new_team("A")).await.unwrap();
        for (name, number, active) in [("Nil", None, true), ("Ten", Some(10), true), ("One", Some(1), true), ("Gone", Some(2), false)] {
            store
                .create_player(&NewPlayer {
                    name: name.into(),
                    team_id: a.id.clone(),
                    jersey_number: number,
                    is_active: active,
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .active_players(&[a.id.clone()])
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["One", "Ten", "Nil"]);
    }

    #[tokio::test]
    async fn editing_a_player_keeps_them_inactive() {
        let store = MemoryStore::new();
        let a = store.create_team(&new_team("A")).await.unwrap();
        let mut edit = NewPlayer {
            name: "Sam".into(),
            team_id: a.id.clone(),
            is_active: true,
            ..Default::default()
        };
        let sam = store.create_player(&edit).await.unwrap();
        store.set_player_active(&sam.id, false).await.unwrap();

        edit.jersey_number = Some(5);
        store.update_player(&sam.id, &edit).await.unwrap();
        let row = store.snapshot().players.into_iter().find(|p| p.id == sam.id).unwrap();
        assert_eq!(row.jersey_number, Some(5));
        assert!(!row.is_active);
    }

    #[tokio::test]
    async fn seeded_ids_with_gaps_are_not_reused() {
        let snapshot = LeagueSnapshot {
            teams: vec![
                Team { id: "team-1".into(), name: "A".into(), is_active: true, ..Default::default() },
                Team { id: "team-3".into(), name: "B".into(), is_active: true, ..Default::default() },
            ],
            ..Default::default()
        };
        let store = MemoryStore::from_snapshot(snapshot);
        store.create_team(&new_team("C")).await.unwrap();
        store.create_team(&new_team("D")).await.unwrap();

        let mut ids: Vec<String> = store.snapshot().teams.into_iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn demo_season_ids_stay_unique_after_inserts() {
        let store = MemoryStore::demo().unwrap();
        let before = store.snapshot().teams.len();
        store.create_team(&new_team("Class of 2030")).await.unwrap();
        let snapshot = store.snapshot();
        let mut ids: Vec<&str> = snapshot.ids().collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(snapshot.teams.len(), before + 1);
    }

    #[tokio::test]
    async fn event_team_must_play_in_the_match() {
        let store = MemoryStore::new();
        let a = store.create_team(&new_team("A")).await.unwrap();
        let b = store.create_team(&new_team("B")).await.unwrap();
        let c = store.create_team(&new_team("C")).await.unwrap();
        let fixture = store
            .schedule_match(&NewMatch {
                match_day: 1,
                home_team_id: a.id.clone(),
                away_team_id: b.id.clone(),
                match_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                match_time: None,
                venue: None,
            })
            .await
            .unwrap();
        let row = NewMatchEvent {
            match_id: fixture.id.clone(),
            player_id: "p".into(),
            team_id: c.id.clone(),
            event_type: EventType::Goal,
            minute: Some(5),
        };
        assert!(store.insert_match_events(&[row]).await.is_err());
        assert!(store.events_for(&fixture.id).is_empty());
    }

    #[tokio::test]
    async fn injected_fault_fires_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreOp::ListTeams, "connection reset");
        let err = store.list_teams().await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert!(store.list_teams().await.is_ok());
    }

    #[tokio::test]
    async fn posts_are_kept_per_kind_newest_first() {
        let store = MemoryStore::new();
        let post = |title: &str| NewPost {
            title: title.into(),
            body: "text".into(),
            author_email: None,
            image_url: None,
            is_published: true,
        };
        store.create_post(PostKind::Blog, &post("First")).await.unwrap();
        let second = store.create_post(PostKind::Blog, &post("Second")).await.unwrap();
        store.create_post(PostKind::Notice, &post("AGM")).await.unwrap();

        let titles: Vec<String> =
            store.list_posts(PostKind::Blog).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(store.list_posts(PostKind::Notice).await.unwrap().len(), 1);
        assert!(store.get_post(PostKind::Notice, &second.id).await.is_err());

        store.delete_post(PostKind::Blog, &second.id).await.unwrap();
        assert!(matches!(
            store.get_post(PostKind::Blog, &second.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn upload_does_not_overwrite() {
        let store = MemoryStore::new();
        let path = store.upload("1_a.png", vec![1], Some("image/png")).await.unwrap();
        assert_eq!(store.public_url(&path), "memory://uploads/1_a.png");
        assert!(store.upload("1_a.png", vec![2], None).await.is_err());
        assert_eq!(store.blob("1_a.png"), Some(vec![1]));
    }
}
