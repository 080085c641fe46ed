use crate::app::MenuItem;
use crate::state::forms::FormState;
use crate::state::messages::{LeagueData, Mutation};
use league_api::composer::{ComposerAction, EntryField, MatchResultComposer};
use league_api::roster::Rosters;
use league_api::session::AdminSession;
use league_api::standings::compute_leaders;
use league_api::{LeagueError, Leader, Match, Player, Side, Team};

// ---------------------------------------------------------------------------
// League data as shown in the public tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LeagueState {
    pub data: LeagueData,
    pub leaders: Vec<Leader>,
    pub loaded: bool,
}

impl LeagueState {
    pub fn load(&mut self, data: LeagueData) {
        self.leaders = compute_leaders(&data.events, &data.players, &data.teams);
        self.data = data;
        self.loaded = true;
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.data.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_name(&self, team_id: &str) -> String {
        self.team(team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "Unknown team".to_string())
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.data.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_name(&self, player_id: &str) -> String {
        self.player(player_id)
            .map(|p| p.display_name())
            .unwrap_or_else(|| "Unknown player".to_string())
    }

    /// Scheduled matches not yet played, by date.
    pub fn fixtures(&self) -> Vec<&Match> {
        self.data.matches.iter().filter(|m| !m.is_completed).collect()
    }

    /// Completed matches, most recent first.
    pub fn results(&self) -> Vec<&Match> {
        let mut results: Vec<&Match> = self.data.matches.iter().filter(|m| m.is_completed).collect();
        results.sort_by(|a, b| b.match_date.cmp(&a.match_date).then(b.match_time.cmp(&a.match_time)));
        results
    }

    /// Players of one team, active players first then by shirt number.
    pub fn squad(&self, team_id: &str) -> Vec<&Player> {
        let mut squad: Vec<&Player> =
            self.data.players.iter().filter(|p| p.team_id == team_id).collect();
        squad.sort_by_key(|p| (!p.is_active, p.jersey_number.is_none(), p.jersey_number));
        squad
    }
}

// ---------------------------------------------------------------------------
// Score entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryColumn {
    #[default]
    Scorer,
    Minute,
    Assist,
}

impl EntryColumn {
    pub fn next(self) -> Self {
        match self {
            EntryColumn::Scorer => EntryColumn::Minute,
            EntryColumn::Minute => EntryColumn::Assist,
            EntryColumn::Assist => EntryColumn::Scorer,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EntryColumn::Scorer => EntryColumn::Assist,
            EntryColumn::Minute => EntryColumn::Scorer,
            EntryColumn::Assist => EntryColumn::Minute,
        }
    }
}

/// The goal sheet open for one match: the composer plus a cursor.
#[derive(Debug, Clone)]
pub struct ScoreSheet {
    pub composer: MatchResultComposer,
    pub side: Side,
    pub row: usize,
    pub column: EntryColumn,
}

impl ScoreSheet {
    pub fn new(composer: MatchResultComposer) -> Self {
        Self { composer, side: Side::Home, row: 0, column: EntryColumn::Scorer }
    }

    fn clamp_row(&mut self) {
        let len = self.composer.entries(self.side).len();
        self.row = self.row.min(len.saturating_sub(1));
    }

    pub fn switch_side(&mut self) {
        self.side = self.side.other();
        self.clamp_row();
    }

    pub fn row_down(&mut self) {
        self.row += 1;
        self.clamp_row();
    }

    pub fn row_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn adjust_score(&mut self, delta: i32) -> Result<(), LeagueError> {
        let score = (self.composer.score(self.side) as i32 + delta).max(0) as u32;
        self.composer.apply(ComposerAction::SetScore { side: self.side, score })?;
        self.clamp_row();
        Ok(())
    }

    pub fn remove_current(&mut self) -> Result<(), LeagueError> {
        self.composer
            .apply(ComposerAction::RemoveEntry { side: self.side, index: self.row })?;
        self.clamp_row();
        Ok(())
    }

    /// Step the focused scorer or assist through the side's squad; the
    /// list starts with "nobody".
    pub fn cycle_player(&mut self, rosters: &Rosters, forward: bool) -> Result<(), LeagueError> {
        let squad = rosters
            .get(self.composer.team_id(self.side))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let Some(entry) = self.composer.entries(self.side).get(self.row) else {
            return Ok(());
        };
        let current = match self.column {
            EntryColumn::Scorer => entry.scorer.as_deref(),
            EntryColumn::Assist => entry.assist.as_deref(),
            EntryColumn::Minute => return Ok(()),
        };

        let options = squad.len() + 1;
        let index = current
            .and_then(|id| squad.iter().position(|p| p.id == id))
            .map_or(0, |i| i + 1);
        let next = if forward { (index + 1) % options } else { (index + options - 1) % options };
        let player = next.checked_sub(1).and_then(|i| squad.get(i)).map(|p| p.id.clone());

        let field = match self.column {
            EntryColumn::Assist => EntryField::Assist(player),
            _ => EntryField::Scorer(player),
        };
        self.composer
            .apply(ComposerAction::SetField { side: self.side, index: self.row, field })
    }

    /// Type one digit into the focused minute.
    pub fn push_minute_digit(&mut self, digit: u8) -> Result<(), LeagueError> {
        let Some(entry) = self.composer.entries(self.side).get(self.row) else {
            return Ok(());
        };
        let minute = u16::from(entry.minute) * 10 + u16::from(digit);
        let Ok(minute) = u8::try_from(minute) else {
            return Ok(());
        };
        self.composer.apply(ComposerAction::SetField {
            side: self.side,
            index: self.row,
            field: EntryField::Minute(minute),
        })
    }

    pub fn clear_minute_digit(&mut self) -> Result<(), LeagueError> {
        let Some(entry) = self.composer.entries(self.side).get(self.row) else {
            return Ok(());
        };
        let minute = entry.minute / 10;
        self.composer.apply(ComposerAction::SetField {
            side: self.side,
            index: self.row,
            field: EntryField::Minute(minute),
        })
    }
}

#[derive(Debug, Default)]
pub struct ScoreEntryState {
    pub selected_match: usize,
    pub sheet: Option<ScoreSheet>,
    pub rosters: Rosters,
}

// ---------------------------------------------------------------------------
// Registration / management
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManageSection {
    #[default]
    Teams,
    Players,
    Matches,
}

impl ManageSection {
    pub fn next(self) -> Self {
        match self {
            ManageSection::Teams => ManageSection::Players,
            ManageSection::Players => ManageSection::Matches,
            ManageSection::Matches => ManageSection::Teams,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ManageSection::Teams => "Teams",
            ManageSection::Players => "Players",
            ManageSection::Matches => "Matches",
        }
    }
}

#[derive(Debug, Default)]
pub struct ManageState {
    pub section: ManageSection,
    pub selected: usize,
}

// ---------------------------------------------------------------------------
// Admin session and modals
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AdminState {
    pub session: Option<AdminSession>,
    pub token: Option<String>,
}

impl AdminState {
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some() && self.token.is_some()
    }
}

/// A destructive mutation waiting for a y/n answer.
#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub prompt: String,
    pub mutation: Mutation,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_intro: bool,
    pub show_logs: bool,
    pub alert: Option<String>,
    pub status: Option<String>,
    /// Tab to open once the login form succeeds.
    pub after_login: Option<MenuItem>,
    pub form: Option<FormState>,
    pub confirm: Option<PendingConfirm>,
    pub league: LeagueState,
    pub admin: AdminState,
    pub scores: ScoreEntryState,
    pub manage: ManageState,
    pub table_scroll: u16,
    pub fixtures_scroll: u16,
    pub results_selected: usize,
    pub squads_selected: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            show_intro: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sheet() -> ScoreSheet {
        ScoreSheet::new(MatchResultComposer::new("M1", "tA", "tB"))
    }

    fn rosters() -> Rosters {
        let player = |id: &str, team: &str, n: u32| Player {
            id: id.into(),
            name: id.into(),
            team_id: team.into(),
            jersey_number: Some(n),
            is_active: true,
            ..Default::default()
        };
        HashMap::from([
            ("tA".to_string(), vec![player("P1", "tA", 1), player("P2", "tA", 2)]),
            ("tB".to_string(), vec![player("P4", "tB", 4)]),
        ])
    }

    #[test]
    fn test_score_follows_entry_count() {
        let mut s = sheet();
        s.adjust_score(1).unwrap();
        s.adjust_score(1).unwrap();
        assert_eq!(s.composer.score(Side::Home), 2);
        s.row_down();
        s.remove_current().unwrap();
        assert_eq!(s.composer.score(Side::Home), 1);
        assert_eq!(s.row, 0);
        s.adjust_score(-5).unwrap();
        assert_eq!(s.composer.score(Side::Home), 0);
    }

    #[test]
    fn test_cycle_player_wraps_through_nobody() {
        let rosters = rosters();
        let mut s = sheet();
        s.adjust_score(1).unwrap();
        s.cycle_player(&rosters, true).unwrap();
        assert_eq!(s.composer.entries(Side::Home)[0].scorer.as_deref(), Some("P1"));
        s.cycle_player(&rosters, true).unwrap();
        s.cycle_player(&rosters, true).unwrap();
        assert_eq!(s.composer.entries(Side::Home)[0].scorer, None);
        s.cycle_player(&rosters, false).unwrap();
        assert_eq!(s.composer.entries(Side::Home)[0].scorer.as_deref(), Some("P2"));
    }

    #[test]
    fn test_cycle_uses_the_focused_side_squad() {
        let rosters = rosters();
        let mut s = sheet();
        s.switch_side();
        s.adjust_score(1).unwrap();
        s.column = EntryColumn::Assist;
        s.cycle_player(&rosters, true).unwrap();
        assert_eq!(s.composer.entries(Side::Away)[0].assist.as_deref(), Some("P4"));
        assert_eq!(s.composer.entries(Side::Away)[0].scorer, None);
    }

    #[test]
    fn test_minute_typing() {
        let mut s = sheet();
        s.adjust_score(1).unwrap();
        s.column = EntryColumn::Minute;
        for d in [4, 5] {
            s.push_minute_digit(d).unwrap();
        }
        assert_eq!(s.composer.entries(Side::Home)[0].minute, 45);
        s.push_minute_digit(9).unwrap(); // 459 does not fit
        assert_eq!(s.composer.entries(Side::Home)[0].minute, 45);
        s.clear_minute_digit().unwrap();
        assert_eq!(s.composer.entries(Side::Home)[0].minute, 4);
    }

    #[test]
    fn test_results_are_newest_first() {
        use chrono::NaiveDate;
        let played = |id: &str, day: u32| Match {
            id: id.into(),
            match_day: day,
            home_team_id: "tA".into(),
            away_team_id: "tB".into(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            match_time: None,
            venue: None,
            home_score: Some(1),
            away_score: Some(0),
            is_completed: true,
            created_at: None,
        };
        let mut league = LeagueState::default();
        league.load(LeagueData {
            matches: vec![played("m1", 1), played("m2", 8)],
            ..Default::default()
        });
        let ids: Vec<&str> = league.results().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
        assert!(league.fixtures().is_empty());
    }
}
