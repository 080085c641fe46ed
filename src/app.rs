use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, ManageSection, PendingConfirm, ScoreSheet};
use crate::state::forms::{self, FormKind, FormState};
use crate::state::messages::{LeagueData, Mutation, NetworkRequest};
use chrono::{DateTime, Utc};
use league_api::committer::CommitReport;
use league_api::composer::MatchResultComposer;
use league_api::roster::{Rosters, team_ids_for};
use league_api::session::AdminSession;
use league_api::{LeagueError, Match};
use log::{info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Table,
    Fixtures,
    Results,
    Squads,
    Scores,
    Manage,
    Help,
}

impl MenuItem {
    pub fn requires_admin(&self) -> bool {
        matches!(self, MenuItem::Scores | MenuItem::Manage)
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_league_loaded(&mut self, league: LeagueData) {
        self.state.league.load(league);
        self.clamp_selections();
    }

    pub fn on_rosters_loaded(&mut self, rosters: Rosters) {
        if rosters.is_empty() && !self.score_matches().is_empty() {
            warn!("no squads available; goals cannot be attributed");
        }
        self.state.scores.rosters = rosters;
    }

    /// Store the session and open the tab that asked for a login, if any.
    pub fn on_logged_in(&mut self, session: AdminSession, token: String) -> Option<NetworkRequest> {
        self.state.status = Some(format!("Logged in as {}", session.name));
        self.state.admin.session = Some(session);
        self.state.admin.token = Some(token);
        self.state.form = None;
        let tab = self.state.after_login.take()?;
        self.update_tab(tab)
    }

    pub fn on_mutation_applied(&mut self, message: String, league: LeagueData) {
        self.state.status = Some(message);
        self.state.form = None;
        self.state.confirm = None;
        self.on_league_loaded(league);
    }

    pub fn on_result_committed(&mut self, report: CommitReport, league: LeagueData) {
        info!(
            "result saved for match {} after {} attempt(s)",
            report.match_id, report.attempts
        );
        self.state.status = Some(format!(
            "Match updated: {}-{} with {} goal/assist rows",
            report.home_score, report.away_score, report.events_inserted
        ));
        self.state.scores.sheet = None;
        self.on_league_loaded(league);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.alert = Some(message);
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn open_login(&mut self) {
        self.state.form = Some(FormState::login());
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.state.admin.session.take() {
            info!("admin {} logged out", session.email);
        }
        self.state.admin.token = None;
        self.state.scores.sheet = None;
        self.state.confirm = None;
        if self.state.active_tab.requires_admin() {
            self.state.active_tab = MenuItem::Table;
        }
    }

    /// Drop an expired login. Returns true when something changed.
    pub fn check_session(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self
            .state
            .admin
            .session
            .as_ref()
            .is_some_and(|s| !s.is_valid_at(now));
        if expired {
            self.logout();
            self.state.alert = Some("Your session has expired. Please log in again.".to_string());
        }
        expired
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    /// Switch tabs. Admin tabs open the login form first when nobody is
    /// logged in. Returns a request when the new tab needs data.
    pub fn update_tab(&mut self, next: MenuItem) -> Option<NetworkRequest> {
        if next.requires_admin() && !self.state.admin.is_logged_in() {
            self.state.after_login = Some(next);
            self.open_login();
            return None;
        }
        if self.state.active_tab == next {
            return None;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        match next {
            MenuItem::Scores => Some(NetworkRequest::LoadRosters {
                team_ids: team_ids_for(self.score_matches()),
            }),
            _ => None,
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn dismiss_intro(&mut self) {
        self.state.show_intro = false;
    }

    fn clamp_selections(&mut self) {
        let results = self.state.league.results().len();
        self.state.results_selected = self.state.results_selected.min(results.saturating_sub(1));
        let teams = self.state.league.data.teams.len();
        self.state.squads_selected = self.state.squads_selected.min(teams.saturating_sub(1));
        let matches = self.score_matches().len();
        self.state.scores.selected_match =
            self.state.scores.selected_match.min(matches.saturating_sub(1));
        let rows = self.manage_len();
        self.state.manage.selected = self.state.manage.selected.min(rows.saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Public tab navigation
    // -----------------------------------------------------------------------

    pub fn scroll_down(&mut self) {
        match self.state.active_tab {
            MenuItem::Table => self.state.table_scroll = self.state.table_scroll.saturating_add(1),
            MenuItem::Fixtures => {
                let max = self.state.league.fixtures().len().saturating_sub(1) as u16;
                self.state.fixtures_scroll = (self.state.fixtures_scroll + 1).min(max);
            }
            MenuItem::Results => {
                let max = self.state.league.results().len().saturating_sub(1);
                self.state.results_selected = (self.state.results_selected + 1).min(max);
            }
            MenuItem::Squads => {
                let max = self.state.league.data.teams.len().saturating_sub(1);
                self.state.squads_selected = (self.state.squads_selected + 1).min(max);
            }
            MenuItem::Scores => {
                let max = self.score_matches().len().saturating_sub(1);
                self.state.scores.selected_match = (self.state.scores.selected_match + 1).min(max);
            }
            MenuItem::Manage => {
                let max = self.manage_len().saturating_sub(1);
                self.state.manage.selected = (self.state.manage.selected + 1).min(max);
            }
            MenuItem::Help => {}
        }
    }

    pub fn scroll_up(&mut self) {
        match self.state.active_tab {
            MenuItem::Table => self.state.table_scroll = self.state.table_scroll.saturating_sub(1),
            MenuItem::Fixtures => {
                self.state.fixtures_scroll = self.state.fixtures_scroll.saturating_sub(1)
            }
            MenuItem::Results => {
                self.state.results_selected = self.state.results_selected.saturating_sub(1)
            }
            MenuItem::Squads => {
                self.state.squads_selected = self.state.squads_selected.saturating_sub(1)
            }
            MenuItem::Scores => {
                self.state.scores.selected_match = self.state.scores.selected_match.saturating_sub(1)
            }
            MenuItem::Manage => {
                self.state.manage.selected = self.state.manage.selected.saturating_sub(1)
            }
            MenuItem::Help => {}
        }
    }

    // -----------------------------------------------------------------------
    // Score entry
    // -----------------------------------------------------------------------

    /// Matches offered for score entry: unplayed first, then results, each by date.
    pub fn score_matches(&self) -> Vec<&Match> {
        let mut matches: Vec<&Match> = self.state.league.data.matches.iter().collect();
        matches.sort_by_key(|m| (m.is_completed, m.match_date, m.match_time));
        matches
    }

    pub fn open_score_sheet(&mut self) {
        let Some(fixture) = self.score_matches().get(self.state.scores.selected_match).copied()
        else {
            return;
        };
        let composer = if fixture.is_completed {
            MatchResultComposer::from_recorded(fixture, &self.state.league.data.events)
        } else {
            MatchResultComposer::for_match(fixture)
        };
        self.state.scores.sheet = Some(ScoreSheet::new(composer));
    }

    pub fn close_score_sheet(&mut self) {
        self.state.scores.sheet = None;
    }

    /// Apply one edit to the open sheet; a rejected edit becomes an alert.
    pub fn edit_sheet(&mut self, edit: impl FnOnce(&mut ScoreSheet, &Rosters) -> Result<(), LeagueError>) {
        let scores = &mut self.state.scores;
        let Some(sheet) = scores.sheet.as_mut() else {
            return;
        };
        if let Err(e) = edit(sheet, &scores.rosters) {
            self.state.alert = Some(e.to_string());
        }
    }

    pub fn submit_score_sheet(&mut self) -> Option<NetworkRequest> {
        let sheet = self.state.scores.sheet.as_ref()?;
        match sheet.composer.submit() {
            Ok(result) => self.mutate(Mutation::CommitResult(result)),
            Err(e) => {
                self.state.alert = Some(e.to_string());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Registration / management
    // -----------------------------------------------------------------------

    pub fn manage_len(&self) -> usize {
        let data = &self.state.league.data;
        match self.state.manage.section {
            ManageSection::Teams => data.teams.len(),
            ManageSection::Players => data.players.len(),
            ManageSection::Matches => data.matches.len(),
        }
    }

    pub fn manage_next_section(&mut self) {
        self.state.manage.section = self.state.manage.section.next();
        self.state.manage.selected = 0;
    }

    pub fn manage_new(&mut self) {
        let form = match self.state.manage.section {
            ManageSection::Teams => FormState::team(),
            ManageSection::Players => FormState::player(None, &self.state.league.data.teams),
            ManageSection::Matches => FormState::fixture(),
        };
        self.state.form = Some(form);
    }

    pub fn manage_edit(&mut self) {
        if self.state.manage.section != ManageSection::Players {
            return;
        }
        let data = &self.state.league.data;
        if let Some(player) = data.players.get(self.state.manage.selected) {
            self.state.form = Some(FormState::player(Some(player), &data.teams));
        }
    }

    pub fn manage_toggle_active(&mut self) -> Option<NetworkRequest> {
        let data = &self.state.league.data;
        let index = self.state.manage.selected;
        let mutation = match self.state.manage.section {
            ManageSection::Teams => {
                let team = data.teams.get(index)?;
                Mutation::SetTeamActive { team_id: team.id.clone(), active: !team.is_active }
            }
            ManageSection::Players => {
                let player = data.players.get(index)?;
                Mutation::SetPlayerActive { player_id: player.id.clone(), active: !player.is_active }
            }
            ManageSection::Matches => return None,
        };
        self.mutate(mutation)
    }

    pub fn manage_delete(&mut self) {
        let league = &self.state.league;
        let index = self.state.manage.selected;
        let pending = match self.state.manage.section {
            ManageSection::Teams => league.data.teams.get(index).map(|t| PendingConfirm {
                prompt: format!("Delete team {}?", t.name),
                mutation: Mutation::DeleteTeam { team_id: t.id.clone() },
            }),
            ManageSection::Players => league.data.players.get(index).map(|p| PendingConfirm {
                prompt: format!("Delete player {}?", p.display_name()),
                mutation: Mutation::DeletePlayer { player_id: p.id.clone() },
            }),
            ManageSection::Matches => league.data.matches.get(index).map(|m| PendingConfirm {
                prompt: format!(
                    "Delete match {} v {} on {}? Its goal details go too.",
                    league.team_name(&m.home_team_id),
                    league.team_name(&m.away_team_id),
                    m.match_date
                ),
                mutation: Mutation::DeleteMatch { match_id: m.id.clone() },
            }),
        };
        self.state.confirm = pending;
    }

    pub fn confirm_yes(&mut self) -> Option<NetworkRequest> {
        let pending = self.state.confirm.take()?;
        self.mutate(pending.mutation)
    }

    pub fn confirm_no(&mut self) {
        self.state.confirm = None;
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    pub fn close_form(&mut self) {
        self.state.form = None;
        self.state.after_login = None;
    }

    pub fn submit_form(&mut self) -> Option<NetworkRequest> {
        let form = self.state.form.as_ref()?;
        let teams = &self.state.league.data.teams;
        let parsed = match &form.kind {
            FormKind::Login => {
                let (email, password) = forms::login_credentials(form);
                return Some(NetworkRequest::Login { email, password });
            }
            FormKind::Team => forms::parse_team(form).map(Mutation::CreateTeam),
            FormKind::Player { editing: None } => {
                forms::parse_player(form, teams).map(Mutation::CreatePlayer)
            }
            FormKind::Player { editing: Some(id) } => forms::parse_player(form, teams)
                .map(|player| Mutation::UpdatePlayer { player_id: id.clone(), player }),
            FormKind::Match => forms::parse_match(form, teams).map(Mutation::ScheduleMatch),
        };
        match parsed {
            Ok(mutation) => self.mutate(mutation),
            Err(e) => {
                self.state.alert = Some(e.to_string());
                None
            }
        }
    }

    /// Wrap a mutation with the session token, or ask for a login.
    fn mutate(&mut self, mutation: Mutation) -> Option<NetworkRequest> {
        let Some(token) = self.state.admin.token.clone() else {
            self.state.alert = Some(LeagueError::UnauthorizedMutation.to_string());
            self.open_login();
            return None;
        };
        Some(NetworkRequest::Mutate { token, mutation })
    }
}
