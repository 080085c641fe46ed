use crate::state::messages::{LeagueData, Mutation, NetworkRequest, NetworkResponse};
use chrono::Utc;
use league_api::LeagueError;
use league_api::committer::{RetryPolicy, commit_result};
use league_api::roster::load_rosters;
use league_api::session::{CredentialVerifier, SessionGuard};
use league_api::store::EntityStore;
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

/// Credential check shared by the console and the gateway.
pub type AdminGuard = SessionGuard<Box<dyn CredentialVerifier + Send + Sync>>;

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker<S> {
    store: S,
    guard: AdminGuard,
    retry: RetryPolicy,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl<S: EntityStore> NetworkWorker<S> {
    pub fn new(
        store: S,
        guard: AdminGuard,
        retry: RetryPolicy,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            store,
            guard,
            retry,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadLeague => self.handle_load_league().await,
                NetworkRequest::LoadRosters { team_ids } => self.handle_load_rosters(team_ids).await,
                NetworkRequest::Login { email, password } => self.handle_login(&email, &password),
                NetworkRequest::Mutate { token, mutation } => {
                    self.handle_mutation(&token, mutation).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn fetch_league(&self) -> Result<LeagueData, LeagueError> {
        let (teams, players, matches, events, standings) = tokio::try_join!(
            self.store.list_teams(),
            self.store.list_players(),
            self.store.list_matches(),
            self.store.list_match_events(),
            self.store.standings(),
        )?;
        Ok(LeagueData { teams, players, matches, events, standings })
    }

    async fn handle_load_league(&self) -> Result<NetworkResponse, LeagueError> {
        debug!("loading league data");
        let league = self.fetch_league().await?;
        Ok(NetworkResponse::LeagueLoaded { league })
    }

    async fn handle_load_rosters(
        &self,
        team_ids: BTreeSet<String>,
    ) -> Result<NetworkResponse, LeagueError> {
        let rosters = load_rosters(&self.store, &team_ids).await;
        Ok(NetworkResponse::RostersLoaded { rosters })
    }

    fn handle_login(&self, email: &str, password: &str) -> Result<NetworkResponse, LeagueError> {
        let session = self.guard.login(email, password, Utc::now())?;
        let token = session.token();
        Ok(NetworkResponse::LoggedIn { session, token })
    }

    async fn handle_mutation(
        &self,
        token: &str,
        mutation: Mutation,
    ) -> Result<NetworkResponse, LeagueError> {
        self.guard.authorize(Some(token), Utc::now())?;

        let message = match mutation {
            Mutation::CommitResult(result) => {
                let report = commit_result(&self.store, &result, &self.retry).await?;
                let league = self.fetch_league().await?;
                return Ok(NetworkResponse::ResultCommitted { report, league });
            }
            Mutation::CreateTeam(team) => {
                team.validate()?;
                let row = self.store.create_team(&team).await?;
                format!("Registered team {}", row.name)
            }
            Mutation::SetTeamActive { team_id, active } => {
                self.store.set_team_active(&team_id, active).await?;
                activity_message("Team", active)
            }
            Mutation::DeleteTeam { team_id } => {
                self.store.delete_team(&team_id).await?;
                "Team deleted".to_string()
            }
            Mutation::CreatePlayer(player) => {
                player.validate()?;
                let row = self.store.create_player(&player).await?;
                format!("Registered {}", row.display_name())
            }
            Mutation::UpdatePlayer { player_id, player } => {
                player.validate()?;
                self.store.update_player(&player_id, &player).await?;
                format!("Updated {}", player.name)
            }
            Mutation::SetPlayerActive { player_id, active } => {
                self.store.set_player_active(&player_id, active).await?;
                activity_message("Player", active)
            }
            Mutation::DeletePlayer { player_id } => {
                self.store.delete_player(&player_id).await?;
                "Player deleted".to_string()
            }
            Mutation::ScheduleMatch(fixture) => {
                fixture.validate()?;
                let row = self.store.schedule_match(&fixture).await?;
                format!("Scheduled match day {} on {}", row.match_day, row.match_date)
            }
            Mutation::DeleteMatch { match_id } => {
                self.store.delete_match(&match_id).await?;
                "Match deleted".to_string()
            }
        };
        info!("{message}");

        let league = self.fetch_league().await?;
        Ok(NetworkResponse::MutationApplied { message, league })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn activity_message(kind: &str, active: bool) -> String {
    if active {
        format!("{kind} reactivated")
    } else {
        format!("{kind} deactivated")
    }
}
