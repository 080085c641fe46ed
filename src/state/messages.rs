use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use league_api::committer::CommitReport;
use league_api::composer::ValidatedResult;
use league_api::roster::Rosters;
use league_api::session::AdminSession;
use league_api::{
    Match, MatchEvent, MatchId, NewMatch, NewPlayer, NewTeam, Player, PlayerId, Standing, Team,
    TeamId,
};
use std::collections::BTreeSet;

/// Everything the public views show, fetched together after every write.
#[derive(Debug, Clone, Default)]
pub struct LeagueData {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub events: Vec<MatchEvent>,
    pub standings: Vec<Standing>,
}

/// An admin write. Each one is checked against the session before it runs.
#[derive(Debug, Clone)]
pub enum Mutation {
    CreateTeam(NewTeam),
    SetTeamActive { team_id: TeamId, active: bool },
    DeleteTeam { team_id: TeamId },
    CreatePlayer(NewPlayer),
    UpdatePlayer { player_id: PlayerId, player: NewPlayer },
    SetPlayerActive { player_id: PlayerId, active: bool },
    DeletePlayer { player_id: PlayerId },
    ScheduleMatch(NewMatch),
    DeleteMatch { match_id: MatchId },
    CommitResult(ValidatedResult),
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadLeague,
    LoadRosters { team_ids: BTreeSet<TeamId> },
    Login { email: String, password: String },
    Mutate { token: String, mutation: Mutation },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    LeagueLoaded { league: LeagueData },
    RostersLoaded { rosters: Rosters },
    LoggedIn { session: AdminSession, token: String },
    MutationApplied { message: String, league: LeagueData },
    ResultCommitted { report: CommitReport, league: LeagueData },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    SessionCheck,
}
