mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, StoreSource};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{AdminGuard, LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use anyhow::Context;
use chrono::Utc;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use league_api::client::LeagueApi;
use league_api::committer::RetryPolicy;
use league_api::memory::MemoryStore;
use league_api::session::{CredentialVerifier, NoCredentials, SessionGuard};
use league_api::store::EntityStore;
use log::{error, info, warn};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load();
    // Open the store before touching the terminal so a bad seed file is
    // reported on a normal screen.
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let network_task = spawn_network_worker(&settings, network_req_rx, network_resp_tx)?;

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    info!("league data from {}", settings.store.describe());
    if settings.admin.is_none() {
        warn!("LEAGUE_ADMIN_EMAIL / LEAGUE_ADMIN_PASSWORD not set; admin login is disabled");
    }

    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Session expiry check thread (every 60s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger league load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

fn spawn_network_worker(
    settings: &AppSettings,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
) -> anyhow::Result<JoinHandle<()>> {
    let verifier: Box<dyn CredentialVerifier + Send + Sync> = match settings.admin.clone() {
        Some(credentials) => Box::new(credentials),
        None => Box::new(NoCredentials),
    };
    let guard: AdminGuard = SessionGuard::new(verifier);
    let retry = RetryPolicy::new(settings.commit_retries, settings.commit_backoff());

    let handle = match &settings.store {
        StoreSource::Hosted { url, api_key } => {
            spawn_worker(LeagueApi::new(url, api_key), guard, retry, requests, responses)
        }
        StoreSource::SeedFile(path) => {
            let store = MemoryStore::from_seed_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            spawn_worker(store, guard, retry, requests, responses)
        }
        StoreSource::Demo => {
            let store = MemoryStore::demo().context("loading the built-in demo season")?;
            spawn_worker(store, guard, retry, requests, responses)
        }
    };
    Ok(handle)
}

fn spawn_worker<S>(
    store: S,
    guard: AdminGuard,
    retry: RetryPolicy,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
) -> JoinHandle<()>
where
    S: EntityStore + Send + Sync + 'static,
{
    let worker = NetworkWorker::new(store, guard, retry, requests, responses);
    tokio::spawn(worker.run())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("league-admin {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "league-admin - alumni football league console

Usage:
  league-admin
  league-admin --help
  league-admin --version

Environment:
  LEAGUE_API_URL          Hosted league database base URL
  LEAGUE_API_KEY          API key sent with every hosted request
  LEAGUE_SEED_JSON        Path to a local league snapshot (used when no URL is set)
  LEAGUE_ADMIN_EMAIL      Admin login email
  LEAGUE_ADMIN_PASSWORD   Admin login password
  LEAGUE_ADMIN_NAME       Name shown once logged in (default League Admin)
  LEAGUE_COMMIT_RETRIES   Attempts per result save (default 3)
  LEAGUE_LOG              Log level: error, warn, info, debug, trace

With neither LEAGUE_API_URL nor LEAGUE_SEED_JSON set, a built-in demo season is used."
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadLeague).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::SessionCheck => app.lock().await.check_session(Utc::now()),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::LeagueLoaded { league } => {
            app.lock().await.on_league_loaded(league);
        }
        NetworkResponse::RostersLoaded { rosters } => {
            app.lock().await.on_rosters_loaded(rosters);
        }
        NetworkResponse::LoggedIn { session, token } => {
            let follow_up = app.lock().await.on_logged_in(session, token);
            if let Some(request) = follow_up {
                let _ = network_requests.send(request).await;
            }
        }
        NetworkResponse::MutationApplied { message, league } => {
            app.lock().await.on_mutation_applied(message, league);
        }
        NetworkResponse::ResultCommitted { report, league } => {
            app.lock().await.on_result_committed(report, league);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
