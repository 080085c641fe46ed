use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Asks the UI to re-check the admin session once a minute so an expired
/// login drops back to the public views without a keypress.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events, period: SESSION_CHECK_INTERVAL }
    }

    pub async fn run(self) {
        let mut session_interval = interval(self.period);
        // The first tick fires immediately; the session was just loaded.
        session_interval.tick().await;

        loop {
            session_interval.tick().await;
            if self.ui_events.send(UiEvent::SessionCheck).await.is_err() {
                break;
            }
        }
    }
}
