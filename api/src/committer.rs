//! Writes a validated result to the store as one resumable operation.
//!
//! The store has no multi-statement transaction, so the three writes run as
//! ordered steps. Each step is idempotent on its own: re-recording a score
//! overwrites it and clearing events before inserting means a repeated run
//! never duplicates rows. A failed step can therefore be retried in place.

use crate::composer::{GoalEntry, ValidatedResult};
use crate::store::EntityStore;
use crate::{EventType, LeagueError, MatchId, NewMatchEvent, Side};
use log::{debug, info, warn};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitStep {
    RecordScore,
    ClearEvents,
    InsertEvents,
}

impl CommitStep {
    pub fn label(&self) -> &'static str {
        match self {
            CommitStep::RecordScore => "recording the score",
            CommitStep::ClearEvents => "clearing previous goal details",
            CommitStep::InsertEvents => "saving goal details",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            CommitStep::RecordScore => Some(CommitStep::ClearEvents),
            CommitStep::ClearEvents => Some(CommitStep::InsertEvents),
            CommitStep::InsertEvents => None,
        }
    }

    /// Where a retry picks up after this step failed. A failed batch insert
    /// may have landed partially, so its retry clears first.
    pub fn resume_point(self) -> Self {
        match self {
            CommitStep::InsertEvents => CommitStep::ClearEvents,
            step => step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 1, backoff: Duration::ZERO }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub match_id: MatchId,
    pub home_score: u32,
    pub away_score: u32,
    pub events_inserted: usize,
    pub attempts: u32,
}

fn push_rows(rows: &mut Vec<NewMatchEvent>, result: &ValidatedResult, side: Side) {
    let team_id = result.team_id(side);
    for GoalEntry { scorer, minute, assist } in result.entries(side) {
        let Some(scorer) = scorer else {
            continue;
        };
        let minute = (*minute > 0).then_some(*minute);
        rows.push(NewMatchEvent {
            match_id: result.match_id.clone(),
            player_id: scorer.clone(),
            team_id: team_id.to_owned(),
            event_type: EventType::Goal,
            minute,
        });
        if let Some(assist) = assist {
            rows.push(NewMatchEvent {
                match_id: result.match_id.clone(),
                player_id: assist.clone(),
                team_id: team_id.to_owned(),
                event_type: EventType::Assist,
                minute,
            });
        }
    }
}

/// Flat event rows for a result, home side first.
///
/// Entries without a scorer produce nothing and a minute of 0 is stored as
/// no minute.
pub fn build_event_rows(result: &ValidatedResult) -> Vec<NewMatchEvent> {
    let mut rows = Vec::new();
    push_rows(&mut rows, result, Side::Home);
    push_rows(&mut rows, result, Side::Away);
    rows
}

async fn run_step<S: EntityStore>(
    store: &S,
    step: CommitStep,
    result: &ValidatedResult,
    rows: &[NewMatchEvent],
) -> Result<(), crate::ApiError> {
    match step {
        CommitStep::RecordScore => {
            store
                .record_score(&result.match_id, result.home_score, result.away_score)
                .await
        }
        CommitStep::ClearEvents => store.clear_match_events(&result.match_id).await,
        CommitStep::InsertEvents => {
            if rows.is_empty() {
                return Ok(());
            }
            store.insert_match_events(rows).await
        }
    }
}

/// Record the score, clear old goal details and insert the new ones.
///
/// On failure the sequence resumes from the failed step until the policy's
/// attempts are spent; the last failure is reported with its step.
pub async fn commit_result<S: EntityStore>(
    store: &S,
    result: &ValidatedResult,
    policy: &RetryPolicy,
) -> Result<CommitReport, LeagueError> {
    let rows = build_event_rows(result);
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    let mut step = Some(CommitStep::RecordScore);

    while let Some(current) = step {
        debug!(
            "match {}: {} (attempt {attempt}/{max_attempts})",
            result.match_id,
            current.label()
        );
        match run_step(store, current, result, &rows).await {
            Ok(()) => step = current.next(),
            Err(source) if attempt < max_attempts => {
                warn!(
                    "match {}: {} failed: {source}; retrying",
                    result.match_id,
                    current.label()
                );
                attempt += 1;
                step = Some(current.resume_point());
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
            Err(source) => {
                warn!(
                    "match {}: giving up after {attempt} attempt(s) while {}: {source}",
                    result.match_id,
                    current.label()
                );
                return Err(LeagueError::StoreOperationFailed { step: current, source });
            }
        }
    }

    info!(
        "match {}: recorded {}-{} with {} event row(s)",
        result.match_id,
        result.home_score,
        result.away_score,
        rows.len()
    );
    Ok(CommitReport {
        match_id: result.match_id.clone(),
        home_score: result.home_score,
        away_score: result.away_score,
        events_inserted: rows.len(),
        attempts: attempt,
    })
}
