//! Score-entry state for one match being edited.
//!
//! Each side holds an ordered list of goal entries and the side's score is
//! always the length of that list, so the two can never disagree.

use crate::{
    EventType, LeagueError, MAX_MINUTE, Match, MatchEvent, MatchId, PlayerId, Side, TeamId,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalEntry {
    pub scorer: Option<PlayerId>,
    pub minute: u8,
    pub assist: Option<PlayerId>,
}

impl GoalEntry {
    pub fn new(scorer: impl Into<PlayerId>, minute: u8, assist: Option<&str>) -> Self {
        Self {
            scorer: Some(scorer.into()),
            minute,
            assist: assist.map(str::to_owned),
        }
    }
}

/// One editable field of a goal entry. `None` clears a player reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryField {
    Scorer(Option<PlayerId>),
    Minute(u8),
    Assist(Option<PlayerId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    SetScore { side: Side, score: u32 },
    SetField { side: Side, index: usize, field: EntryField },
    RemoveEntry { side: Side, index: usize },
}

/// A result that passed every pre-commit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResult {
    pub match_id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub home: Vec<GoalEntry>,
    pub away: Vec<GoalEntry>,
}

impl ValidatedResult {
    pub fn team_id(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team_id,
            Side::Away => &self.away_team_id,
        }
    }

    pub fn entries(&self, side: Side) -> &[GoalEntry] {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResultComposer {
    match_id: MatchId,
    home_team_id: TeamId,
    away_team_id: TeamId,
    home: Vec<GoalEntry>,
    away: Vec<GoalEntry>,
}

impl MatchResultComposer {
    pub fn new(
        match_id: impl Into<MatchId>,
        home_team_id: impl Into<TeamId>,
        away_team_id: impl Into<TeamId>,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            home_team_id: home_team_id.into(),
            away_team_id: away_team_id.into(),
            home: Vec::new(),
            away: Vec::new(),
        }
    }

    /// Empty composer for a fixture.
    pub fn for_match(fixture: &Match) -> Self {
        Self::new(&fixture.id, &fixture.home_team_id, &fixture.away_team_id)
    }

    /// Rebuild the entry lists from rows already stored for `fixture`.
    ///
    /// Goals are taken in stored order; each one is paired with the first
    /// unused assist row of the same team and minute. A side with fewer goal
    /// rows than its recorded score gets blank entries up to that score, so
    /// the result cannot be resubmitted until the missing scorers are filled.
    pub fn from_recorded(fixture: &Match, events: &[MatchEvent]) -> Self {
        let mut composer = Self::for_match(fixture);
        let own: Vec<&MatchEvent> = events.iter().filter(|e| e.match_id == fixture.id).collect();
        let mut used_assists: HashSet<usize> = HashSet::new();

        for goal in own.iter().filter(|e| e.event_type == EventType::Goal) {
            let side = if goal.team_id == fixture.home_team_id {
                Side::Home
            } else if goal.team_id == fixture.away_team_id {
                Side::Away
            } else {
                continue;
            };
            let assist = own.iter().enumerate().find(|(i, e)| {
                e.event_type == EventType::Assist
                    && e.team_id == goal.team_id
                    && e.minute == goal.minute
                    && !used_assists.contains(i)
            });
            let assist = assist.map(|(i, e)| {
                used_assists.insert(i);
                e.player_id.clone()
            });
            composer.side_mut(side).push(GoalEntry {
                scorer: Some(goal.player_id.clone()),
                minute: goal.minute.unwrap_or(0),
                assist,
            });
        }

        if let Some((home, away)) = fixture.result() {
            for (side, recorded) in [(Side::Home, home), (Side::Away, away)] {
                if composer.score(side) < recorded {
                    composer.set_score(side, recorded);
                }
            }
        }
        composer
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn team_id(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team_id,
            Side::Away => &self.away_team_id,
        }
    }

    pub fn entries(&self, side: Side) -> &[GoalEntry] {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        self.entries(side).len() as u32
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<GoalEntry> {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    pub fn apply(&mut self, action: ComposerAction) -> Result<(), LeagueError> {
        match action {
            ComposerAction::SetScore { side, score } => {
                self.set_score(side, score);
                Ok(())
            }
            ComposerAction::SetField { side, index, field } => {
                self.set_entry_field(side, index, field)
            }
            ComposerAction::RemoveEntry { side, index } => self.remove_entry(side, index),
        }
    }

    /// Grow with blank entries or truncate from the end.
    pub fn set_score(&mut self, side: Side, score: u32) {
        self.side_mut(side).resize(score as usize, GoalEntry::default());
    }

    pub fn set_entry_field(
        &mut self,
        side: Side,
        index: usize,
        field: EntryField,
    ) -> Result<(), LeagueError> {
        let entry = self
            .side_mut(side)
            .get_mut(index)
            .ok_or(LeagueError::NoSuchEntry { side, index })?;
        match field {
            EntryField::Scorer(scorer) => entry.scorer = scorer.filter(|s| !s.is_empty()),
            EntryField::Minute(minute) => entry.minute = minute,
            EntryField::Assist(assist) => entry.assist = assist.filter(|s| !s.is_empty()),
        }
        Ok(())
    }

    /// Drops one entry; the side's score goes down with it.
    pub fn remove_entry(&mut self, side: Side, index: usize) -> Result<(), LeagueError> {
        let entries = self.side_mut(side);
        if index >= entries.len() {
            return Err(LeagueError::NoSuchEntry { side, index });
        }
        entries.remove(index);
        Ok(())
    }

    /// Check the entries against a declared score before anything is written.
    pub fn validate_for_submit(
        &self,
        declared_home: u32,
        declared_away: u32,
    ) -> Result<ValidatedResult, LeagueError> {
        if self.home.len() != declared_home as usize || self.away.len() != declared_away as usize {
            return Err(LeagueError::ScoreMismatch {
                home_declared: declared_home,
                home_entries: self.home.len(),
                away_declared: declared_away,
                away_entries: self.away.len(),
            });
        }
        for side in [Side::Home, Side::Away] {
            for (index, entry) in self.entries(side).iter().enumerate() {
                if entry.scorer.is_none() {
                    return Err(LeagueError::IncompleteGoalEntry { side, index });
                }
                if entry.minute > MAX_MINUTE {
                    return Err(LeagueError::MinuteOutOfRange { side, index, minute: entry.minute });
                }
            }
        }
        Ok(ValidatedResult {
            match_id: self.match_id.clone(),
            home_team_id: self.home_team_id.clone(),
            away_team_id: self.away_team_id.clone(),
            home_score: declared_home,
            away_score: declared_away,
            home: self.home.clone(),
            away: self.away.clone(),
        })
    }

    pub fn submit(&self) -> Result<ValidatedResult, LeagueError> {
        self.validate_for_submit(self.score(Side::Home), self.score(Side::Away))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn composer() -> MatchResultComposer {
        MatchResultComposer::new("M1", "tA", "tB")
    }

    fn event(kind: EventType, player: &str, team: &str, minute: Option<u8>) -> MatchEvent {
        MatchEvent {
            id: String::new(),
            match_id: "M1".into(),
            player_id: player.into(),
            team_id: team.into(),
            event_type: kind,
            minute,
            created_at: None,
        }
    }

    #[test]
    fn set_score_resizes_to_exactly_n() {
        let mut c = composer();
        for n in [0u32, 3, 7, 1, 0, 5, 2] {
            c.set_score(Side::Home, n);
            assert_eq!(c.entries(Side::Home).len(), n as usize);
            assert_eq!(c.score(Side::Home), n);
        }
        assert!(c.entries(Side::Away).is_empty());
    }

    #[test]
    fn growing_appends_blank_entries_and_shrinking_truncates() {
        let mut c = composer();
        c.set_score(Side::Home, 1);
        c.set_entry_field(Side::Home, 0, EntryField::Scorer(Some("P1".into()))).unwrap();
        c.set_score(Side::Home, 3);
        assert_eq!(c.entries(Side::Home)[0].scorer.as_deref(), Some("P1"));
        assert_eq!(c.entries(Side::Home)[2], GoalEntry::default());

        c.set_score(Side::Home, 0);
        c.set_score(Side::Home, 1);
        assert_eq!(c.entries(Side::Home)[0], GoalEntry::default());
    }

    #[test]
    fn validate_succeeds_iff_counts_match() {
        let mut c = composer();
        c.set_score(Side::Home, 2);
        c.set_score(Side::Away, 1);
        for (side, index, player) in [(Side::Home, 0, "P1"), (Side::Home, 1, "P2"), (Side::Away, 0, "P4")] {
            c.set_entry_field(side, index, EntryField::Scorer(Some(player.into()))).unwrap();
        }

        for home in 0..4u32 {
            for away in 0..3u32 {
                let outcome = c.validate_for_submit(home, away);
                if home == 2 && away == 1 {
                    assert!(outcome.is_ok());
                } else {
                    match outcome {
                        Err(LeagueError::ScoreMismatch {
                            home_declared,
                            home_entries,
                            away_declared,
                            away_entries,
                        }) => {
                            assert_eq!((home_declared, away_declared), (home, away));
                            assert_eq!((home_entries, away_entries), (2, 1));
                        }
                        other => panic!("expected mismatch for {home}-{away}, got {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn submit_rejects_entry_without_scorer() {
        let mut c = composer();
        c.set_score(Side::Away, 2);
        c.set_entry_field(Side::Away, 0, EntryField::Scorer(Some("P4".into()))).unwrap();
        assert!(matches!(
            c.submit(),
            Err(LeagueError::IncompleteGoalEntry { side: Side::Away, index: 1 })
        ));
    }

    #[test]
    fn submit_rejects_minute_past_extra_time() {
        let mut c = composer();
        c.apply(ComposerAction::SetScore { side: Side::Home, score: 1 }).unwrap();
        c.apply(ComposerAction::SetField {
            side: Side::Home,
            index: 0,
            field: EntryField::Scorer(Some("P1".into())),
        })
        .unwrap();
        c.apply(ComposerAction::SetField {
            side: Side::Home,
            index: 0,
            field: EntryField::Minute(121),
        })
        .unwrap();
        assert!(matches!(
            c.submit(),
            Err(LeagueError::MinuteOutOfRange { minute: 121, .. })
        ));
    }

    #[test]
    fn remove_entry_keeps_score_in_step() {
        let mut c = composer();
        c.set_score(Side::Home, 3);
        c.set_entry_field(Side::Home, 2, EntryField::Scorer(Some("P3".into()))).unwrap();
        c.apply(ComposerAction::RemoveEntry { side: Side::Home, index: 0 }).unwrap();
        assert_eq!(c.score(Side::Home), 2);
        assert_eq!(c.entries(Side::Home)[1].scorer.as_deref(), Some("P3"));
    }

    #[test]
    fn edits_to_missing_entries_are_rejected() {
        let mut c = composer();
        c.set_score(Side::Home, 1);
        assert!(matches!(
            c.remove_entry(Side::Home, 1),
            Err(LeagueError::NoSuchEntry { side: Side::Home, index: 1 })
        ));
        assert!(c.set_entry_field(Side::Away, 0, EntryField::Minute(3)).is_err());
    }

    #[test]
    fn empty_player_reference_clears_the_field() {
        let mut c = composer();
        c.set_score(Side::Home, 1);
        c.set_entry_field(Side::Home, 0, EntryField::Assist(Some("P2".into()))).unwrap();
        c.set_entry_field(Side::Home, 0, EntryField::Assist(Some(String::new()))).unwrap();
        assert_eq!(c.entries(Side::Home)[0].assist, None);
    }

    #[test]
    fn from_recorded_pairs_goals_with_assists() {
        let fixture = Match {
            id: "M1".into(),
            match_day: 1,
            home_team_id: "tA".into(),
            away_team_id: "tB".into(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            match_time: None,
            venue: None,
            home_score: Some(2),
            away_score: Some(1),
            is_completed: true,
            created_at: None,
        };
        let events = vec![
            event(EventType::Goal, "P1", "tA", Some(10)),
            event(EventType::Goal, "P2", "tA", Some(55)),
            event(EventType::Assist, "P3", "tA", Some(55)),
            event(EventType::Goal, "P4", "tB", Some(80)),
        ];
        let c = MatchResultComposer::from_recorded(&fixture, &events);
        assert_eq!(
            c.entries(Side::Home),
            &[GoalEntry::new("P1", 10, None), GoalEntry::new("P2", 55, Some("P3"))]
        );
        assert_eq!(c.entries(Side::Away), &[GoalEntry::new("P4", 80, None)]);
        assert!(c.submit().is_ok());
    }

    fn completed(home: u32, away: u32) -> Match {
        Match {
            id: "M1".into(),
            match_day: 1,
            home_team_id: "tA".into(),
            away_team_id: "tB".into(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            match_time: None,
            venue: None,
            home_score: Some(home),
            away_score: Some(away),
            is_completed: true,
            created_at: None,
        }
    }

    #[test]
    fn from_recorded_keeps_score_when_goal_rows_are_missing() {
        let c = MatchResultComposer::from_recorded(&completed(2, 1), &[]);
        assert_eq!(c.score(Side::Home), 2);
        assert_eq!(c.score(Side::Away), 1);
        assert!(matches!(
            c.submit(),
            Err(LeagueError::IncompleteGoalEntry { side: Side::Home, index: 0 })
        ));
    }

    #[test]
    fn from_recorded_pads_after_partial_events() {
        let events = vec![event(EventType::Goal, "P1", "tA", Some(12))];
        let mut c = MatchResultComposer::from_recorded(&completed(3, 0), &events);
        assert_eq!(c.entries(Side::Home)[0], GoalEntry::new("P1", 12, None));
        assert_eq!(&c.entries(Side::Home)[1..], &[GoalEntry::default(), GoalEntry::default()]);
        assert!(c.submit().is_err());

        for index in 1..3 {
            c.set_entry_field(Side::Home, index, EntryField::Scorer(Some("P2".into()))).unwrap();
        }
        let result = c.submit().unwrap();
        assert_eq!((result.home_score, result.away_score), (3, 0));
    }

    #[test]
    fn from_recorded_unplayed_match_starts_empty() {
        let mut fixture = completed(0, 0);
        fixture.is_completed = false;
        fixture.home_score = None;
        fixture.away_score = None;
        let c = MatchResultComposer::from_recorded(&fixture, &[]);
        assert_eq!(c.score(Side::Home) + c.score(Side::Away), 0);
    }
}
