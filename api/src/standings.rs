//! League table and scorer tallies computed from the match history.
//!
//! The hosted store serves the table from its own view; these are used where
//! no such view exists.

use crate::{EventType, Leader, Match, MatchEvent, Player, Standing, Team};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

fn tally(row: &mut Standing, scored: u32, conceded: u32) {
    row.played += 1;
    row.goals_for += scored;
    row.goals_against += conceded;
    match scored.cmp(&conceded) {
        Ordering::Greater => {
            row.won += 1;
            row.points += POINTS_FOR_WIN;
        }
        Ordering::Equal => {
            row.drawn += 1;
            row.points += POINTS_FOR_DRAW;
        }
        Ordering::Less => row.lost += 1,
    }
}

/// Points, then goal difference, then goals scored, then name.
pub fn table_order(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// One row per active team or team with a completed match, best first,
/// positions numbered from 1.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<Standing> {
    let mut rows: HashMap<&str, Standing> = HashMap::new();
    for team in teams {
        rows.insert(
            &team.id,
            Standing {
                id: team.id.clone(),
                team_name: team.name.clone(),
                ..Default::default()
            },
        );
    }

    let mut seen: Vec<&str> = teams.iter().filter(|t| t.is_active).map(|t| t.id.as_str()).collect();
    for fixture in matches {
        let Some((home, away)) = fixture.result() else {
            continue;
        };
        if let Some(row) = rows.get_mut(fixture.home_team_id.as_str()) {
            tally(row, home, away);
            seen.push(&fixture.home_team_id);
        }
        if let Some(row) = rows.get_mut(fixture.away_team_id.as_str()) {
            tally(row, away, home);
            seen.push(&fixture.away_team_id);
        }
    }
    seen.sort_unstable();
    seen.dedup();

    let mut table: Vec<Standing> = seen
        .into_iter()
        .filter_map(|id| rows.remove(id))
        .map(|mut row| {
            row.goal_difference = row.goals_for as i32 - row.goals_against as i32;
            row
        })
        .collect();
    table.sort_by(table_order);
    for (i, row) in table.iter_mut().enumerate() {
        row.position = Some(i as u32 + 1);
    }
    table
}

/// Goals and assists per player across all recorded events.
pub fn compute_leaders(events: &[MatchEvent], players: &[Player], teams: &[Team]) -> Vec<Leader> {
    let team_names: HashMap<&str, &str> =
        teams.iter().map(|t| (t.id.as_str(), t.name.as_str())).collect();
    let players_by_id: HashMap<&str, &Player> = players.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut leaders: HashMap<&str, Leader> = HashMap::new();
    for event in events {
        let leader = leaders.entry(&event.player_id).or_insert_with(|| {
            let player = players_by_id.get(event.player_id.as_str());
            Leader {
                player_id: event.player_id.clone(),
                player_name: player.map_or_else(|| "Unknown player".to_owned(), |p| p.name.clone()),
                team_name: team_names
                    .get(event.team_id.as_str())
                    .copied()
                    .unwrap_or_default()
                    .to_owned(),
                goals: 0,
                assists: 0,
            }
        });
        match event.event_type {
            EventType::Goal => leader.goals += 1,
            EventType::Assist => leader.assists += 1,
        }
    }
    leaders.into_values().collect()
}

/// Players with at least one goal, most goals first.
pub fn top_scorers(leaders: &[Leader], limit: usize) -> Vec<Leader> {
    let mut scorers: Vec<Leader> = leaders.iter().filter(|l| l.goals > 0).cloned().collect();
    scorers.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then(b.assists.cmp(&a.assists))
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    scorers.truncate(limit);
    scorers
}

pub fn top_assists(leaders: &[Leader], limit: usize) -> Vec<Leader> {
    let mut providers: Vec<Leader> = leaders.iter().filter(|l| l.assists > 0).cloned().collect();
    providers.sort_by(|a, b| {
        b.assists
            .cmp(&a.assists)
            .then(b.goals.cmp(&a.goals))
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    providers.truncate(limit);
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn team(id: &str, name: &str, active: bool) -> Team {
        Team { id: id.into(), name: name.into(), is_active: active, ..Default::default() }
    }

    fn played(id: &str, home: &str, away: &str, score: Option<(u32, u32)>) -> Match {
        Match {
            id: id.into(),
            match_day: 1,
            home_team_id: home.into(),
            away_team_id: away.into(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            match_time: None,
            venue: None,
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
            is_completed: score.is_some(),
            created_at: None,
        }
    }

    fn event(kind: EventType, player: &str, team: &str) -> MatchEvent {
        MatchEvent {
            id: String::new(),
            match_id: "m1".into(),
            player_id: player.into(),
            team_id: team.into(),
            event_type: kind,
            minute: None,
            created_at: None,
        }
    }

    #[test]
    fn win_draw_loss_points() {
        let teams = [team("tA", "A", true), team("tB", "B", true), team("tC", "C", true)];
        let matches = [
            played("m1", "tA", "tB", Some((2, 1))),
            played("m2", "tB", "tC", Some((0, 0))),
            played("m3", "tC", "tA", None),
        ];
        let table = compute_standings(&teams, &matches);
        let a = table.iter().find(|r| r.id == "tA").unwrap();
        assert_eq!((a.played, a.won, a.points, a.goal_difference), (1, 1, 3, 1));
        let b = table.iter().find(|r| r.id == "tB").unwrap();
        assert_eq!((b.played, b.drawn, b.lost, b.points, b.goal_difference), (2, 1, 1, 1, -1));
        assert_eq!(table[0].position, Some(1));
        assert_eq!(table[0].team_name, "A");
    }

    #[test]
    fn ties_break_on_difference_then_goals_then_name() {
        let teams = [
            team("t1", "Zeta", true),
            team("t2", "Alpha", true),
            team("t3", "Mid", true),
            team("t4", "Low", true),
        ];
        let matches = [
            played("m1", "t1", "t4", Some((3, 0))),
            played("m2", "t2", "t4", Some((3, 0))),
            played("m3", "t3", "t4", Some((1, 0))),
        ];
        let names: Vec<String> = compute_standings(&teams, &matches)
            .into_iter()
            .map(|r| r.team_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta", "Mid", "Low"]);
    }

    #[test]
    fn inactive_team_appears_only_with_results() {
        let teams = [team("tA", "A", true), team("tX", "Retired", false)];
        assert_eq!(compute_standings(&teams, &[]).len(), 1);
        let matches = [played("m1", "tA", "tX", Some((1, 1)))];
        assert_eq!(compute_standings(&teams, &matches).len(), 2);
    }

    #[test]
    fn leaders_count_goals_and_assists() {
        let teams = [team("tA", "A", true)];
        let players = [Player { id: "P1".into(), name: "Ana".into(), team_id: "tA".into(), ..Default::default() }];
        let events = [
            event(EventType::Goal, "P1", "tA"),
            event(EventType::Goal, "P1", "tA"),
            event(EventType::Assist, "P2", "tA"),
        ];
        let leaders = compute_leaders(&events, &players, &teams);
        let scorers = top_scorers(&leaders, 5);
        assert_eq!(scorers.len(), 1);
        assert_eq!((scorers[0].player_name.as_str(), scorers[0].goals, scorers[0].team_name.as_str()), ("Ana", 2, "A"));
        let assists = top_assists(&leaders, 5);
        assert_eq!((assists[0].player_name.as_str(), assists[0].assists), ("Unknown player", 1));
    }
}
