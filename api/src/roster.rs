use crate::store::EntityStore;
use crate::{Match, Player, TeamId};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// Active players per team, each list ordered by jersey number (unnumbered last).
pub type Rosters = HashMap<TeamId, Vec<Player>>;

/// Every team appearing on either side of `matches`.
pub fn team_ids_for<'a>(matches: impl IntoIterator<Item = &'a Match>) -> BTreeSet<TeamId> {
    matches
        .into_iter()
        .flat_map(|m| [m.home_team_id.clone(), m.away_team_id.clone()])
        .collect()
}

/// Group players by team, keeping jersey order within each team.
pub fn partition_by_team(players: Vec<Player>) -> Rosters {
    let mut rosters: Rosters = HashMap::new();
    for player in players {
        rosters.entry(player.team_id.clone()).or_default().push(player);
    }
    for squad in rosters.values_mut() {
        squad.sort_by_key(|p| (p.jersey_number.is_none(), p.jersey_number));
    }
    rosters
}

/// Fetch the active squads of `team_ids`.
///
/// An empty id set issues no query. A failed fetch is logged and yields an
/// empty mapping; score inputs still work, there is just no one to pick.
pub async fn load_rosters<S: EntityStore>(store: &S, team_ids: &BTreeSet<TeamId>) -> Rosters {
    if team_ids.is_empty() {
        return Rosters::new();
    }
    let ids: Vec<TeamId> = team_ids.iter().cloned().collect();
    match store.active_players(&ids).await {
        Ok(players) => {
            debug!("loaded {} active players for {} teams", players.len(), ids.len());
            partition_by_team(players)
        }
        Err(e) => {
            warn!("could not load rosters for {} teams: {e}", ids.len());
            Rosters::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StoreOp};
    use crate::{NewPlayer, NewTeam};
    use chrono::NaiveDate;

    fn fixture(id: &str, home: &str, away: &str) -> Match {
        Match {
            id: id.into(),
            match_day: 1,
            home_team_id: home.into(),
            away_team_id: away.into(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            match_time: None,
            venue: None,
            home_score: None,
            away_score: None,
            is_completed: false,
            created_at: None,
        }
    }

    #[test]
    fn team_ids_are_deduplicated_across_matches() {
        let matches = [fixture("m1", "tA", "tB"), fixture("m2", "tB", "tC")];
        let ids: Vec<TeamId> = team_ids_for(&matches).into_iter().collect();
        assert_eq!(ids, vec!["tA", "tB", "tC"]);
    }

    async fn store_with_squads() -> (MemoryStore, TeamId, TeamId) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["A", "B"] {
            let team = store
                .create_team(&NewTeam { name: name.into(), is_active: true, ..Default::default() })
                .await
                .unwrap();
            ids.push(team.id);
        }
        for (team, name, number) in [(0, "Keeper", Some(1)), (0, "Sub", None), (1, "Nine", Some(9)), (0, "Five", Some(5))] {
            store
                .create_player(&NewPlayer {
                    name: name.into(),
                    team_id: ids[team].clone(),
                    jersey_number: number,
                    is_active: true,
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let b = ids.pop().unwrap();
        let a = ids.pop().unwrap();
        (store, a, b)
    }

    #[tokio::test]
    async fn rosters_are_partitioned_and_ordered() {
        let (store, a, b) = store_with_squads().await;
        let rosters = load_rosters(&store, &BTreeSet::from([a.clone(), b.clone()])).await;
        let names = |team: &str| -> Vec<String> {
            rosters[team].iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names(&a), vec!["Keeper", "Five", "Sub"]);
        assert_eq!(names(&b), vec!["Nine"]);
    }

    #[tokio::test]
    async fn empty_id_set_issues_no_query() {
        let store = MemoryStore::new();
        store.fail_next(StoreOp::ActivePlayers, "should not be called");
        assert!(load_rosters(&store, &BTreeSet::new()).await.is_empty());
        // The fault is still armed, so nothing consumed it.
        assert!(store.active_players(&[]).await.is_err());
    }

    #[tokio::test]
    async fn fetch_failure_soft_fails_to_empty() {
        let (store, a, b) = store_with_squads().await;
        store.fail_next(StoreOp::ActivePlayers, "offline");
        let rosters = load_rosters(&store, &BTreeSet::from([a, b])).await;
        assert!(rosters.is_empty());
    }
}
