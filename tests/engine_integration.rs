// End-to-end engine tests against an in-memory provider.
//
// Exercises the full pipelines (standings, ownership, transfers, chips)
// through the `DataProvider` trait, including the degrade paths for
// per-manager fetch failures.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use fpl_insight::engine::{chips, ownership, standings, transfers};
use fpl_insight::error::EngineError;
use fpl_insight::model::{
    Bootstrap, Chip, Fixture, Gameweek, GameweekId, LiveStat, ManagerEntry, ManagerHistory,
    ManagerId, Pick, PickSlot, Player, PlayerFixtureHistory, PlayerGwHistory, PlayerId,
    PlayerStatus, Position, Team,
};
use fpl_insight::provider::DataProvider;

// ---------------------------------------------------------------------------
// Mock provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockProvider {
    bootstrap: Option<Bootstrap>,
    entries: Vec<ManagerEntry>,
    picks: HashMap<ManagerId, Pick>,
    live: Vec<LiveStat>,
    fixtures: Vec<Fixture>,
    histories: HashMap<ManagerId, ManagerHistory>,
    player_histories: HashMap<PlayerId, PlayerFixtureHistory>,
    fail_picks_for: HashSet<ManagerId>,
}

#[async_trait]
impl DataProvider for MockProvider {
    async fn get_bootstrap(&self) -> anyhow::Result<Bootstrap> {
        self.bootstrap
            .clone()
            .ok_or_else(|| anyhow::anyhow!("bootstrap unavailable"))
    }

    async fn get_league_standings(&self, _league: u32) -> anyhow::Result<Vec<ManagerEntry>> {
        Ok(self.entries.clone())
    }

    async fn get_manager_picks(
        &self,
        manager: ManagerId,
        _gameweek: GameweekId,
    ) -> anyhow::Result<Pick> {
        if self.fail_picks_for.contains(&manager) {
            anyhow::bail!("picks endpoint down for manager {manager}");
        }
        self.picks
            .get(&manager)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no picks for manager {manager}"))
    }

    async fn get_live_stats(&self, _gameweek: GameweekId) -> anyhow::Result<Vec<LiveStat>> {
        Ok(self.live.clone())
    }

    async fn get_all_fixtures(&self) -> anyhow::Result<Vec<Fixture>> {
        Ok(self.fixtures.clone())
    }

    async fn get_manager_history(&self, manager: ManagerId) -> anyhow::Result<ManagerHistory> {
        Ok(self.histories.get(&manager).cloned().unwrap_or_default())
    }

    async fn get_player_fixture_history(
        &self,
        player: PlayerId,
    ) -> anyhow::Result<PlayerFixtureHistory> {
        Ok(self
            .player_histories
            .get(&player)
            .cloned()
            .unwrap_or(PlayerFixtureHistory {
                player,
                recent: Vec::new(),
            }))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn player(id: PlayerId, position: Position) -> Player {
    Player {
        id,
        name: format!("P{id}"),
        team: id % 20 + 1,
        position,
        cost: 50,
        total_points: 50,
        minutes: 900,
        goals: 0,
        assists: 0,
        form: 5.0,
        status: PlayerStatus::Available,
        selected_by_percent: 10.0,
    }
}

fn position_of(id: PlayerId) -> Position {
    match id {
        1 | 12 => Position::Goalkeeper,
        2..=6 | 21 => Position::Defender,
        7..=11 => Position::Midfielder,
        _ => Position::Forward,
    }
}

/// The standard 15-man player set (ids 1-15) plus the spare defender 21
/// and the transfer candidate 30.
fn league_bootstrap() -> Bootstrap {
    let mut players: Vec<Player> = (1..=15).map(|id| player(id, position_of(id))).collect();
    players.push(player(21, Position::Defender));
    players.push(player(30, Position::Forward));
    Bootstrap {
        players,
        teams: (1..=20)
            .map(|id| Team {
                id,
                name: format!("Team {id}"),
                short_name: format!("T{id}"),
                strength: 3,
            })
            .collect(),
        gameweeks: vec![Gameweek {
            id: 1,
            is_previous: false,
            is_current: true,
            is_next: false,
            finished: false,
            deadline: None,
        }],
    }
}

/// A full 15-slot pick: 11 starters, bench order 12 (GK) then 13-15.
/// Player 7 wears the armband.
fn pick_for(manager: ManagerId, players: [PlayerId; 15]) -> Pick {
    Pick {
        manager,
        gameweek: 1,
        slots: players
            .iter()
            .enumerate()
            .map(|(i, &p)| PickSlot {
                player: p,
                slot: i as u8 + 1,
                multiplier: if p == 7 { 2 } else { 1 },
                is_captain: p == 7,
                is_vice_captain: false,
            })
            .collect(),
        active_chip: None,
        transfer_cost: 0,
        bank: 0,
    }
}

fn live_stat(player: PlayerId, minutes: u32, points: i32) -> LiveStat {
    LiveStat {
        player,
        minutes,
        total_points: points,
        goals: 0,
        assists: 0,
        bonus: 0,
    }
}

/// Everyone played for 1 point, except player 13 (5 points) and player 21
/// (did not play at all).
fn league_live_stats() -> Vec<LiveStat> {
    let mut live: Vec<LiveStat> = (1..=15)
        .map(|id| live_stat(id, 90, if id == 13 { 5 } else { 1 }))
        .collect();
    live.push(live_stat(21, 0, 0));
    live
}

fn entry(id: ManagerId, name: &str, rank: u32, total: i32, event_total: i32) -> ManagerEntry {
    ManagerEntry {
        id,
        manager_name: name.into(),
        team_name: format!("{name} XI"),
        rank,
        total,
        event_total,
    }
}

fn history_of(points: &[i32]) -> PlayerFixtureHistory {
    PlayerFixtureHistory {
        player: 0,
        recent: points
            .iter()
            .enumerate()
            .map(|(i, &p)| PlayerGwHistory {
                gameweek: i as u32 + 1,
                minutes: 90,
                points: p,
                difficulty: 3,
            })
            .collect(),
    }
}

fn league_provider() -> MockProvider {
    let mut provider = MockProvider {
        bootstrap: Some(league_bootstrap()),
        entries: vec![
            entry(100, "Alice", 2, 110, 10),
            entry(200, "Bob", 1, 105, 10),
        ],
        live: league_live_stats(),
        ..Default::default()
    };
    provider.picks.insert(
        100,
        pick_for(100, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
    );
    // Bob starts the defender who ends up not playing.
    provider.picks.insert(
        200,
        pick_for(200, [1, 21, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
    );
    // Captain carries a known trimean; everyone else defaults to 0.
    provider.player_histories.insert(7, history_of(&[6]));
    provider
}

// ---------------------------------------------------------------------------
// Live standings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn live_standings_apply_autosubs_and_rerank() {
    let provider = league_provider();
    let rows = standings::build_live_standings(&provider, 42, 5)
        .await
        .expect("standings should build");

    assert_eq!(rows.len(), 2);

    // Alice: 11 starters x 1 point + captain doubled = 12 live points.
    // Live total replaces the reported event contribution: 110 - 10 + 12.
    let alice = &rows[0];
    assert_eq!(alice.manager, 100);
    assert_eq!(alice.live_points, 12);
    assert_eq!(alice.live_total, 112);
    assert_eq!(alice.live_rank, 1);
    // Reported 2nd, now 1st.
    assert_eq!(alice.rank_delta, 1);

    // Bob: defender 21 never played; bench GK is skipped, forward 13
    // comes on for 5 points. 10 x 1 + captain extra + 5 = 16.
    let bob = &rows[1];
    assert_eq!(bob.manager, 200);
    assert_eq!(bob.live_points, 16);
    assert_eq!(bob.live_total, 111);
    assert_eq!(bob.live_rank, 2);
    assert_eq!(bob.rank_delta, -1);

    // Captain summary resolves name and played flag from live stats.
    let captain = alice.captain.as_ref().expect("captain present");
    assert_eq!(captain.name, "P7");
    assert!(captain.played);
    assert_eq!(captain.multiplier, 2);

    // Only the captain has any history, so every starting eleven sums to
    // his trimean.
    assert!((alice.squad_trimean - 6.0).abs() < 1e-12);
    assert!((bob.squad_trimean - 6.0).abs() < 1e-12);
}

#[tokio::test]
async fn failed_pick_fetch_degrades_to_zero_not_abort() {
    let mut provider = league_provider();
    provider.fail_picks_for.insert(200);

    let rows = standings::build_live_standings(&provider, 42, 5)
        .await
        .expect("one failed manager must not abort the table");

    assert_eq!(rows.len(), 2);
    let bob = rows.iter().find(|r| r.manager == 200).unwrap();
    assert_eq!(bob.live_points, 0);
    // Reported total minus the reported event contribution.
    assert_eq!(bob.live_total, 95);
    assert!(bob.captain.is_none());
}

#[tokio::test]
async fn off_season_reports_no_current_gameweek() {
    let mut provider = league_provider();
    if let Some(bootstrap) = provider.bootstrap.as_mut() {
        bootstrap.gameweeks[0].is_current = false;
    }

    let err = standings::build_live_standings(&provider, 42, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoCurrentGameweek));
}

#[tokio::test]
async fn missing_bootstrap_is_a_provider_error() {
    let provider = MockProvider::default();
    let err = standings::build_live_standings(&provider, 42, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Provider { .. }));
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ownership_counts_owners_and_captains_across_the_league() {
    let provider = league_provider();
    let records = ownership::analyze_ownership(&provider, 42, 5)
        .await
        .expect("ownership should build");

    // Player 7 is owned and captained by both managers.
    let p7 = records.iter().find(|r| r.player == 7).unwrap();
    assert_eq!(p7.owners.len(), 2);
    assert_eq!(p7.captain_count, 2);
    assert!((p7.ownership_percent - 100.0).abs() < 1e-12);

    // Player 2 only appears in Alice's squad.
    let p2 = records.iter().find(|r| r.player == 2).unwrap();
    assert_eq!(p2.owners, vec![100]);
    assert!((p2.ownership_percent - 50.0).abs() < 1e-12);

    // Fully shared players sort ahead of half-owned ones.
    assert!((records[0].ownership_percent - 100.0).abs() < 1e-12);
}

#[tokio::test]
async fn ownership_keeps_failed_manager_in_the_denominator() {
    let mut provider = league_provider();
    provider.fail_picks_for.insert(200);

    let records = ownership::analyze_ownership(&provider, 42, 5)
        .await
        .expect("one failed manager must not abort the analysis");

    // Bob's picks failed, so he owns nothing, but he still counts as a
    // league member: Alice's players sit at 50%, not 100%.
    let p7 = records.iter().find(|r| r.player == 7).unwrap();
    assert_eq!(p7.owners, vec![100]);
    assert!((p7.ownership_percent - 50.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transfers_recommend_the_stronger_forward() {
    let mut provider = league_provider();
    // Candidate 30 has an excellent record; the owned forwards have none.
    provider.player_histories.insert(30, history_of(&[8]));

    let suggestions = transfers::recommend_transfers(&provider, 100, 5)
        .await
        .expect("transfers should build");

    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s.in_player, 30);
    // First qualifying forward in squad order.
    assert_eq!(s.out_player, 13);
    // Trimean delta 8.0, neutral fixtures on both sides.
    assert!((s.effectiveness - 8.0).abs() < 1e-12);
}

#[tokio::test]
async fn no_transfers_when_nothing_beats_the_squad() {
    let provider = league_provider();
    let suggestions = transfers::recommend_transfers(&provider, 100, 5)
        .await
        .expect("transfers should build");
    assert!(suggestions.is_empty());
}

// ---------------------------------------------------------------------------
// Chips
// ---------------------------------------------------------------------------

fn easy_gameweek_fixtures(gw: GameweekId) -> Vec<Fixture> {
    (0..2)
        .map(|i| Fixture {
            id: i + 1,
            gameweek: Some(gw),
            home_team: i * 2 + 1,
            away_team: i * 2 + 2,
            home_score: None,
            away_score: None,
            home_difficulty: 1,
            away_difficulty: 1,
            started: false,
            finished: false,
            minutes: 0,
        })
        .collect()
}

#[tokio::test]
async fn chips_skip_already_used_ones() {
    let mut provider = league_provider();
    provider.fixtures = easy_gameweek_fixtures(2);
    provider.histories.insert(
        100,
        ManagerHistory {
            past_gameweeks: vec![],
            used_chips: vec![Chip::BenchBoost],
        },
    );

    let suggestions = chips::recommend_chips(&provider, 100)
        .await
        .expect("chips should build");

    // The easy double gameweek triggers bench boost, triple captain, and
    // free hit; the burned bench boost must be filtered out.
    assert!(suggestions.iter().all(|s| s.chip != Chip::BenchBoost));
    let tc = suggestions
        .iter()
        .find(|s| s.chip == Chip::TripleCaptain)
        .expect("triple captain suggested");
    assert_eq!(tc.gameweek, 2);

    // Healthy squad: no wildcard.
    assert!(suggestions.iter().all(|s| s.chip != Chip::Wildcard));
}

#[tokio::test]
async fn chips_suggest_wildcard_for_a_broken_squad() {
    let mut provider = league_provider();
    if let Some(bootstrap) = provider.bootstrap.as_mut() {
        for player in bootstrap.players.iter_mut().filter(|p| p.id <= 3) {
            player.status = PlayerStatus::Injured;
        }
    }

    let suggestions = chips::recommend_chips(&provider, 100)
        .await
        .expect("chips should build");

    let wc = suggestions
        .iter()
        .find(|s| s.chip == Chip::Wildcard)
        .expect("wildcard suggested");
    assert_eq!(wc.gameweek, 2);
    assert_eq!(wc.score, 8);
}
