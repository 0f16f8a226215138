// Fantasy Premier League API client.
//
// Fetches the public JSON endpoints and converts the wire shapes into
// the crate's model types. Conversion validates at this boundary: rows
// the engine cannot consume are logged and skipped where the batch can
// survive, and only structural problems (a pick without 15 players)
// become hard errors.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{
    Bootstrap, Chip, Fixture, Gameweek, GameweekId, LiveStat, ManagerEntry, ManagerHistory,
    ManagerId, PastGameweek, Pick, PickSlot, Player, PlayerFixtureHistory, PlayerGwHistory,
    PlayerId, PlayerStatus, Position, Team, SQUAD_SIZE,
};
use crate::provider::DataProvider;

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

/// Difficulty ratings outside 1..=5 are provider glitches; clamp instead
/// of dropping the fixture.
fn clamp_difficulty(value: u8) -> u8 {
    value.clamp(1, 5)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct FplApi {
    http: reqwest::Client,
    base_url: String,
}

impl FplApi {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(FplApi {
            http,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        debug!(%url, "fetching");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireBootstrap {
    events: Vec<WireEvent>,
    teams: Vec<WireTeam>,
    elements: Vec<WireElement>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    id: GameweekId,
    is_previous: bool,
    is_current: bool,
    is_next: bool,
    finished: bool,
    deadline_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct WireTeam {
    id: u32,
    name: String,
    short_name: String,
    strength: u32,
}

#[derive(Debug, Deserialize)]
struct WireElement {
    id: PlayerId,
    web_name: String,
    team: u32,
    element_type: u8,
    now_cost: u32,
    total_points: i32,
    minutes: u32,
    goals_scored: u32,
    assists: u32,
    // The provider serializes these numerics as strings.
    form: String,
    selected_by_percent: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WireStandings {
    standings: WireStandingsInner,
}

#[derive(Debug, Deserialize)]
struct WireStandingsInner {
    results: Vec<WireStandingRow>,
}

#[derive(Debug, Deserialize)]
struct WireStandingRow {
    entry: ManagerId,
    player_name: String,
    entry_name: String,
    rank: u32,
    total: i32,
    event_total: i32,
}

#[derive(Debug, Deserialize)]
struct WirePicks {
    active_chip: Option<String>,
    entry_history: Option<WireEntryHistory>,
    picks: Vec<WirePickSlot>,
}

#[derive(Debug, Deserialize)]
struct WireEntryHistory {
    event_transfers_cost: u32,
    bank: u32,
}

#[derive(Debug, Deserialize)]
struct WirePickSlot {
    element: PlayerId,
    position: u8,
    multiplier: u8,
    is_captain: bool,
    is_vice_captain: bool,
}

#[derive(Debug, Deserialize)]
struct WireLive {
    elements: Vec<WireLiveElement>,
}

#[derive(Debug, Deserialize)]
struct WireLiveElement {
    id: PlayerId,
    stats: WireLiveStats,
}

#[derive(Debug, Deserialize)]
struct WireLiveStats {
    minutes: u32,
    total_points: i32,
    goals_scored: u32,
    assists: u32,
    bonus: u32,
}

#[derive(Debug, Deserialize)]
struct WireFixture {
    id: u32,
    event: Option<GameweekId>,
    team_h: u32,
    team_a: u32,
    team_h_score: Option<u32>,
    team_a_score: Option<u32>,
    team_h_difficulty: u8,
    team_a_difficulty: u8,
    started: Option<bool>,
    finished: bool,
    minutes: u32,
}

#[derive(Debug, Deserialize)]
struct WireHistory {
    current: Vec<WirePastEvent>,
    chips: Vec<WireChipPlay>,
}

#[derive(Debug, Deserialize)]
struct WirePastEvent {
    event: GameweekId,
    points: i32,
    total_points: i32,
    overall_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireChipPlay {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireElementSummary {
    history: Vec<WireElementGw>,
}

#[derive(Debug, Deserialize)]
struct WireElementGw {
    round: GameweekId,
    minutes: u32,
    total_points: i32,
    difficulty: u8,
}

// ---------------------------------------------------------------------------
// Wire -> model conversion
// ---------------------------------------------------------------------------

fn parse_stat_string(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn convert_bootstrap(wire: WireBootstrap) -> Bootstrap {
    let players = wire
        .elements
        .into_iter()
        .filter_map(|e| {
            let Some(position) = Position::from_element_type(e.element_type) else {
                warn!(player = e.id, element_type = e.element_type, "unknown element type, skipping player");
                return None;
            };
            Some(Player {
                id: e.id,
                name: e.web_name,
                team: e.team,
                position,
                cost: e.now_cost,
                total_points: e.total_points,
                minutes: e.minutes,
                goals: e.goals_scored,
                assists: e.assists,
                form: parse_stat_string(&e.form),
                selected_by_percent: parse_stat_string(&e.selected_by_percent),
                status: PlayerStatus::from_code(&e.status),
            })
        })
        .collect();

    let teams = wire
        .teams
        .into_iter()
        .map(|t| Team {
            id: t.id,
            name: t.name,
            short_name: t.short_name,
            strength: t.strength,
        })
        .collect();

    let gameweeks = wire
        .events
        .into_iter()
        .map(|e| Gameweek {
            id: e.id,
            is_previous: e.is_previous,
            is_current: e.is_current,
            is_next: e.is_next,
            finished: e.finished,
            deadline: e.deadline_time,
        })
        .collect();

    Bootstrap {
        players,
        teams,
        gameweeks,
    }
}

fn convert_picks(
    wire: WirePicks,
    manager: ManagerId,
    gameweek: GameweekId,
) -> anyhow::Result<Pick> {
    if wire.picks.len() != SQUAD_SIZE {
        anyhow::bail!(
            "manager {manager} gw {gameweek}: expected {SQUAD_SIZE} picks, got {}",
            wire.picks.len()
        );
    }

    let mut slots: Vec<PickSlot> = wire
        .picks
        .into_iter()
        .map(|p| {
            if !(1..=SQUAD_SIZE as u8).contains(&p.position) {
                anyhow::bail!(
                    "manager {manager} gw {gameweek}: pick slot {} out of range",
                    p.position
                );
            }
            Ok(PickSlot {
                player: p.element,
                slot: p.position,
                multiplier: p.multiplier,
                is_captain: p.is_captain,
                is_vice_captain: p.is_vice_captain,
            })
        })
        .collect::<anyhow::Result<_>>()?;
    slots.sort_by_key(|s| s.slot);

    let active_chip = wire.active_chip.as_deref().and_then(|name| {
        let chip = Chip::from_api_name(name);
        if chip.is_none() {
            warn!(manager, name, "unknown active chip name, ignoring");
        }
        chip
    });

    let (transfer_cost, bank) = wire
        .entry_history
        .map(|h| (h.event_transfers_cost, h.bank))
        .unwrap_or((0, 0));

    Ok(Pick {
        manager,
        gameweek,
        slots,
        active_chip,
        transfer_cost,
        bank,
    })
}

fn convert_fixture(wire: WireFixture) -> Fixture {
    Fixture {
        id: wire.id,
        gameweek: wire.event,
        home_team: wire.team_h,
        away_team: wire.team_a,
        home_score: wire.team_h_score,
        away_score: wire.team_a_score,
        home_difficulty: clamp_difficulty(wire.team_h_difficulty),
        away_difficulty: clamp_difficulty(wire.team_a_difficulty),
        started: wire.started.unwrap_or(false),
        finished: wire.finished,
        minutes: wire.minutes,
    }
}

// ---------------------------------------------------------------------------
// DataProvider implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl DataProvider for FplApi {
    async fn get_bootstrap(&self) -> anyhow::Result<Bootstrap> {
        let wire: WireBootstrap = self.get_json("bootstrap-static/").await?;
        Ok(convert_bootstrap(wire))
    }

    async fn get_league_standings(&self, league: u32) -> anyhow::Result<Vec<ManagerEntry>> {
        let wire: WireStandings = self
            .get_json(&format!("leagues-classic/{league}/standings/"))
            .await?;
        Ok(wire
            .standings
            .results
            .into_iter()
            .map(|row| ManagerEntry {
                id: row.entry,
                manager_name: row.player_name,
                team_name: row.entry_name,
                rank: row.rank,
                total: row.total,
                event_total: row.event_total,
            })
            .collect())
    }

    async fn get_manager_picks(
        &self,
        manager: ManagerId,
        gameweek: GameweekId,
    ) -> anyhow::Result<Pick> {
        let wire: WirePicks = self
            .get_json(&format!("entry/{manager}/event/{gameweek}/picks/"))
            .await?;
        convert_picks(wire, manager, gameweek)
    }

    async fn get_live_stats(&self, gameweek: GameweekId) -> anyhow::Result<Vec<LiveStat>> {
        let wire: WireLive = self.get_json(&format!("event/{gameweek}/live/")).await?;
        Ok(wire
            .elements
            .into_iter()
            .map(|e| LiveStat {
                player: e.id,
                minutes: e.stats.minutes,
                total_points: e.stats.total_points,
                goals: e.stats.goals_scored,
                assists: e.stats.assists,
                bonus: e.stats.bonus,
            })
            .collect())
    }

    async fn get_all_fixtures(&self) -> anyhow::Result<Vec<Fixture>> {
        let wire: Vec<WireFixture> = self.get_json("fixtures/").await?;
        Ok(wire.into_iter().map(convert_fixture).collect())
    }

    async fn get_manager_history(&self, manager: ManagerId) -> anyhow::Result<ManagerHistory> {
        let wire: WireHistory = self.get_json(&format!("entry/{manager}/history/")).await?;
        let used_chips = wire
            .chips
            .iter()
            .filter_map(|c| {
                let chip = Chip::from_api_name(&c.name);
                if chip.is_none() {
                    warn!(manager, name = %c.name, "unknown used chip name, ignoring");
                }
                chip
            })
            .collect();
        Ok(ManagerHistory {
            past_gameweeks: wire
                .current
                .into_iter()
                .map(|e| PastGameweek {
                    gameweek: e.event,
                    points: e.points,
                    total_points: e.total_points,
                    rank: e.overall_rank,
                })
                .collect(),
            used_chips,
        })
    }

    async fn get_player_fixture_history(
        &self,
        player: PlayerId,
    ) -> anyhow::Result<PlayerFixtureHistory> {
        let wire: WireElementSummary =
            self.get_json(&format!("element-summary/{player}/")).await?;
        Ok(PlayerFixtureHistory {
            player,
            recent: wire
                .history
                .into_iter()
                .map(|h| PlayerGwHistory {
                    gameweek: h.round,
                    minutes: h.minutes,
                    points: h.total_points,
                    difficulty: clamp_difficulty(h.difficulty),
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
