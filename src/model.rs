// Core domain entities shared across the provider boundary and the engine.
//
// Everything here is a plain data snapshot: refreshed wholesale from the
// provider, never mutated by the engine. Derived outputs (live scores,
// recommendations, ownership records) live next to the computation that
// produces them in `engine/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerId = u32;
pub type TeamId = u32;
pub type ManagerId = u32;
pub type GameweekId = u32;

/// Number of players in a full squad.
pub const SQUAD_SIZE: usize = 15;
/// Number of starting players (squad slots 1..=11).
pub const STARTING_XI: usize = 11;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Squad position, in the provider's `element_type` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// Parse the provider's numeric `element_type` (1-4).
    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Short display code (GKP/DEF/MID/FWD).
    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Deterministic ordering index (goalkeepers first).
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Availability status
// ---------------------------------------------------------------------------

/// Player availability, from the provider's single-letter status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Available,
    Doubtful,
    Injured,
    Suspended,
    Unavailable,
}

impl PlayerStatus {
    /// Parse the provider's status letter. Unknown codes map to
    /// `Unavailable` rather than failing the whole bootstrap.
    pub fn from_code(code: &str) -> Self {
        match code {
            "a" => PlayerStatus::Available,
            "d" => PlayerStatus::Doubtful,
            "i" => PlayerStatus::Injured,
            "s" => PlayerStatus::Suspended,
            _ => PlayerStatus::Unavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Chips
// ---------------------------------------------------------------------------

/// One-time special squad rules a manager may activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chip {
    BenchBoost,
    TripleCaptain,
    FreeHit,
    Wildcard,
}

impl Chip {
    /// Parse the provider's chip name (e.g. "bboost", "3xc").
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name {
            "bboost" => Some(Chip::BenchBoost),
            "3xc" => Some(Chip::TripleCaptain),
            "freehit" => Some(Chip::FreeHit),
            "wildcard" => Some(Chip::Wildcard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Chip::BenchBoost => "Bench Boost",
            Chip::TripleCaptain => "Triple Captain",
            Chip::FreeHit => "Free Hit",
            Chip::Wildcard => "Wildcard",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Bootstrap entities
// ---------------------------------------------------------------------------

/// A player snapshot from the bootstrap feed. Cost is fixed-point in
/// tenths of £1.0m (e.g. 125 = £12.5m).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub cost: u32,
    pub total_points: i32,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub form: f64,
    pub status: PlayerStatus,
    pub selected_by_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    pub strength: u32,
}

/// One round of the season. At most one gameweek is current at a time;
/// none current means pre-season or off-season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gameweek {
    pub id: GameweekId,
    pub is_previous: bool,
    pub is_current: bool,
    pub is_next: bool,
    pub finished: bool,
    pub deadline: Option<DateTime<Utc>>,
}

/// The full bootstrap snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bootstrap {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub gameweeks: Vec<Gameweek>,
}

impl Bootstrap {
    /// The gameweek flagged current, if the season is underway.
    pub fn current_gameweek(&self) -> Option<&Gameweek> {
        self.gameweeks.iter().find(|gw| gw.is_current)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A scheduled (or played) match. Difficulty is the provider's FDR,
/// 1 (easiest) to 5 (hardest), from each side's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    /// None for fixtures not yet assigned to a gameweek.
    pub gameweek: Option<GameweekId>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_difficulty: u8,
    pub away_difficulty: u8,
    pub started: bool,
    pub finished: bool,
    pub minutes: u32,
}

impl Fixture {
    /// The difficulty faced by `team` in this fixture, if the team is
    /// involved at all.
    pub fn difficulty_for(&self, team: TeamId) -> Option<u8> {
        if self.home_team == team {
            Some(self.home_difficulty)
        } else if self.away_team == team {
            Some(self.away_difficulty)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// One player reference within a manager's squad selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PickSlot {
    pub player: PlayerId,
    /// 1-15; 1-11 are the starting eleven, 12-15 the bench in sub order.
    pub slot: u8,
    /// Score multiplier: 0 unused sub, 1 normal, 2 captain, 3 triple captain.
    pub multiplier: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl PickSlot {
    pub fn is_starter(&self) -> bool {
        (1..=STARTING_XI as u8).contains(&self.slot)
    }
}

/// A manager's 15-player squad selection for one gameweek.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub manager: ManagerId,
    pub gameweek: GameweekId,
    /// Exactly 15 slots, ordered by slot number.
    pub slots: Vec<PickSlot>,
    pub active_chip: Option<Chip>,
    /// Points deducted for extra transfers this gameweek.
    pub transfer_cost: u32,
    /// Bank balance in tenths of £1.0m.
    pub bank: u32,
}

impl Pick {
    /// A degraded placeholder for a manager whose picks failed to load:
    /// scores zero but keeps the standings batch alive.
    pub fn empty(manager: ManagerId, gameweek: GameweekId) -> Self {
        Pick {
            manager,
            gameweek,
            slots: Vec::new(),
            active_chip: None,
            transfer_cost: 0,
            bank: 0,
        }
    }

    pub fn starters(&self) -> impl Iterator<Item = &PickSlot> {
        self.slots.iter().filter(|s| s.is_starter())
    }

    pub fn bench(&self) -> impl Iterator<Item = &PickSlot> {
        self.slots.iter().filter(|s| !s.is_starter())
    }

    pub fn captain(&self) -> Option<&PickSlot> {
        self.slots.iter().find(|s| s.is_captain)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.slots.iter().any(|s| s.player == player)
    }
}

// ---------------------------------------------------------------------------
// Live statistics
// ---------------------------------------------------------------------------

/// Per-player live numbers for one gameweek. Volatile while the
/// gameweek is in play.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LiveStat {
    pub player: PlayerId,
    pub minutes: u32,
    pub total_points: i32,
    pub goals: u32,
    pub assists: u32,
    pub bonus: u32,
}

// ---------------------------------------------------------------------------
// League standings
// ---------------------------------------------------------------------------

/// A manager's row in the provider's league standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerEntry {
    pub id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    /// Rank as last computed by the provider.
    pub rank: u32,
    /// Cumulative total points as reported by the provider.
    pub total: i32,
    /// This-gameweek points as reported by the provider.
    pub event_total: i32,
}

// ---------------------------------------------------------------------------
// Manager history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastGameweek {
    pub gameweek: GameweekId,
    pub points: i32,
    pub total_points: i32,
    pub rank: Option<u32>,
}

/// A manager's season history: past gameweek results plus chips already
/// burned (a used chip is never recommended again).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerHistory {
    pub past_gameweeks: Vec<PastGameweek>,
    pub used_chips: Vec<Chip>,
}

// ---------------------------------------------------------------------------
// Per-player gameweek history (trimean input)
// ---------------------------------------------------------------------------

/// One historical gameweek for a single player, with the opponent
/// difficulty faced that round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerGwHistory {
    pub gameweek: GameweekId,
    pub minutes: u32,
    pub points: i32,
    pub difficulty: u8,
}

/// A player's recent gameweek-by-gameweek record, most recent last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerFixtureHistory {
    pub player: PlayerId,
    pub recent: Vec<PlayerGwHistory>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
