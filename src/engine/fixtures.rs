// Fixture difficulty aggregation.
//
// Averages each team's FDR over a gameweek window and ranks the league
// easiest-first. Input to the fixture ticker and to transfer comparisons.

use serde::Serialize;

use crate::model::{Fixture, GameweekId, Team, TeamId};

/// Difficulty reported for a team with no fixtures in the window
/// (blank stretch): neutral.
pub const NEUTRAL_DIFFICULTY: f64 = 3.0;

/// A gameweek window `[start, start + length - 1]`.
#[derive(Debug, Clone, Copy)]
pub struct GwWindow {
    pub start: GameweekId,
    pub length: u32,
}

impl GwWindow {
    pub fn new(start: GameweekId, length: u32) -> Self {
        GwWindow { start, length }
    }

    pub fn contains(&self, gw: GameweekId) -> bool {
        gw >= self.start && gw < self.start + self.length
    }
}

/// One upcoming fixture from a single team's perspective.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickerFixture {
    pub gameweek: GameweekId,
    pub opponent: TeamId,
    pub home: bool,
    pub difficulty: u8,
}

/// A team's aggregate fixture outlook over the window.
#[derive(Debug, Clone, Serialize)]
pub struct TeamOutlook {
    pub team: TeamId,
    pub team_name: String,
    /// Mean FDR over the window; `NEUTRAL_DIFFICULTY` with no fixtures.
    pub average_difficulty: f64,
    pub fixtures: Vec<TickerFixture>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Collect a team's fixtures within the window, in gameweek order.
fn team_fixtures(fixtures: &[Fixture], team: TeamId, window: GwWindow) -> Vec<TickerFixture> {
    let mut out: Vec<TickerFixture> = fixtures
        .iter()
        .filter_map(|fx| {
            let gw = fx.gameweek.filter(|&gw| window.contains(gw))?;
            let difficulty = fx.difficulty_for(team)?;
            let home = fx.home_team == team;
            let opponent = if home { fx.away_team } else { fx.home_team };
            Some(TickerFixture {
                gameweek: gw,
                opponent,
                home,
                difficulty,
            })
        })
        .collect();
    out.sort_by_key(|f| f.gameweek);
    out
}

/// Arithmetic mean of a team's per-fixture difficulty over the window.
/// Home fixtures use home difficulty, away fixtures away difficulty.
pub fn average_difficulty(fixtures: &[Fixture], team: TeamId, window: GwWindow) -> f64 {
    let own = team_fixtures(fixtures, team, window);
    if own.is_empty() {
        return NEUTRAL_DIFFICULTY;
    }
    own.iter().map(|f| f.difficulty as f64).sum::<f64>() / own.len() as f64
}

/// Rank every team by average difficulty over the window, easiest first.
/// Ties keep the input team order (stable sort).
pub fn rank_teams(fixtures: &[Fixture], teams: &[Team], window: GwWindow) -> Vec<TeamOutlook> {
    let mut outlooks: Vec<TeamOutlook> = teams
        .iter()
        .map(|team| {
            let own = team_fixtures(fixtures, team.id, window);
            let average_difficulty = if own.is_empty() {
                NEUTRAL_DIFFICULTY
            } else {
                own.iter().map(|f| f.difficulty as f64).sum::<f64>() / own.len() as f64
            };
            TeamOutlook {
                team: team.id,
                team_name: team.name.clone(),
                average_difficulty,
                fixtures: own,
            }
        })
        .collect();

    outlooks.sort_by(|a, b| {
        a.average_difficulty
            .partial_cmp(&b.average_difficulty)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    outlooks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
