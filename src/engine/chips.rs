// Chip-timing recommendations.
//
// Heuristic triggers over the next ten gameweeks of fixtures plus the
// manager's squad state. Chips already burned this season are never
// recommended again. Every suggestion carries an integer 0-10 score for
// ranking; the concrete formulas live next to each trigger.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::model::{
    Chip, Fixture, GameweekId, ManagerHistory, ManagerId, Pick, Player, PlayerStatus,
};
use crate::provider::DataProvider;

/// Gameweeks scanned ahead of the current one.
const CHIP_HORIZON: u32 = 10;

/// A fixture is "easy" for triple-captain purposes at FDR 2 or below.
const EASY_FIXTURE_THRESHOLD: u8 = 2;

/// Free-hit thresholds on the per-gameweek fixture count relative to the
/// horizon average.
const DOUBLE_GW_RATIO: f64 = 1.5;
const BLANK_GW_RATIO: f64 = 0.5;

/// Wildcard triggers on squad state.
const WILDCARD_UNAVAILABLE_THRESHOLD: usize = 3;
const WILDCARD_POOR_FORM_THRESHOLD: usize = 5;
const POOR_FORM_CUTOFF: f64 = 2.0;

/// A chip-timing suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct ChipSuggestion {
    pub chip: Chip,
    pub gameweek: GameweekId,
    /// 0-10 ranking score.
    pub score: u8,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Per-gameweek fixture view
// ---------------------------------------------------------------------------

/// Fixtures in the horizon `(current, current + CHIP_HORIZON]`, grouped
/// by gameweek. A BTreeMap keeps gameweek iteration ordered.
fn horizon_fixtures(
    fixtures: &[Fixture],
    current: GameweekId,
) -> BTreeMap<GameweekId, Vec<&Fixture>> {
    let mut grouped: BTreeMap<GameweekId, Vec<&Fixture>> = BTreeMap::new();
    for fixture in fixtures {
        let Some(gw) = fixture.gameweek else { continue };
        if gw > current && gw <= current + CHIP_HORIZON {
            grouped.entry(gw).or_default().push(fixture);
        }
    }
    grouped
}

/// Mean difficulty over both sides of every fixture in a gameweek.
fn gameweek_average_difficulty(fixtures: &[&Fixture]) -> f64 {
    if fixtures.is_empty() {
        return 0.0;
    }
    let total: u32 = fixtures
        .iter()
        .map(|f| f.home_difficulty as u32 + f.away_difficulty as u32)
        .sum();
    total as f64 / (fixtures.len() as f64 * 2.0)
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 10.0) as u8
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Bench boost: the horizon gameweek with the lowest average difficulty,
/// considered only when easier than neutral. Score scales with how far
/// below neutral the average sits.
fn bench_boost(grouped: &BTreeMap<GameweekId, Vec<&Fixture>>) -> Option<ChipSuggestion> {
    let (gw, avg) = grouped
        .iter()
        .filter(|(_, fixtures)| !fixtures.is_empty())
        .map(|(gw, fixtures)| (*gw, gameweek_average_difficulty(fixtures)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))?;

    if avg >= 3.0 {
        return None;
    }
    Some(ChipSuggestion {
        chip: Chip::BenchBoost,
        gameweek: gw,
        score: clamp_score((3.0 - avg) * 5.0),
        rationale: format!("GW{gw} has the easiest overall fixtures (avg FDR {avg:.2})"),
    })
}

/// Triple captain: the gameweek with the most fixtures where one side
/// faces FDR <= 2, scored by the count plus how easy those fixtures are.
fn triple_captain(grouped: &BTreeMap<GameweekId, Vec<&Fixture>>) -> Option<ChipSuggestion> {
    let mut best: Option<(GameweekId, usize, f64)> = None;
    for (&gw, fixtures) in grouped {
        let easy: Vec<u8> = fixtures
            .iter()
            .map(|f| f.home_difficulty.min(f.away_difficulty))
            .filter(|&d| d <= EASY_FIXTURE_THRESHOLD)
            .collect();
        if easy.is_empty() {
            continue;
        }
        let avg = easy.iter().map(|&d| d as f64).sum::<f64>() / easy.len() as f64;
        let better = match best {
            Some((_, count, _)) => easy.len() > count,
            None => true,
        };
        if better {
            best = Some((gw, easy.len(), avg));
        }
    }

    let (gw, count, avg) = best?;
    Some(ChipSuggestion {
        chip: Chip::TripleCaptain,
        gameweek: gw,
        score: clamp_score(count as f64 * 2.0 + (EASY_FIXTURE_THRESHOLD as f64 - avg) * 2.0),
        rationale: format!("GW{gw} has {count} fixtures at FDR <= 2 (avg {avg:.2})"),
    })
}

/// Free hit: flag the first gameweek whose fixture count deviates hard
/// from the horizon average (double gameweek above 1.5x, blank below
/// 0.5x). Stops at the first hit.
fn free_hit(
    grouped: &BTreeMap<GameweekId, Vec<&Fixture>>,
    current: GameweekId,
) -> Option<ChipSuggestion> {
    if grouped.is_empty() {
        return None;
    }
    // Every horizon gameweek counts, including ones with no fixtures.
    let counts: Vec<(GameweekId, usize)> = (current + 1..=current + CHIP_HORIZON)
        .map(|gw| (gw, grouped.get(&gw).map(|f| f.len()).unwrap_or(0)))
        .collect();
    let avg = counts.iter().map(|(_, n)| *n as f64).sum::<f64>() / counts.len() as f64;
    if avg == 0.0 {
        return None;
    }

    for (gw, count) in counts {
        let ratio = count as f64 / avg;
        if ratio > DOUBLE_GW_RATIO {
            return Some(ChipSuggestion {
                chip: Chip::FreeHit,
                gameweek: gw,
                score: clamp_score(ratio * 4.0),
                rationale: format!(
                    "GW{gw} is a double gameweek ({count} fixtures vs {avg:.1} average)"
                ),
            });
        }
        if ratio < BLANK_GW_RATIO {
            return Some(ChipSuggestion {
                chip: Chip::FreeHit,
                gameweek: gw,
                score: clamp_score((1.0 - ratio) * 7.0),
                rationale: format!(
                    "GW{gw} is a blank gameweek ({count} fixtures vs {avg:.1} average)"
                ),
            });
        }
    }
    None
}

/// Wildcard: recommend the gameweek after the current one when the
/// squad is falling apart, either through unavailability or form.
fn wildcard(pick: &Pick, squad: &[&Player], current: GameweekId) -> Option<ChipSuggestion> {
    if pick.slots.is_empty() {
        return None;
    }
    let unavailable = squad
        .iter()
        .filter(|p| p.status != PlayerStatus::Available)
        .count();
    let poor_form = squad.iter().filter(|p| p.form < POOR_FORM_CUTOFF).count();

    let unavailable_hit = unavailable >= WILDCARD_UNAVAILABLE_THRESHOLD;
    let form_hit = poor_form >= WILDCARD_POOR_FORM_THRESHOLD;
    if !unavailable_hit && !form_hit {
        return None;
    }

    let score = match (unavailable_hit, form_hit) {
        (true, true) => 10,
        (true, false) => 8,
        (false, true) => 6,
        (false, false) => unreachable!(),
    };
    Some(ChipSuggestion {
        chip: Chip::Wildcard,
        gameweek: current + 1,
        score,
        rationale: format!(
            "{unavailable} squad players unavailable, {poor_form} in poor form"
        ),
    })
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Pure evaluation over already-fetched inputs.
fn evaluate(
    fixtures: &[Fixture],
    pick: &Pick,
    squad: &[&Player],
    history: &ManagerHistory,
    current: GameweekId,
) -> Vec<ChipSuggestion> {
    let grouped = horizon_fixtures(fixtures, current);

    let mut suggestions: Vec<ChipSuggestion> = [
        bench_boost(&grouped),
        triple_captain(&grouped),
        free_hit(&grouped, current),
        wildcard(pick, squad, current),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !history.used_chips.contains(&s.chip))
    .collect();

    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions
}

/// Build chip-timing recommendations for one manager.
pub async fn recommend_chips(
    provider: &dyn DataProvider,
    manager: ManagerId,
) -> EngineResult<Vec<ChipSuggestion>> {
    let bootstrap = provider
        .get_bootstrap()
        .await
        .map_err(|e| EngineError::provider("bootstrap", e))?;
    let current = bootstrap
        .current_gameweek()
        .ok_or(EngineError::NoCurrentGameweek)?
        .id;

    let fixtures = provider
        .get_all_fixtures()
        .await
        .map_err(|e| EngineError::provider("fixtures", e))?;
    let history = provider
        .get_manager_history(manager)
        .await
        .map_err(|e| EngineError::provider(format!("history for manager {manager}"), e))?;
    let pick = provider
        .get_manager_picks(manager, current)
        .await
        .map_err(|e| EngineError::provider(format!("picks for manager {manager}"), e))?;

    let squad: Vec<&Player> = pick
        .slots
        .iter()
        .filter_map(|slot| bootstrap.player(slot.player))
        .collect();

    Ok(evaluate(&fixtures, &pick, &squad, &history, current))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
