// Transfer recommendations.
//
// For every player in the manager's squad, looks for same-position
// candidates with a better trimean that fit the budget, scores each
// swap on trimean gain plus fixture-difficulty improvement, and keeps a
// greedy top five with no player appearing twice on either side.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::engine::fixtures::{average_difficulty, GwWindow};
use crate::engine::{candidate_pool, rate_players, RatedPlayer};
use crate::error::{EngineError, EngineResult};
use crate::model::{ManagerId, PlayerId, TeamId};
use crate::provider::DataProvider;

/// Fixture horizon compared for each swap: the next 3 gameweeks.
const TRANSFER_FIXTURE_WINDOW: u32 = 3;

/// Budget slack added on top of selling price + bank, in tenths of
/// £1.0m. Deliberately permissive (+£50.0m): surfaces aspirational
/// swaps rather than only immediately affordable ones.
const BUDGET_SLACK_TENTHS: u32 = 500;

/// Weight of the fixture-difficulty improvement term relative to the
/// trimean delta.
const FIXTURE_IMPROVEMENT_WEIGHT: f64 = 0.5;

/// Maximum number of suggestions returned.
const MAX_SUGGESTIONS: usize = 5;

/// A proposed swap, with a positive effectiveness score.
#[derive(Debug, Clone, Serialize)]
pub struct TransferSuggestion {
    pub out_player: PlayerId,
    pub out_name: String,
    pub in_player: PlayerId,
    pub in_name: String,
    pub effectiveness: f64,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Pure scoring
// ---------------------------------------------------------------------------

/// Score every (out, in) pair and keep the greedy top five.
///
/// `difficulties` maps each club to its average FDR over the transfer
/// window. A candidate qualifies when he plays the same position, is not
/// already owned, beats the outgoing player's trimean, and costs no more
/// than selling price + bank + the slack allowance.
fn suggest(
    squad: &[RatedPlayer],
    candidates: &[RatedPlayer],
    difficulties: &HashMap<TeamId, f64>,
    bank: u32,
) -> Vec<TransferSuggestion> {
    let owned: HashSet<PlayerId> = squad.iter().map(|p| p.id).collect();
    let difficulty_of =
        |team: TeamId| difficulties.get(&team).copied().unwrap_or(3.0);

    let mut pairs: Vec<TransferSuggestion> = Vec::new();
    for out in squad {
        let out_difficulty = difficulty_of(out.team);
        let budget = out.cost + bank + BUDGET_SLACK_TENTHS;

        for candidate in candidates {
            if candidate.position != out.position
                || owned.contains(&candidate.id)
                || candidate.trimean <= out.trimean
                || candidate.cost > budget
            {
                continue;
            }
            let in_difficulty = difficulty_of(candidate.team);
            let trimean_delta = candidate.trimean - out.trimean;
            let fixture_improvement = out_difficulty - in_difficulty;
            let effectiveness =
                trimean_delta + FIXTURE_IMPROVEMENT_WEIGHT * fixture_improvement;
            if effectiveness <= 0.0 {
                continue;
            }
            pairs.push(TransferSuggestion {
                out_player: out.id,
                out_name: out.name.clone(),
                in_player: candidate.id,
                in_name: candidate.name.clone(),
                effectiveness,
                rationale: format!(
                    "{} (trimean {:.1}, FDR {:.1}) -> {} (trimean {:.1}, FDR {:.1})",
                    out.name,
                    out.trimean,
                    out_difficulty,
                    candidate.name,
                    candidate.trimean,
                    in_difficulty,
                ),
            });
        }
    }

    pairs.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Greedy pass: skip any pair touching a player already used on
    // either side of a higher-ranked pair.
    let mut used: HashSet<PlayerId> = HashSet::new();
    let mut picked = Vec::new();
    for pair in pairs {
        if picked.len() == MAX_SUGGESTIONS {
            break;
        }
        if used.contains(&pair.out_player) || used.contains(&pair.in_player) {
            continue;
        }
        used.insert(pair.out_player);
        used.insert(pair.in_player);
        picked.push(pair);
    }
    picked
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Build transfer recommendations for one manager.
pub async fn recommend_transfers(
    provider: &dyn DataProvider,
    manager: ManagerId,
    concurrency: usize,
) -> EngineResult<Vec<TransferSuggestion>> {
    let bootstrap = provider
        .get_bootstrap()
        .await
        .map_err(|e| EngineError::provider("bootstrap", e))?;
    let gameweek = bootstrap
        .current_gameweek()
        .ok_or(EngineError::NoCurrentGameweek)?
        .id;

    let pick = provider
        .get_manager_picks(manager, gameweek)
        .await
        .map_err(|e| EngineError::provider(format!("picks for manager {manager}"), e))?;
    let fixtures = provider
        .get_all_fixtures()
        .await
        .map_err(|e| EngineError::provider("fixtures", e))?;

    // Squad players must all resolve against the bootstrap so their
    // clubs can be looked up for fixture difficulty.
    let squad_players: Vec<_> = pick
        .slots
        .iter()
        .map(|slot| {
            bootstrap.player(slot.player).ok_or_else(|| {
                EngineError::invalid(format!("pick references unknown player {}", slot.player))
            })
        })
        .collect::<EngineResult<_>>()?;

    let pool = candidate_pool(&bootstrap);
    let candidates = rate_players(provider, &pool, concurrency).await;
    let squad = rate_players(provider, &squad_players, concurrency).await;

    let window = GwWindow::new(gameweek, TRANSFER_FIXTURE_WINDOW);
    let difficulties: HashMap<TeamId, f64> = bootstrap
        .teams
        .iter()
        .map(|team| (team.id, average_difficulty(&fixtures, team.id, window)))
        .collect();

    Ok(suggest(&squad, &candidates, &difficulties, pick.bank))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
