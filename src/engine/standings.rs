// Live league standings.
//
// Orchestrates the per-manager pipeline: fetch picks with bounded
// concurrency, run the auto-substitution pass against live stats, and
// re-rank the league on the freshly computed totals. One manager's
// failed pick fetch degrades to an empty pick; it never aborts the
// table.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::autosub::{self, SimulatedSquad};
use crate::engine::stats::weighted_trimean;
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Bootstrap, Chip, LiveStat, ManagerEntry, ManagerId, Pick, PlayerId, Position,
};
use crate::provider::{fetch_bounded, DataProvider};

/// Captain line shown alongside each manager's row.
#[derive(Debug, Clone, Serialize)]
pub struct CaptainSummary {
    pub player: PlayerId,
    pub name: String,
    /// Whether the captain has actually played (minutes > 0).
    pub played: bool,
    pub multiplier: u8,
}

/// One manager's row in the live table. Derived, never persisted:
/// recomputed per request from current pick and live-stat snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct LiveScore {
    pub manager: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    /// Live gameweek points after auto-substitution, before transfer cost.
    pub live_points: i32,
    /// Reported total with the provider's static gameweek contribution
    /// replaced by the live one.
    pub live_total: i32,
    pub live_rank: u32,
    /// `reported_rank - live_rank`; positive means the manager has risen.
    pub rank_delta: i64,
    pub reported_rank: u32,
    pub active_chip: Option<Chip>,
    /// Tracked separately, not subtracted from the displayed total.
    pub transfer_cost: u32,
    pub captain: Option<CaptainSummary>,
    /// Sum of each starting-eleven player's weighted trimean.
    pub squad_trimean: f64,
}

// ---------------------------------------------------------------------------
// Build pipeline
// ---------------------------------------------------------------------------

/// Build the live table for a league.
///
/// Fails with `NoCurrentGameweek` off-season and `Provider` when a
/// required fetch (bootstrap, standings, live stats) is unavailable.
pub async fn build_live_standings(
    provider: &dyn DataProvider,
    league: u32,
    concurrency: usize,
) -> EngineResult<Vec<LiveScore>> {
    let bootstrap = provider
        .get_bootstrap()
        .await
        .map_err(|e| EngineError::provider("bootstrap", e))?;
    let gameweek = bootstrap
        .current_gameweek()
        .ok_or(EngineError::NoCurrentGameweek)?
        .id;

    let entries = provider
        .get_league_standings(league)
        .await
        .map_err(|e| EngineError::provider(format!("standings for league {league}"), e))?;
    let live = provider
        .get_live_stats(gameweek)
        .await
        .map_err(|e| EngineError::provider(format!("live stats for gw {gameweek}"), e))?;
    let live: HashMap<PlayerId, LiveStat> = live.into_iter().map(|s| (s.player, s)).collect();

    info!(league, gameweek, managers = entries.len(), "building live standings");

    // Fan out the per-manager pick fetches; a failed manager degrades to
    // an empty pick and scores zero this gameweek.
    let manager_ids: Vec<ManagerId> = entries.iter().map(|e| e.id).collect();
    let picks: Vec<Pick> = fetch_bounded(manager_ids, concurrency, |manager| async move {
        provider.get_manager_picks(manager, gameweek).await
    })
    .await
    .into_iter()
    .zip(entries.iter())
    .map(|(result, entry)| match result {
        Ok(pick) => pick,
        Err(e) => {
            warn!(manager = entry.id, error = %e, "picks unavailable, using empty pick");
            Pick::empty(entry.id, gameweek)
        }
    })
    .collect();

    let trimeans = starter_trimeans(provider, &picks, concurrency).await;
    let positions: HashMap<PlayerId, Position> = bootstrap
        .players
        .iter()
        .map(|p| (p.id, p.position))
        .collect();

    let mut rows: Vec<LiveScore> = entries
        .iter()
        .zip(picks.iter())
        .map(|(entry, pick)| {
            let sim = autosub::simulate(pick, &live, &positions);
            score_manager(entry, pick, &sim, &live, &trimeans, &bootstrap)
        })
        .collect();

    rank_by_live_total(&mut rows);
    Ok(rows)
}

/// Trimean per distinct starter across the whole league. Fetched once
/// per player, not per manager: managers sharing players share the
/// computation. Cache lives only for this call; the engine stays
/// cache-agnostic across requests.
async fn starter_trimeans(
    provider: &dyn DataProvider,
    picks: &[Pick],
    concurrency: usize,
) -> HashMap<PlayerId, f64> {
    let mut ids: Vec<PlayerId> = picks
        .iter()
        .flat_map(|p| p.starters().map(|s| s.player))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let results = fetch_bounded(ids.clone(), concurrency, |player| async move {
        provider.get_player_fixture_history(player).await
    })
    .await;

    ids.into_iter()
        .zip(results)
        .map(|(player, result)| match result {
            Ok(history) => (player, weighted_trimean(&history.recent)),
            Err(e) => {
                warn!(player, error = %e, "player history unavailable, trimean 0");
                (player, 0.0)
            }
        })
        .collect()
}

fn score_manager(
    entry: &ManagerEntry,
    pick: &Pick,
    sim: &SimulatedSquad,
    live: &HashMap<PlayerId, LiveStat>,
    trimeans: &HashMap<PlayerId, f64>,
    bootstrap: &Bootstrap,
) -> LiveScore {
    let captain = pick.captain().map(|slot| {
        let name = bootstrap
            .player(slot.player)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", slot.player));
        let played = live.get(&slot.player).map(|s| s.minutes > 0).unwrap_or(false);
        CaptainSummary {
            player: slot.player,
            name,
            played,
            multiplier: slot.multiplier,
        }
    });

    let squad_trimean = pick
        .starters()
        .map(|s| trimeans.get(&s.player).copied().unwrap_or(0.0))
        .sum();

    // Replace the provider's static gameweek contribution with the live
    // one; transfer cost stays separate.
    let live_total = entry.total - entry.event_total + sim.points;

    LiveScore {
        manager: entry.id,
        manager_name: entry.manager_name.clone(),
        team_name: entry.team_name.clone(),
        live_points: sim.points,
        live_total,
        live_rank: 0,
        rank_delta: 0,
        reported_rank: entry.rank,
        active_chip: pick.active_chip,
        transfer_cost: pick.transfer_cost,
        captain,
        squad_trimean,
    }
}

/// Sort descending by live total (stable: ties keep input order) and
/// assign dense ranks 1..=N plus the delta against the reported rank.
fn rank_by_live_total(rows: &mut [LiveScore]) {
    rows.sort_by(|a, b| b.live_total.cmp(&a.live_total));
    for (idx, row) in rows.iter_mut().enumerate() {
        row.live_rank = idx as u32 + 1;
        row.rank_delta = row.reported_rank as i64 - row.live_rank as i64;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(manager: ManagerId, live_total: i32, reported_rank: u32) -> LiveScore {
        LiveScore {
            manager,
            manager_name: format!("M{manager}"),
            team_name: format!("T{manager}"),
            live_points: 0,
            live_total,
            live_rank: 0,
            rank_delta: 0,
            reported_rank,
            active_chip: None,
            transfer_cost: 0,
            captain: None,
            squad_trimean: 0.0,
        }
    }

    #[test]
    fn ranks_are_a_dense_permutation() {
        let mut rows = vec![row(1, 100, 2), row(2, 120, 1), row(3, 90, 3)];
        rank_by_live_total(&mut rows);
        let order: Vec<ManagerId> = rows.iter().map(|r| r.manager).collect();
        assert_eq!(order, vec![2, 1, 3]);
        let ranks: Vec<u32> = rows.iter().map(|r| r.live_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn rank_delta_positive_when_rising() {
        let mut rows = vec![row(1, 100, 5), row(2, 80, 1)];
        rank_by_live_total(&mut rows);
        // Manager 1 was reported 5th, now 1st: delta +4.
        assert_eq!(rows[0].manager, 1);
        assert_eq!(rows[0].rank_delta, 4);
        assert_eq!(rows[1].rank_delta, -1);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut rows = vec![row(7, 100, 1), row(8, 100, 2), row(9, 100, 3)];
        rank_by_live_total(&mut rows);
        let order: Vec<ManagerId> = rows.iter().map(|r| r.manager).collect();
        assert_eq!(order, vec![7, 8, 9]);
    }
}
