// League ownership and differential analysis.
//
// Counts, for every player picked anywhere in the league, which managers
// own him and how often he wears the armband, then buckets players into
// ownership tiers for the differential report.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::model::{Bootstrap, ManagerId, Pick, PlayerId, Position};
use crate::provider::{fetch_bounded, DataProvider};

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Ownership bucket, by percent of the league's managers owning the
/// player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OwnershipTier {
    /// Owned by at least 75% of managers: not owning him is the risk.
    Essential,
    /// 50-75%.
    Core,
    /// 25-50%.
    Popular,
    /// Under 25%: a genuine differential.
    Differential,
}

impl OwnershipTier {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 75.0 {
            OwnershipTier::Essential
        } else if percent >= 50.0 {
            OwnershipTier::Core
        } else if percent >= 25.0 {
            OwnershipTier::Popular
        } else {
            OwnershipTier::Differential
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OwnershipTier::Essential => "ESSENTIAL",
            OwnershipTier::Core => "CORE",
            OwnershipTier::Popular => "POPULAR",
            OwnershipTier::Differential => "DIFFERENTIAL",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Ownership facts for one player across a league.
#[derive(Debug, Clone, Serialize)]
pub struct OwnershipRecord {
    pub player: PlayerId,
    pub name: String,
    pub position: Position,
    pub owners: Vec<ManagerId>,
    /// Number of picks where this player is captain.
    pub captain_count: usize,
    pub ownership_percent: f64,
    pub tier: OwnershipTier,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze ownership across a league for the current gameweek. Output is
/// sorted by ownership percent descending, captain count as tiebreak.
pub async fn analyze_ownership(
    provider: &dyn DataProvider,
    league: u32,
    concurrency: usize,
) -> EngineResult<Vec<OwnershipRecord>> {
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

    let manager_ids: Vec<ManagerId> = entries.iter().map(|e| e.id).collect();
    let picks: Vec<Pick> = fetch_bounded(manager_ids.clone(), concurrency, |manager| async move {
        provider.get_manager_picks(manager, gameweek).await
    })
    .await
    .into_iter()
    .zip(manager_ids)
    .map(|(result, manager)| match result {
        Ok(pick) => pick,
        Err(e) => {
            warn!(manager, error = %e, "picks unavailable, counted with empty squad");
            Pick::empty(manager, gameweek)
        }
    })
    .collect();

    Ok(accumulate(&picks, entries.len(), &bootstrap))
}

/// Pure accumulation step over already-fetched picks.
fn accumulate(picks: &[Pick], total_managers: usize, bootstrap: &Bootstrap) -> Vec<OwnershipRecord> {
    struct Tally {
        owners: Vec<ManagerId>,
        captain_count: usize,
    }

    let mut tallies: HashMap<PlayerId, Tally> = HashMap::new();
    for pick in picks {
        for slot in &pick.slots {
            let tally = tallies.entry(slot.player).or_insert(Tally {
                owners: Vec::new(),
                captain_count: 0,
            });
            tally.owners.push(pick.manager);
            if slot.is_captain {
                tally.captain_count += 1;
            }
        }
    }

    let mut records: Vec<OwnershipRecord> = tallies
        .into_iter()
        .map(|(player, tally)| {
            let ownership_percent = if total_managers == 0 {
                0.0
            } else {
                tally.owners.len() as f64 / total_managers as f64 * 100.0
            };
            let (name, position) = bootstrap
                .player(player)
                .map(|p| (p.name.clone(), p.position))
                .unwrap_or_else(|| (format!("#{player}"), Position::Midfielder));
            OwnershipRecord {
                player,
                name,
                position,
                tier: OwnershipTier::from_percent(ownership_percent),
                ownership_percent,
                captain_count: tally.captain_count,
                owners: tally.owners,
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.ownership_percent
            .partial_cmp(&a.ownership_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.captain_count.cmp(&a.captain_count))
            .then(a.player.cmp(&b.player))
    });
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
