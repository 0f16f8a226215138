// Squad optimization (Best XI).
//
// Greedy constrained selection of a 15-player squad from a rated
// candidate pool, then an enumeration of legal formations to pick the
// best starting eleven. Knowingly heuristic: the greedy scan and the
// fixed formation list are the contract, not a provably optimal solver.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::{candidate_pool, rate_players, RatedPlayer};
use crate::error::{EngineError, EngineResult};
use crate::model::{Position, TeamId};
use crate::provider::DataProvider;

/// Position quota for a full squad: 2 GKP, 5 DEF, 5 MID, 3 FWD.
pub const POSITION_QUOTA: [(Position, usize); 4] = [
    (Position::Goalkeeper, 2),
    (Position::Defender, 5),
    (Position::Midfielder, 5),
    (Position::Forward, 3),
];

/// At most three players from the same real-world club.
pub const MAX_PER_TEAM: usize = 3;

// ---------------------------------------------------------------------------
// Formations
// ---------------------------------------------------------------------------

/// A starting formation: one goalkeeper plus these outfield counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Formation {
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl Formation {
    pub fn label(&self) -> String {
        format!("{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

/// The formations considered, in evaluation order.
pub const FORMATIONS: [Formation; 8] = [
    Formation { defenders: 3, midfielders: 4, forwards: 3 },
    Formation { defenders: 3, midfielders: 5, forwards: 2 },
    Formation { defenders: 4, midfielders: 4, forwards: 2 },
    Formation { defenders: 4, midfielders: 3, forwards: 3 },
    Formation { defenders: 4, midfielders: 5, forwards: 1 },
    Formation { defenders: 5, midfielders: 3, forwards: 2 },
    Formation { defenders: 5, midfielders: 4, forwards: 1 },
    Formation { defenders: 5, midfielders: 2, forwards: 3 },
];

/// Fallback when no enumerated formation fits the selected squad.
const FALLBACK_FORMATION: Formation = Formation {
    defenders: 4,
    midfielders: 4,
    forwards: 2,
};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BestSquad {
    /// The full 15 (or fewer if candidates were exhausted), in selection
    /// order.
    pub squad: Vec<RatedPlayer>,
    pub starting_xi: Vec<RatedPlayer>,
    pub formation: Formation,
    /// Sum of starting-eleven trimeans under the chosen formation.
    pub starting_trimean: f64,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

fn quota_for(position: Position) -> usize {
    POSITION_QUOTA
        .iter()
        .find(|(p, _)| *p == position)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}

/// Greedily select up to 15 players by trimean descending, skipping any
/// candidate that would break the position quota or the per-club cap.
pub fn select_squad(candidates: &[RatedPlayer]) -> Vec<RatedPlayer> {
    let mut ranked: Vec<&RatedPlayer> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
        b.trimean
            .partial_cmp(&a.trimean)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut squad: Vec<RatedPlayer> = Vec::with_capacity(15);
    let mut per_position: HashMap<Position, usize> = HashMap::new();
    let mut per_team: HashMap<TeamId, usize> = HashMap::new();

    for candidate in ranked {
        if squad.len() == 15 {
            break;
        }
        let pos_count = per_position.get(&candidate.position).copied().unwrap_or(0);
        if pos_count >= quota_for(candidate.position) {
            continue;
        }
        let team_count = per_team.get(&candidate.team).copied().unwrap_or(0);
        if team_count >= MAX_PER_TEAM {
            continue;
        }
        *per_position.entry(candidate.position).or_insert(0) += 1;
        *per_team.entry(candidate.team).or_insert(0) += 1;
        squad.push(candidate.clone());
    }
    squad
}

/// Players of one position, best trimean first.
fn bucket(squad: &[RatedPlayer], position: Position) -> Vec<&RatedPlayer> {
    let mut players: Vec<&RatedPlayer> =
        squad.iter().filter(|p| p.position == position).collect();
    players.sort_by(|a, b| {
        b.trimean
            .partial_cmp(&a.trimean)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    players
}

fn xi_for(squad: &[RatedPlayer], formation: Formation) -> Option<Vec<RatedPlayer>> {
    let gks = bucket(squad, Position::Goalkeeper);
    let defs = bucket(squad, Position::Defender);
    let mids = bucket(squad, Position::Midfielder);
    let fwds = bucket(squad, Position::Forward);

    if gks.is_empty()
        || defs.len() < formation.defenders
        || mids.len() < formation.midfielders
        || fwds.len() < formation.forwards
    {
        return None;
    }

    let mut xi: Vec<RatedPlayer> = Vec::with_capacity(11);
    xi.push(gks[0].clone());
    xi.extend(defs[..formation.defenders].iter().map(|p| (*p).clone()));
    xi.extend(mids[..formation.midfielders].iter().map(|p| (*p).clone()));
    xi.extend(fwds[..formation.forwards].iter().map(|p| (*p).clone()));
    Some(xi)
}

fn xi_trimean(xi: &[RatedPlayer]) -> f64 {
    xi.iter().map(|p| p.trimean).sum()
}

/// Pick the starting eleven: evaluate every enumerated formation the
/// squad can field and keep the one with the highest trimean total. A
/// formation the squad cannot fill is skipped, not an error. If none
/// fit, fall back to 4-4-2 filled with whatever is available.
pub fn best_starting_xi(squad: &[RatedPlayer]) -> (Vec<RatedPlayer>, Formation, f64) {
    let mut best: Option<(Vec<RatedPlayer>, Formation, f64)> = None;

    for formation in FORMATIONS {
        let Some(xi) = xi_for(squad, formation) else {
            continue;
        };
        let total = xi_trimean(&xi);
        let better = match &best {
            Some((_, _, best_total)) => total > *best_total,
            None => true,
        };
        if better {
            best = Some((xi, formation, total));
        }
    }

    best.unwrap_or_else(|| {
        // Degenerate squad: field a 4-4-2 shape with whatever exists.
        let f = FALLBACK_FORMATION;
        let mut xi: Vec<RatedPlayer> = Vec::new();
        let gks = bucket(squad, Position::Goalkeeper);
        xi.extend(gks.iter().take(1).map(|p| (*p).clone()));
        for (position, want) in [
            (Position::Defender, f.defenders),
            (Position::Midfielder, f.midfielders),
            (Position::Forward, f.forwards),
        ] {
            let players = bucket(squad, position);
            xi.extend(players.iter().take(want).map(|p| (*p).clone()));
        }
        let total = xi_trimean(&xi);
        (xi, f, total)
    })
}

/// Build the optimal squad from the provider's current player pool.
pub async fn best_squad(
    provider: &dyn DataProvider,
    concurrency: usize,
) -> EngineResult<BestSquad> {
    let bootstrap = provider
        .get_bootstrap()
        .await
        .map_err(|e| EngineError::provider("bootstrap", e))?;

    let pool = candidate_pool(&bootstrap);
    let rated = rate_players(provider, &pool, concurrency).await;

    let squad = select_squad(&rated);
    let (starting_xi, formation, starting_trimean) = best_starting_xi(&squad);
    Ok(BestSquad {
        squad,
        starting_xi,
        formation,
        starting_trimean,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
