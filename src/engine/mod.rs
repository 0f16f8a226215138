// Scoring and recommendation engine.
//
// Pure, stateless computation over provider snapshots. Concurrency lives
// only at the data-gathering boundary (bounded fan-out in `provider`);
// the math itself is synchronous and reentrant.

pub mod autosub;
pub mod chips;
pub mod fixtures;
pub mod ownership;
pub mod squad;
pub mod standings;
pub mod stats;
pub mod transfers;

use serde::Serialize;
use tracing::warn;

use crate::model::{Bootstrap, Player, PlayerId, PlayerStatus, Position, TeamId};
use crate::provider::{fetch_bounded, DataProvider};

/// Size of each half of the candidate pool (top N by season points,
/// top N by form).
const CANDIDATE_POOL_SIZE: usize = 50;

/// A player annotated with the weighted trimean quality signal. The
/// shared currency of the squad optimizer and the transfer engine.
#[derive(Debug, Clone, Serialize)]
pub struct RatedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    /// Cost in tenths of £1.0m.
    pub cost: u32,
    pub form: f64,
    pub status: PlayerStatus,
    pub trimean: f64,
}

impl RatedPlayer {
    fn new(player: &Player, trimean: f64) -> Self {
        RatedPlayer {
            id: player.id,
            name: player.name.clone(),
            team: player.team,
            position: player.position,
            cost: player.cost,
            form: player.form,
            status: player.status,
            trimean,
        }
    }
}

/// Candidate pool for optimization: top N by season total points union
/// top N by current form, deduplicated, available players only.
pub(crate) fn candidate_pool(bootstrap: &Bootstrap) -> Vec<&Player> {
    let available: Vec<&Player> = bootstrap
        .players
        .iter()
        .filter(|p| p.status == PlayerStatus::Available)
        .collect();

    let mut by_points = available.clone();
    by_points.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    by_points.truncate(CANDIDATE_POOL_SIZE);

    let mut by_form = available;
    by_form.sort_by(|a, b| {
        b.form
            .partial_cmp(&a.form)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    by_form.truncate(CANDIDATE_POOL_SIZE);

    let mut pool = by_points;
    for player in by_form {
        if !pool.iter().any(|p| p.id == player.id) {
            pool.push(player);
        }
    }
    pool
}

/// Fetch per-player histories with bounded concurrency and annotate each
/// player with the weighted trimean. A failed history degrades that one
/// player to trimean 0 rather than aborting the batch.
pub(crate) async fn rate_players(
    provider: &dyn DataProvider,
    players: &[&Player],
    concurrency: usize,
) -> Vec<RatedPlayer> {
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let results = fetch_bounded(ids, concurrency, |player| async move {
        provider.get_player_fixture_history(player).await
    })
    .await;

    players
        .iter()
        .zip(results)
        .map(|(player, result)| {
            let trimean = match result {
                Ok(history) => stats::weighted_trimean(&history.recent),
                Err(e) => {
                    warn!(player = player.id, error = %e, "history unavailable, trimean 0");
                    0.0
                }
            };
            RatedPlayer::new(player, trimean)
        })
        .collect()
}
