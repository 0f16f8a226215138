// Data provider boundary.
//
// The engine never touches the network itself: every computation takes a
// `DataProvider` and receives plain model types. `fpl.rs` implements the
// trait against the public Fantasy Premier League API; tests supply an
// in-memory implementation.

pub mod fpl;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::future::Future;

use crate::model::{
    Bootstrap, Fixture, GameweekId, LiveStat, ManagerEntry, ManagerHistory, ManagerId, Pick,
    PlayerFixtureHistory, PlayerId,
};

/// Default bound on in-flight sub-fetches inside a fan-out. Keeps the
/// engine from overwhelming the upstream provider.
pub const FETCH_CONCURRENCY: usize = 5;

/// Abstract upstream data source.
///
/// Errors are `anyhow` at this boundary; the engine decides per call
/// site whether a failure is fatal or degrades to a default.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn get_bootstrap(&self) -> anyhow::Result<Bootstrap>;

    async fn get_league_standings(&self, league: u32) -> anyhow::Result<Vec<ManagerEntry>>;

    async fn get_manager_picks(
        &self,
        manager: ManagerId,
        gameweek: GameweekId,
    ) -> anyhow::Result<Pick>;

    async fn get_live_stats(&self, gameweek: GameweekId) -> anyhow::Result<Vec<LiveStat>>;

    async fn get_all_fixtures(&self) -> anyhow::Result<Vec<Fixture>>;

    async fn get_manager_history(&self, manager: ManagerId) -> anyhow::Result<ManagerHistory>;

    async fn get_player_fixture_history(
        &self,
        player: PlayerId,
    ) -> anyhow::Result<PlayerFixtureHistory>;
}

// ---------------------------------------------------------------------------
// Bounded fan-out
// ---------------------------------------------------------------------------

/// Run `fetch` over every item with at most `concurrency` requests in
/// flight, reassembling results in the original input order.
///
/// Failures are returned per item, never aborting the batch: the caller
/// chooses a safe default for each `Err`.
pub async fn fetch_bounded<T, U, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    fetch: F,
) -> Vec<anyhow::Result<U>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = anyhow::Result<U>>,
{
    stream::iter(items.into_iter().map(fetch))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
