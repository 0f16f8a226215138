// fpl-insight entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so report output on stdout stays clean)
// 2. Load config
// 3. Build the API provider
// 4. Dispatch the requested report

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use fpl_insight::config;
use fpl_insight::engine::fixtures::{rank_teams, GwWindow};
use fpl_insight::engine::{chips, ownership, squad, standings, transfers};
use fpl_insight::error::EngineError;
use fpl_insight::provider::fpl::FplApi;
use fpl_insight::provider::DataProvider;
use fpl_insight::report;

const USAGE: &str = "usage: fpli <standings|squad|transfers|chips|ownership|fixtures> [--json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let command = match args.iter().find(|a| !a.starts_with("--")) {
        Some(c) => c.clone(),
        None => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        league = config.league.league_id,
        entry = config.league.entry_id,
        "config loaded"
    );

    let api = FplApi::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )
    .context("failed to build API client")?;
    let concurrency = config.fanout.concurrency;

    let output = match command.as_str() {
        "standings" => {
            let rows =
                standings::build_live_standings(&api, config.league.league_id, concurrency)
                    .await?;
            if json {
                report::render_json(&rows)?
            } else {
                report::render_standings(&rows)
            }
        }
        "squad" => {
            let best = squad::best_squad(&api, concurrency).await?;
            if json {
                report::render_json(&best)?
            } else {
                report::render_squad(&best)
            }
        }
        "transfers" => {
            let suggestions =
                transfers::recommend_transfers(&api, config.league.entry_id, concurrency)
                    .await?;
            if json {
                report::render_json(&suggestions)?
            } else {
                report::render_transfers(&suggestions)
            }
        }
        "chips" => {
            let suggestions = chips::recommend_chips(&api, config.league.entry_id).await?;
            if json {
                report::render_json(&suggestions)?
            } else {
                report::render_chips(&suggestions)
            }
        }
        "ownership" => {
            let records =
                ownership::analyze_ownership(&api, config.league.league_id, concurrency).await?;
            if json {
                report::render_json(&records)?
            } else {
                report::render_ownership(&records)
            }
        }
        "fixtures" => render_fixture_ticker(&api, config.fixtures.ticker_window, json).await?,
        other => {
            eprintln!("unknown command `{other}`\n{USAGE}");
            std::process::exit(2);
        }
    };

    print!("{output}");
    Ok(())
}

async fn render_fixture_ticker(
    provider: &dyn DataProvider,
    ticker_window: u32,
    json: bool,
) -> anyhow::Result<String> {
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

    let window = GwWindow::new(current, ticker_window);
    let outlooks = rank_teams(&fixtures, &bootstrap.teams, window);
    if json {
        report::render_json(&outlooks)
    } else {
        Ok(report::render_fixture_ticker(&outlooks))
    }
}

/// Initialize tracing to stderr so stdout carries only report output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_insight=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
