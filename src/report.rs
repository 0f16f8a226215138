// Plain-text report rendering for the CLI commands.
//
// Each renderer takes an engine result and returns a finished multi-line
// string; the binary just prints it. Column widths are fixed, not
// measured, so the output stays stable across runs.

use std::fmt::Write;

use serde::Serialize;

use crate::engine::chips::ChipSuggestion;
use crate::engine::fixtures::TeamOutlook;
use crate::engine::ownership::OwnershipRecord;
use crate::engine::squad::BestSquad;
use crate::engine::standings::LiveScore;
use crate::engine::transfers::TransferSuggestion;

/// Machine-readable rendering for the `--json` flag: any engine output
/// pretty-printed as JSON, newline-terminated.
pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Cost in tenths of £1.0m, rendered as "12.5".
fn money(tenths: u32) -> String {
    format!("{}.{}", tenths / 10, tenths % 10)
}

fn rank_delta(delta: i64) -> String {
    match delta {
        0 => "=".to_string(),
        d if d > 0 => format!("+{d}"),
        d => d.to_string(),
    }
}

pub fn render_standings(rows: &[LiveScore]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{:<4} {:<5} {:<24} {:<24} {:>6} {:>7}  {}",
        "Rank", "Move", "Manager", "Team", "GW", "Total", "Captain"
    )
    .ok();
    for row in rows {
        let captain = row
            .captain
            .as_ref()
            .map(|c| {
                let played = if c.played { "" } else { " (yet to play)" };
                format!("{} x{}{}", c.name, c.multiplier, played)
            })
            .unwrap_or_else(|| "-".to_string());
        let chip = row
            .active_chip
            .map(|c| format!(" [{}]", c.label()))
            .unwrap_or_default();
        writeln!(
            out,
            "{:<4} {:<5} {:<24} {:<24} {:>6} {:>7}  {}{}",
            row.live_rank,
            rank_delta(row.rank_delta),
            row.manager_name,
            row.team_name,
            row.live_points,
            row.live_total,
            captain,
            chip,
        )
        .ok();
    }
    out
}

pub fn render_squad(best: &BestSquad) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Best XI ({}, trimean {:.1})",
        best.formation.label(),
        best.starting_trimean
    )
    .ok();
    for player in &best.starting_xi {
        writeln!(
            out,
            "  {:<4} {:<24} £{:>5}m  trimean {:.2}",
            player.position.code(),
            player.name,
            money(player.cost),
            player.trimean,
        )
        .ok();
    }
    writeln!(out, "Bench:").ok();
    let mut bench: Vec<_> = best
        .squad
        .iter()
        .filter(|p| !best.starting_xi.iter().any(|s| s.id == p.id))
        .collect();
    bench.sort_by_key(|p| p.position.sort_order());
    for player in bench {
        writeln!(
            out,
            "  {:<4} {:<24} £{:>5}m  trimean {:.2}",
            player.position.code(),
            player.name,
            money(player.cost),
            player.trimean,
        )
        .ok();
    }
    out
}

pub fn render_transfers(suggestions: &[TransferSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No transfers worth making this week.\n".to_string();
    }
    let mut out = String::new();
    for (idx, s) in suggestions.iter().enumerate() {
        writeln!(
            out,
            "{}. OUT {:<24} IN {:<24} score {:.2}",
            idx + 1,
            s.out_name,
            s.in_name,
            s.effectiveness,
        )
        .ok();
        writeln!(out, "   {}", s.rationale).ok();
    }
    out
}

pub fn render_chips(suggestions: &[ChipSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No chip worth playing in the next ten gameweeks.\n".to_string();
    }
    let mut out = String::new();
    for s in suggestions {
        writeln!(
            out,
            "{:<15} GW{:<3} score {:>2}/10  {}",
            s.chip.label(),
            s.gameweek,
            s.score,
            s.rationale,
        )
        .ok();
    }
    out
}

pub fn render_ownership(records: &[OwnershipRecord]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{:<24} {:<4} {:>7} {:>9}  {}",
        "Player", "Pos", "Owned", "Captained", "Tier"
    )
    .ok();
    for record in records {
        writeln!(
            out,
            "{:<24} {:<4} {:>6.1}% {:>9}  {}",
            record.name,
            record.position.code(),
            record.ownership_percent,
            record.captain_count,
            record.tier.label(),
        )
        .ok();
    }
    out
}

pub fn render_fixture_ticker(outlooks: &[TeamOutlook]) -> String {
    let mut out = String::new();
    writeln!(out, "{:<20} {:>7}  Fixtures", "Team", "Avg FDR").ok();
    for outlook in outlooks {
        let fixtures: Vec<String> = outlook
            .fixtures
            .iter()
            .map(|f| {
                let venue = if f.home { "H" } else { "A" };
                format!("GW{} {}{} ({})", f.gameweek, venue, f.opponent, f.difficulty)
            })
            .collect();
        writeln!(
            out,
            "{:<20} {:>7.2}  {}",
            outlook.team_name,
            outlook.average_difficulty,
            fixtures.join(", "),
        )
        .ok();
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
