// Auto-substitution simulation.
//
// Applies formation-valid bench substitutions to one manager's pick,
// given live minutes, and totals the resulting gameweek points. A single
// deterministic greedy pass in bench-slot order; it does not search for
// the point-maximising assignment.

use std::collections::HashMap;

use crate::model::{Chip, LiveStat, Pick, PlayerId, Position};

/// One slot of the post-substitution active squad. The multiplier stays
/// with the slot: a bench player subbed in scores at the multiplier of
/// the starter he replaced.
#[derive(Debug, Clone, Copy)]
pub struct ActiveSlot {
    pub player: PlayerId,
    pub multiplier: u8,
}

/// A substitution applied during the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub off: PlayerId,
    pub on: PlayerId,
}

/// The outcome of simulating one pick.
#[derive(Debug, Clone)]
pub struct SimulatedSquad {
    /// Final scoring squad: the 11 post-substitution slots, or all 15
    /// under bench boost.
    pub active: Vec<ActiveSlot>,
    pub substitutions: Vec<Substitution>,
    /// Gameweek points after substitution, before transfer cost.
    pub points: i32,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

fn minutes_of(live: &HashMap<PlayerId, LiveStat>, player: PlayerId) -> u32 {
    live.get(&player).map(|s| s.minutes).unwrap_or(0)
}

fn points_of(live: &HashMap<PlayerId, LiveStat>, player: PlayerId) -> i32 {
    live.get(&player).map(|s| s.total_points).unwrap_or(0)
}

/// A goalkeeper may only be replaced by another goalkeeper, and never
/// replaces an outfield player. Outfield players are interchangeable
/// regardless of original position. Players the bootstrap cannot resolve
/// are treated as outfield rather than blocking the substitution.
fn compatible(
    positions: &HashMap<PlayerId, Position>,
    starter: PlayerId,
    bench: PlayerId,
) -> bool {
    let starter_gk = positions.get(&starter) == Some(&Position::Goalkeeper);
    let bench_gk = positions.get(&bench) == Some(&Position::Goalkeeper);
    starter_gk == bench_gk
}

/// Run the substitution pass for one pick.
///
/// Under an active bench boost all 15 players score at their own
/// multiplier and no substitution logic runs. Otherwise each bench
/// player who actually played (minutes > 0) is considered in ascending
/// bench-slot order and replaces the first formation-compatible starter
/// with zero minutes; bench players with no valid slot are discarded.
pub fn simulate(
    pick: &Pick,
    live: &HashMap<PlayerId, LiveStat>,
    positions: &HashMap<PlayerId, Position>,
) -> SimulatedSquad {
    if pick.active_chip == Some(Chip::BenchBoost) {
        let active: Vec<ActiveSlot> = pick
            .slots
            .iter()
            .map(|s| ActiveSlot {
                player: s.player,
                multiplier: s.multiplier,
            })
            .collect();
        let points = total_points(&active, live);
        return SimulatedSquad {
            active,
            substitutions: Vec::new(),
            points,
        };
    }

    let mut active: Vec<ActiveSlot> = pick
        .starters()
        .map(|s| ActiveSlot {
            player: s.player,
            multiplier: s.multiplier,
        })
        .collect();

    let mut bench: Vec<_> = pick.bench().collect();
    bench.sort_by_key(|s| s.slot);

    let mut substitutions = Vec::new();

    for bench_slot in bench {
        if minutes_of(live, bench_slot.player) == 0 {
            continue;
        }
        let replaceable = active.iter().position(|slot| {
            minutes_of(live, slot.player) == 0
                && compatible(positions, slot.player, bench_slot.player)
        });
        if let Some(idx) = replaceable {
            substitutions.push(Substitution {
                off: active[idx].player,
                on: bench_slot.player,
            });
            // Multiplier stays with the slot being filled.
            active[idx].player = bench_slot.player;
        }
    }

    let points = total_points(&active, live);
    SimulatedSquad {
        active,
        substitutions,
        points,
    }
}

fn total_points(active: &[ActiveSlot], live: &HashMap<PlayerId, LiveStat>) -> i32 {
    active
        .iter()
        .map(|slot| points_of(live, slot.player) * slot.multiplier as i32)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PickSlot;

    /// Build a 15-man pick: slots 1-11 starters (slot 1 GK), 12-15 bench
    /// (slot 12 reserve GK). Captain in slot 3 at multiplier 2.
    fn standard_pick(chip: Option<Chip>) -> Pick {
        let slots = (1..=15u8)
            .map(|slot| PickSlot {
                player: slot as PlayerId,
                slot,
                multiplier: match slot {
                    3 => 2,
                    12..=15 => 0,
                    _ => 1,
                },
                is_captain: slot == 3,
                is_vice_captain: slot == 4,
            })
            .collect();
        Pick {
            manager: 1,
            gameweek: 10,
            slots,
            active_chip: chip,
            transfer_cost: 0,
            bank: 0,
        }
    }

    fn positions() -> HashMap<PlayerId, Position> {
        let mut map = HashMap::new();
        for id in 1..=15u32 {
            let pos = match id {
                1 | 12 => Position::Goalkeeper,
                2..=5 | 13 => Position::Defender,
                6..=9 | 14 => Position::Midfielder,
                _ => Position::Forward,
            };
            map.insert(id, pos);
        }
        map
    }

    fn live_all_played(points: i32) -> HashMap<PlayerId, LiveStat> {
        (1..=15u32)
            .map(|id| {
                (
                    id,
                    LiveStat {
                        player: id,
                        minutes: 90,
                        total_points: points,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn set(live: &mut HashMap<PlayerId, LiveStat>, id: PlayerId, minutes: u32, points: i32) {
        live.insert(
            id,
            LiveStat {
                player: id,
                minutes,
                total_points: points,
                ..Default::default()
            },
        );
    }

    #[test]
    fn no_substitution_when_all_starters_played() {
        let pick = standard_pick(None);
        let live = live_all_played(4);
        let sim = simulate(&pick, &live, &positions());
        assert!(sim.substitutions.is_empty());
        // 10 starters at x1 + captain at x2 = 12 shares of 4 points.
        assert_eq!(sim.points, 48);
    }

    #[test]
    fn goalkeeper_only_replaced_by_goalkeeper() {
        let pick = standard_pick(None);
        let mut live = live_all_played(2);
        // Starting GK (1) did not play; first bench outfielder (13) played.
        set(&mut live, 1, 0, 0);
        set(&mut live, 12, 60, 3);
        let sim = simulate(&pick, &live, &positions());
        // Bench order is 12,13,14,15; the reserve GK is first and valid.
        assert_eq!(sim.substitutions, vec![Substitution { off: 1, on: 12 }]);
    }

    #[test]
    fn outfield_bench_never_fills_goalkeeper_hole() {
        let pick = standard_pick(None);
        let mut live = live_all_played(2);
        set(&mut live, 1, 0, 0); // starting GK blank
        set(&mut live, 12, 0, 0); // reserve GK also blank
        let sim = simulate(&pick, &live, &positions());
        // Outfield bench players 13-15 all played but none may cover a GK.
        assert!(sim.substitutions.is_empty());
        assert!(sim.active.iter().any(|s| s.player == 1));
    }

    #[test]
    fn goalkeeper_bench_never_replaces_outfield_starter() {
        let pick = standard_pick(None);
        let mut live = live_all_played(2);
        set(&mut live, 5, 0, 0); // outfield starter blank
        set(&mut live, 13, 0, 0);
        set(&mut live, 14, 0, 0);
        set(&mut live, 15, 0, 0);
        // Only the reserve GK (12) played off the bench.
        let sim = simulate(&pick, &live, &positions());
        assert!(sim.substitutions.is_empty());
    }

    #[test]
    fn bench_processed_in_ascending_slot_order() {
        let pick = standard_pick(None);
        let mut live = live_all_played(2);
        set(&mut live, 7, 0, 0); // one outfield hole
        set(&mut live, 12, 0, 0); // reserve GK blank, skipped
        // Both 13 and 14 played; 13 has the lower bench slot and wins.
        let sim = simulate(&pick, &live, &positions());
        assert_eq!(sim.substitutions, vec![Substitution { off: 7, on: 13 }]);
    }

    #[test]
    fn substitute_inherits_replaced_slot_multiplier() {
        // GK starter with 0 minutes; the bench GK's 6 points come in at
        // the replaced slot's multiplier.
        let mut pick = standard_pick(None);
        // Make the starting GK the captain so the inherited multiplier is 2.
        for s in &mut pick.slots {
            s.is_captain = s.slot == 1;
            s.multiplier = match s.slot {
                1 => 2,
                12..=15 => 0,
                _ => 1,
            };
        }
        let mut live = live_all_played(0);
        set(&mut live, 1, 0, 0);
        set(&mut live, 12, 60, 6);
        let sim = simulate(&pick, &live, &positions());
        assert_eq!(sim.substitutions, vec![Substitution { off: 1, on: 12 }]);
        assert_eq!(sim.points, 12);
    }

    #[test]
    fn bench_boost_counts_all_fifteen_at_pick_multiplier() {
        let mut pick = standard_pick(Some(Chip::BenchBoost));
        // Under bench boost the provider sets bench multipliers to 1.
        for s in &mut pick.slots {
            if s.multiplier == 0 {
                s.multiplier = 1;
            }
        }
        let mut live = live_all_played(3);
        // A blank starter stays in the squad under bench boost.
        set(&mut live, 8, 0, 0);
        let sim = simulate(&pick, &live, &positions());
        assert!(sim.substitutions.is_empty());
        assert_eq!(sim.active.len(), 15);
        // 13 players x 3 points + captain x2 (3 more) + one blank = 45.
        assert_eq!(sim.points, 45);
    }

    #[test]
    fn missing_live_stats_count_as_zero_minutes() {
        let pick = standard_pick(None);
        let mut live = live_all_played(2);
        live.remove(&9); // no live row: did not play
        set(&mut live, 12, 0, 0);
        let sim = simulate(&pick, &live, &positions());
        assert_eq!(sim.substitutions, vec![Substitution { off: 9, on: 13 }]);
    }
}
