// Quartile and trimean statistics.
//
// Tukey's trimean over fixture-difficulty-weighted recent scoring is the
// engine's primary player-quality signal: robust against a single
// outlier gameweek in a way a plain mean is not.

use crate::model::PlayerGwHistory;

/// Weight applied per point of opponent difficulty away from neutral (3).
const DIFFICULTY_WEIGHT_STEP: f64 = 0.1;

/// Maximum number of qualifying gameweeks considered for a player's
/// weighted trimean. Recency bias: stops season-opening noise from
/// dominating the signal.
const MAX_FORM_GAMEWEEKS: usize = 12;

// ---------------------------------------------------------------------------
// Quartiles
// ---------------------------------------------------------------------------

/// First, second (median), and third quartiles of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Median of an already-sorted slice: the middle element for odd length,
/// the average of the middle two for even length, 0.0 when empty.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Compute q1/q2/q3 of a sample. Total function: empty input yields all
/// zeros. Input order is irrelevant (sorting is internal).
///
/// The halves used for q1/q3 exclude the overall median element when the
/// length is odd, i.e. for `[1,2,3,4,5]` the lower half is `[1,2]`.
pub fn quartiles(values: &[f64]) -> Quartiles {
    if values.is_empty() {
        return Quartiles {
            q1: 0.0,
            q2: 0.0,
            q3: 0.0,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let q2 = median_sorted(&sorted);

    let half = n / 2;
    let lower = &sorted[..half];
    // Skip the median element itself when the length is odd.
    let upper = if n % 2 == 1 {
        &sorted[half + 1..]
    } else {
        &sorted[half..]
    };

    // A single-element sample has empty halves; collapse to the median.
    Quartiles {
        q1: if lower.is_empty() { q2 } else { median_sorted(lower) },
        q2,
        q3: if upper.is_empty() { q2 } else { median_sorted(upper) },
    }
}

/// Median of a sample; 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    median_sorted(&sorted)
}

/// Tukey's trimean: `(q1 + 2*q2 + q3) / 4`. 0.0 for empty input.
pub fn trimean(values: &[f64]) -> f64 {
    let q = quartiles(values);
    (q.q1 + 2.0 * q.q2 + q.q3) / 4.0
}

// ---------------------------------------------------------------------------
// Fixture-weighted trimean
// ---------------------------------------------------------------------------

/// Reweight one gameweek's points by the opponent difficulty faced:
/// `1 + (difficulty - 3) * 0.1`, neutral at 3. Rewards scoring against
/// strong opposition, discounts padding against weak opposition.
fn difficulty_weight(difficulty: u8) -> f64 {
    1.0 + (difficulty as f64 - 3.0) * DIFFICULTY_WEIGHT_STEP
}

/// Trimean of a player's recent fixture-weighted scores.
///
/// Only gameweeks actually played (minutes > 0) qualify, and only the
/// most recent 12 qualifying gameweeks are kept. `history` is expected
/// most-recent-last, as the provider delivers it.
pub fn weighted_trimean(history: &[PlayerGwHistory]) -> f64 {
    let mut played: Vec<&PlayerGwHistory> =
        history.iter().filter(|gw| gw.minutes > 0).collect();

    if played.len() > MAX_FORM_GAMEWEEKS {
        let skip = played.len() - MAX_FORM_GAMEWEEKS;
        played.drain(..skip);
    }

    let weighted: Vec<f64> = played
        .iter()
        .map(|gw| gw.points as f64 * difficulty_weight(gw.difficulty))
        .collect();

    trimean(&weighted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
