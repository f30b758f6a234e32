//! Shape-preserving downsampling for chart series.
//!
//! Uniform-stride sampling hides spikes and dropouts. Instead the interior
//! of the series is split into one window per free output slot and each
//! window contributes its most locally varied reading, scored as
//! `|v[j] - v[j-1]| + |v[j] - v[j+1]|`. The first and last readings are
//! always kept.

use super::reading::Reading;
use std::collections::BTreeSet;

/// Fraction of the slot spacing each window extends to either side of its
/// target position.
pub const DEFAULT_WINDOW_PAD: f64 = 0.5;

/// Reduce `readings` to at most `max_points` readings.
///
/// Input at or under the budget is returned unchanged. A budget below two
/// is treated as two, since both endpoints are always kept.
pub fn sample(readings: &[Reading], max_points: usize) -> Vec<Reading> {
    sample_with_padding(readings, max_points, DEFAULT_WINDOW_PAD)
}

/// Same as [`sample`] with an explicit window padding ratio.
pub fn sample_with_padding(readings: &[Reading], max_points: usize, pad: f64) -> Vec<Reading> {
    let n = readings.len();
    let budget = max_points.max(2);
    if n <= max_points || n <= budget {
        return readings.to_vec();
    }

    // n > budget >= 2, so the interior [1, n - 2] is non-empty.
    let first_inner = 1;
    let last_inner = n - 2;
    let slots = budget - 2;

    let mut chosen = BTreeSet::from([0, n - 1]);
    if slots > 0 {
        let step = (n - 1) as f64 / (slots + 1) as f64;
        let half = step * pad.max(0.0);

        for slot in 1..=slots {
            let target = step * slot as f64;
            let start = if slot == 1 {
                first_inner
            } else {
                ((target - half).floor().max(0.0) as usize).max(first_inner)
            };
            let end = if slot == slots {
                last_inner
            } else {
                ((target + half).ceil() as usize).min(last_inner)
            };
            chosen.insert(most_varied(readings, start.min(end), end));
        }
    }

    // Index order is time order for time-ordered input, and keeps duplicate
    // timestamps in their original order.
    chosen.into_iter().map(|i| readings[i]).collect()
}

/// Local variation score at `j`. Missing neighbours compare to `j` itself.
fn variation(readings: &[Reading], j: usize) -> f64 {
    let value = readings[j].value;
    let prev = if j > 0 { readings[j - 1].value } else { value };
    let next = readings.get(j + 1).map_or(value, |r| r.value);
    (value - prev).abs() + (value - next).abs()
}

/// Index in `[start, end]` with the highest score; ties keep the earliest.
fn most_varied(readings: &[Reading], start: usize, end: usize) -> usize {
    let mut best = start;
    let mut best_score = variation(readings, start);
    for j in start + 1..=end {
        let score = variation(readings, j);
        if score > best_score {
            best = j;
            best_score = score;
        }
    }
    best
}
