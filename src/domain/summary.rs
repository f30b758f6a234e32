// Summary statistics over a full reading sequence
use super::reading::Reading;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SummaryStats {
    /// Exact min, max and mean of `readings`. Empty input gives all zeros,
    /// which callers must not present as real data.
    pub fn summarize(readings: &[Reading]) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let (min, max, sum) = readings.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), r| (min.min(r.value), max.max(r.value), sum + r.value),
        );

        Self {
            min,
            max,
            avg: sum / readings.len() as f64,
        }
    }
}
