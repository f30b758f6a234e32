// Time-span granularity classification
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Coarse classification of a time span, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GranularityBucket {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl GranularityBucket {
    pub const ALL: [GranularityBucket; 6] = [
        GranularityBucket::Minutes,
        GranularityBucket::Hours,
        GranularityBucket::Days,
        GranularityBucket::Weeks,
        GranularityBucket::Months,
        GranularityBucket::Years,
    ];

    /// Classify the span between `start` and `end`.
    ///
    /// Breakpoints are inclusive upper bounds checked smallest first. A
    /// negative span (end before start) lands in `Minutes`.
    pub fn classify(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::for_span(end - start)
    }

    pub fn for_span(span: TimeDelta) -> Self {
        if span <= TimeDelta::minutes(120) {
            GranularityBucket::Minutes
        } else if span <= TimeDelta::hours(48) {
            GranularityBucket::Hours
        } else if span <= TimeDelta::days(14) {
            GranularityBucket::Days
        } else if span <= TimeDelta::days(90) {
            GranularityBucket::Weeks
        } else if span <= TimeDelta::days(730) {
            GranularityBucket::Months
        } else {
            GranularityBucket::Years
        }
    }
}
