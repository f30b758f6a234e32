// Sensor reading domain models
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One timestamped sensor value.
///
/// Sequences of readings are ordered by `time` ascending. Spacing may be
/// uneven and duplicate timestamps are kept in their original order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl Reading {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("range end {end} is before start {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("{hours} hours before {end} is outside the representable time range")]
    OutOfBounds { end: DateTime<Utc>, hours: u32 },
}

/// A closed `[start, end]` time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// The last `hours` hours ending at `now`.
    pub fn trailing_hours(now: DateTime<Utc>, hours: u32) -> Result<Self, RangeError> {
        let start = TimeDelta::try_hours(i64::from(hours))
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or(RangeError::OutOfBounds { end: now, hours })?;
        Ok(Self { start, end: now })
    }

    /// Range spanned by the first and last reading, `None` for no data.
    pub fn covering(readings: &[Reading]) -> Option<Self> {
        let first = readings.first()?;
        let last = readings.last()?;
        // Input is time-ordered; max() guards against a caller that isn't.
        Some(Self {
            start: first.time,
            end: last.time.max(first.time),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}
