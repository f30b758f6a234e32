// Axis tick formatting and spacing
use super::granularity::GranularityBucket;
use super::reading::TimeRange;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::Serialize;

/// How much of a timestamp a tick label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRule {
    TimeWithSeconds,
    Time,
    DayAndTime,
    WeekdayAndDay,
    Day,
    Date,
}

impl LabelRule {
    /// strftime pattern understood by `chrono`.
    pub fn pattern(&self) -> &'static str {
        match self {
            LabelRule::TimeWithSeconds => "%H:%M:%S",
            LabelRule::Time => "%H:%M",
            LabelRule::DayAndTime => "%b %d %H:%M",
            LabelRule::WeekdayAndDay => "%a %b %d",
            LabelRule::Day => "%b %d",
            LabelRule::Date => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickUnit {
    Minute,
    Hour,
    Day,
    Week,
    /// Calendar months approximated as 30 days.
    Month,
}

impl TickUnit {
    pub fn length(&self) -> TimeDelta {
        match self {
            TickUnit::Minute => TimeDelta::minutes(1),
            TickUnit::Hour => TimeDelta::hours(1),
            TickUnit::Day => TimeDelta::days(1),
            TickUnit::Week => TimeDelta::weeks(1),
            TickUnit::Month => TimeDelta::days(30),
        }
    }
}

/// Label rule and minimum tick spacing for one granularity bucket.
///
/// Holds no data besides the lookup result and the display offset the
/// labels are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickFormat {
    pub bucket: GranularityBucket,
    pub rule: LabelRule,
    pub unit: TickUnit,
    /// Minimum number of `unit`s between two rendered ticks.
    pub min_spacing: u32,
    pub offset: FixedOffset,
}

impl TickFormat {
    pub fn select(bucket: GranularityBucket, offset: FixedOffset) -> Self {
        let (rule, unit, min_spacing) = match bucket {
            GranularityBucket::Minutes => (LabelRule::TimeWithSeconds, TickUnit::Minute, 1),
            GranularityBucket::Hours => (LabelRule::Time, TickUnit::Hour, 1),
            GranularityBucket::Days => (LabelRule::DayAndTime, TickUnit::Hour, 6),
            GranularityBucket::Weeks => (LabelRule::WeekdayAndDay, TickUnit::Day, 1),
            GranularityBucket::Months => (LabelRule::Day, TickUnit::Week, 1),
            GranularityBucket::Years => (LabelRule::Date, TickUnit::Month, 1),
        };
        Self {
            bucket,
            rule,
            unit,
            min_spacing,
            offset,
        }
    }

    pub fn label(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.offset)
            .format(self.rule.pattern())
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub label: String,
}

/// Render-ready x-axis description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisConfig {
    pub bucket: GranularityBucket,
    pub label_rule: LabelRule,
    pub label_pattern: &'static str,
    pub utc_offset_seconds: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub tick_unit: TickUnit,
    /// Number of `tick_unit`s between consecutive ticks.
    pub tick_step: u32,
    pub tick_interval_ms: i64,
    pub ticks: Vec<Tick>,
}

impl AxisConfig {
    /// Lay out ticks across `range`, widening the step beyond the format's
    /// minimum until no more than `target_ticks` (at least two) fit.
    pub fn build(range: TimeRange, format: TickFormat, target_ticks: usize) -> Self {
        let unit_ms = format.unit.length().num_milliseconds();
        let span_ms = range.span().num_milliseconds().max(0);
        let gaps = i64::try_from(target_ticks.saturating_sub(1).max(1)).unwrap_or(i64::MAX);

        let per_step = unit_ms.saturating_mul(gaps);
        let needed = span_ms / per_step + i64::from(span_ms % per_step != 0);
        let tick_step = u32::try_from(needed)
            .unwrap_or(u32::MAX)
            .max(format.min_spacing)
            .max(1);
        let tick_interval_ms = unit_ms.saturating_mul(i64::from(tick_step));

        let count = span_ms / tick_interval_ms + 1;
        let ticks = (0..count)
            .map(|k| {
                let time = range.start() + TimeDelta::milliseconds(k * tick_interval_ms);
                Tick {
                    time,
                    label: format.label(time),
                }
            })
            .collect();

        Self {
            bucket: format.bucket,
            label_rule: format.rule,
            label_pattern: format.rule.pattern(),
            utc_offset_seconds: format.offset.local_minus_utc(),
            start: range.start(),
            end: range.end(),
            tick_unit: format.unit,
            tick_step,
            tick_interval_ms,
            ticks,
        }
    }
}
