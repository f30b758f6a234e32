// Chart pipeline - Shapes raw readings into a render model
use crate::domain::granularity::GranularityBucket;
use crate::domain::reading::{Reading, TimeRange};
use crate::domain::render::{ChartModel, RenderModel, SamplingInfo};
use crate::domain::sampler;
use crate::domain::summary::SummaryStats;
use crate::domain::thresholds::{classify_series, dominant_status, ThresholdBand};
use crate::domain::ticks::{AxisConfig, TickFormat};
use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

pub const DEFAULT_MAX_POINTS: usize = 150;
pub const DEFAULT_SAMPLING_FLOOR: usize = 50;
pub const DEFAULT_TARGET_TICKS: usize = 8;
pub const MAX_TARGET_TICKS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("max_points must be at least 2, got {0}")]
    PointBudgetTooSmall(usize),
    #[error("target_ticks must be at least 1")]
    NoTicks,
    #[error("target_ticks must be at most {max}, got {0}", max = MAX_TARGET_TICKS)]
    TooManyTicks(usize),
    #[error("display offset of {0} minutes is out of range")]
    BadOffset(i32),
}

/// Tunable pipeline constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Point budget for a rendered series.
    pub max_points: usize,
    /// Series at or below this length are never sampled.
    pub sampling_floor: usize,
    pub target_ticks: usize,
    /// Timezone tick labels are rendered in.
    pub display_offset: FixedOffset,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            sampling_floor: DEFAULT_SAMPLING_FLOOR,
            target_ticks: DEFAULT_TARGET_TICKS,
            display_offset: Utc.fix(),
        }
    }
}

impl PipelineSettings {
    pub fn with_offset_minutes(mut self, minutes: i32) -> Result<Self, SettingsError> {
        self.display_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::BadOffset(minutes))?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_points < 2 {
            return Err(SettingsError::PointBudgetTooSmall(self.max_points));
        }
        if self.target_ticks == 0 {
            return Err(SettingsError::NoTicks);
        }
        if self.target_ticks > MAX_TARGET_TICKS {
            return Err(SettingsError::TooManyTicks(self.target_ticks));
        }
        Ok(())
    }
}

/// Composes range classification, tick selection, sampling, threshold
/// classification and summary into one [`RenderModel`].
///
/// Stateless apart from its settings: identical inputs always give
/// identical output.
#[derive(Debug, Clone)]
pub struct ChartPipeline {
    settings: PipelineSettings,
}

impl ChartPipeline {
    pub fn new(settings: PipelineSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run(
        &self,
        readings: &[Reading],
        thresholds: Option<&ThresholdBand>,
        explicit_range: Option<TimeRange>,
    ) -> RenderModel {
        self.run_with_budget(readings, thresholds, explicit_range, self.settings.max_points)
    }

    /// Run with a caller-chosen point budget instead of the configured one.
    pub fn run_with_budget(
        &self,
        readings: &[Reading],
        thresholds: Option<&ThresholdBand>,
        explicit_range: Option<TimeRange>,
        max_points: usize,
    ) -> RenderModel {
        if readings.is_empty() {
            return RenderModel::Empty;
        }
        let Some(range) = explicit_range.or_else(|| TimeRange::covering(readings)) else {
            return RenderModel::Empty;
        };

        let bucket = GranularityBucket::classify(range.start(), range.end());
        let format = TickFormat::select(bucket, self.settings.display_offset);
        let axis = AxisConfig::build(range, format, self.settings.target_ticks);

        let should_sample =
            readings.len() > max_points && readings.len() > self.settings.sampling_floor;
        let sampled = if should_sample {
            sampler::sample(readings, max_points)
        } else {
            readings.to_vec()
        };
        tracing::debug!(
            "Chart pipeline: bucket={:?}, {} readings -> {} points (budget {})",
            bucket,
            readings.len(),
            sampled.len(),
            max_points
        );

        let points = classify_series(&sampled, thresholds);
        let dominant = dominant_status(&points);

        RenderModel::Chart(ChartModel {
            axis,
            dominant_status: dominant,
            dominant_color: dominant.color(),
            summary: SummaryStats::summarize(readings),
            sampling: SamplingInfo {
                original_count: readings.len(),
                sampled_count: points.len(),
                sampled: should_sample,
            },
            points,
        })
    }
}
