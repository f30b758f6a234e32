// Render-ready chart model
use super::summary::SummaryStats;
use super::thresholds::{ClassifiedPoint, Status};
use super::ticks::AxisConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingInfo {
    pub original_count: usize,
    pub sampled_count: usize,
    pub sampled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub axis: AxisConfig,
    pub points: Vec<ClassifiedPoint>,
    pub dominant_status: Status,
    pub dominant_color: &'static str,
    /// Computed over every reading, not just the sampled ones.
    pub summary: SummaryStats,
    pub sampling: SamplingInfo,
}

/// Output of the chart pipeline.
///
/// `Empty` is its own state so that renderers never mistake the zeroed
/// default summary for real data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderModel {
    Empty,
    Chart(ChartModel),
}

impl RenderModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderModel::Empty)
    }

    pub fn chart(&self) -> Option<&ChartModel> {
        match self {
            RenderModel::Chart(chart) => Some(chart),
            RenderModel::Empty => None,
        }
    }
}
