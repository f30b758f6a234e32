// Chart service - Use case for rendering one sensor chart
use crate::application::pipeline::{ChartPipeline, SettingsError};
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::{RangeError, TimeRange};
use crate::domain::render::RenderModel;
use crate::domain::thresholds::ThresholdBand;
use crate::infrastructure::config::{
    escape_string_literal, prepare_query, DashboardConfig, SensorConfig,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown sensor: {0}")]
    UnknownSensor(String),
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),
    #[error("point budget must be at least 2, got {0}")]
    InvalidBudget(usize),
    #[error("failed to fetch readings: {0}")]
    Repository(#[source] anyhow::Error),
}

/// Caller-supplied chart window and budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRequest {
    pub hours: Option<u32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub max_points: Option<usize>,
}

/// Window to query plus the range handed to the pipeline, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartWindow {
    pub query: TimeRange,
    pub explicit: Option<TimeRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorChart {
    pub sensor_id: String,
    pub title: String,
    pub sensor_type: String,
    pub unit: Option<String>,
    pub color: Option<String>,
    pub thresholds: Option<ThresholdBand>,
    pub render: RenderModel,
}

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn ReadingRepository>,
    dashboard: Arc<DashboardConfig>,
    pipeline: ChartPipeline,
}

impl ChartService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        dashboard: DashboardConfig,
    ) -> Result<Self, SettingsError> {
        let pipeline = ChartPipeline::new(dashboard.chart.pipeline_settings()?)?;
        Ok(Self {
            repository,
            dashboard: Arc::new(dashboard),
            pipeline,
        })
    }

    pub fn dashboard(&self) -> &DashboardConfig {
        &self.dashboard
    }

    pub fn repository(&self) -> &Arc<dyn ReadingRepository> {
        &self.repository
    }

    /// Resolve the query window for a request at time `now`.
    ///
    /// `start`/`end` form an explicit range that also drives the axis. With
    /// only `hours` (or nothing) the last N hours are queried and the axis
    /// follows the data.
    pub fn resolve_window(
        &self,
        request: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartWindow, ChartError> {
        let hours = request
            .hours
            .unwrap_or(self.dashboard.chart.default_hours);
        match (request.start, request.end) {
            (Some(start), end) => {
                let range = TimeRange::new(start, end.unwrap_or(now))?;
                Ok(ChartWindow {
                    query: range,
                    explicit: Some(range),
                })
            }
            (None, Some(end)) => {
                let range = TimeRange::trailing_hours(end, hours)?;
                Ok(ChartWindow {
                    query: range,
                    explicit: Some(range),
                })
            }
            (None, None) => Ok(ChartWindow {
                query: TimeRange::trailing_hours(now, hours)?,
                explicit: None,
            }),
        }
    }

    pub async fn chart(
        &self,
        tank_id: &str,
        sensor_id: &str,
        request: ChartRequest,
    ) -> Result<SensorChart, ChartError> {
        let sensor = self
            .dashboard
            .sensor(sensor_id)
            .ok_or_else(|| ChartError::UnknownSensor(sensor_id.to_string()))?;
        let budget = request
            .max_points
            .unwrap_or(self.pipeline.settings().max_points);
        if budget < 2 {
            return Err(ChartError::InvalidBudget(budget));
        }
        let window = self.resolve_window(&request, Utc::now())?;

        self.render_sensor(tank_id, sensor, window, budget)
            .await
            .map_err(ChartError::Repository)
    }

    /// Fetch one sensor's readings and run them through the pipeline.
    pub async fn render_sensor(
        &self,
        tank_id: &str,
        sensor: &SensorConfig,
        window: ChartWindow,
        budget: usize,
    ) -> anyhow::Result<SensorChart> {
        let query = self.prepare_sensor_query(&sensor.query, tank_id, window.query);
        let readings = self.repository.fetch_readings(&query).await?;
        let thresholds = self.dashboard.threshold_for(&sensor.sensor_type).copied();

        tracing::debug!(
            "Rendering {} for tank {}: {} readings",
            sensor.id,
            tank_id,
            readings.len()
        );
        let render = self.pipeline.run_with_budget(
            &readings,
            thresholds.as_ref(),
            window.explicit,
            budget,
        );

        Ok(SensorChart {
            sensor_id: sensor.id.clone(),
            title: sensor.title.clone(),
            sensor_type: sensor.sensor_type.clone(),
            unit: sensor.unit.clone(),
            color: sensor.color.clone(),
            thresholds,
            render,
        })
    }

    pub fn default_budget(&self) -> usize {
        self.pipeline.settings().max_points
    }

    fn prepare_sensor_query(&self, query: &str, tank_id: &str, range: TimeRange) -> String {
        let mut vars = HashMap::new();
        vars.insert("tank".to_string(), escape_string_literal(tank_id));
        vars.insert(
            "start".to_string(),
            range.start().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        vars.insert(
            "end".to_string(),
            range.end().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        prepare_query(query, &vars)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::reading_repository::memory::MemoryRepository;
    use crate::domain::reading::Reading;
    use crate::domain::thresholds::Status;
    use chrono::{TimeDelta, TimeZone};

    pub(crate) fn dashboard() -> DashboardConfig {
        let mut cfg = DashboardConfig::default();
        cfg.thresholds.insert(
            "temperature".to_string(),
            ThresholdBand::new(20.0, 28.0).unwrap(),
        );
        cfg.sensors = vec![
            SensorConfig {
                id: "water_temp".to_string(),
                title: "Water Temperature".to_string(),
                sensor_type: "temperature".to_string(),
                unit: Some("°C".to_string()),
                color: Some("#0ea5e9".to_string()),
                query: "${tank}/temperature".to_string(),
            },
            SensorConfig {
                id: "ph".to_string(),
                title: "pH".to_string(),
                sensor_type: "ph".to_string(),
                unit: None,
                color: None,
                query: "${tank}/ph".to_string(),
            },
        ];
        cfg
    }

    pub(crate) fn hourly(count: usize, value: impl Fn(usize) -> f64) -> Vec<Reading> {
        let start = Utc::now() - TimeDelta::hours(count as i64);
        (0..count)
            .map(|i| Reading::new(start + TimeDelta::hours(i as i64), value(i)))
            .collect()
    }

    fn service(repo: MemoryRepository) -> ChartService {
        ChartService::new(Arc::new(repo), dashboard()).unwrap()
    }

    #[tokio::test]
    async fn test_chart_classifies_against_configured_band() {
        let repo = MemoryRepository::default().with_series(
            "Fish_Tank_A",
            "temperature",
            hourly(5, |i| [19.9, 24.0, 24.5, 28.1, 25.0][i]),
        );

        let chart = service(repo)
            .chart("Fish_Tank_A", "water_temp", ChartRequest::default())
            .await
            .unwrap();

        assert_eq!(chart.title, "Water Temperature");
        assert_eq!(chart.thresholds.unwrap().min(), 20.0);
        let model = chart.render.chart().unwrap();
        let statuses: Vec<Status> = model.points.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![Status::Low, Status::Optimal, Status::Optimal, Status::High, Status::Optimal]
        );
        assert_eq!(model.dominant_status, Status::Optimal);
    }

    #[tokio::test]
    async fn test_sensor_without_band_is_all_optimal() {
        let repo = MemoryRepository::default().with_series(
            "Fish_Tank_A",
            "ph",
            hourly(4, |i| 5.0 + i as f64),
        );

        let chart = service(repo)
            .chart("Fish_Tank_A", "ph", ChartRequest::default())
            .await
            .unwrap();
        assert!(chart.thresholds.is_none());
        let model = chart.render.chart().unwrap();
        assert!(model.points.iter().all(|p| p.status == Status::Optimal));
    }

    #[tokio::test]
    async fn test_no_readings_is_empty_state() {
        let chart = service(MemoryRepository::default())
            .chart("Fish_Tank_A", "water_temp", ChartRequest::default())
            .await
            .unwrap();
        assert!(chart.render.is_empty());
    }

    #[tokio::test]
    async fn test_request_budget_overrides_default() {
        let repo = MemoryRepository::default().with_series(
            "Fish_Tank_A",
            "temperature",
            hourly(400, |i| 24.0 + (i % 7) as f64 * 0.2),
        );
        let service = service(repo);

        let request = ChartRequest {
            max_points: Some(60),
            ..ChartRequest::default()
        };
        let chart = service.chart("Fish_Tank_A", "water_temp", request).await.unwrap();
        let model = chart.render.chart().unwrap();
        assert!(model.points.len() <= 60);
        assert_eq!(model.sampling.original_count, 400);

        let too_small = ChartRequest {
            max_points: Some(1),
            ..ChartRequest::default()
        };
        let err = service.chart("Fish_Tank_A", "water_temp", too_small).await.unwrap_err();
        assert!(matches!(err, ChartError::InvalidBudget(1)));
    }

    #[tokio::test]
    async fn test_unknown_sensor_and_repository_failure() {
        let err = service(MemoryRepository::default())
            .chart("Fish_Tank_A", "salinity", ChartRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::UnknownSensor(id) if id == "salinity"));

        let failing = MemoryRepository {
            fail: true,
            ..MemoryRepository::default()
        };
        let err = service(failing)
            .chart("Fish_Tank_A", "water_temp", ChartRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::Repository(_)));
    }

    #[test]
    fn test_resolve_window() {
        let service = service(MemoryRepository::default());
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();

        let window = service.resolve_window(&ChartRequest::default(), now).unwrap();
        assert_eq!(window.query.span(), TimeDelta::hours(6));
        assert!(window.explicit.is_none());

        let request = ChartRequest {
            start: Some(now - TimeDelta::days(10)),
            ..ChartRequest::default()
        };
        let window = service.resolve_window(&request, now).unwrap();
        assert_eq!(window.explicit, Some(window.query));
        assert_eq!(window.query.span(), TimeDelta::days(10));

        let reversed = ChartRequest {
            start: Some(now),
            end: Some(now - TimeDelta::hours(1)),
            ..ChartRequest::default()
        };
        assert!(matches!(
            service.resolve_window(&reversed, now),
            Err(ChartError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_resolve_window_rejects_unrepresentable_hours() {
        let service = service(MemoryRepository::default());
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();

        let trailing = ChartRequest {
            hours: Some(u32::MAX),
            ..ChartRequest::default()
        };
        assert!(matches!(
            service.resolve_window(&trailing, now),
            Err(ChartError::InvalidRange(RangeError::OutOfBounds { .. }))
        ));

        let ending = ChartRequest {
            end: Some(now),
            ..trailing
        };
        assert!(matches!(
            service.resolve_window(&ending, now),
            Err(ChartError::InvalidRange(RangeError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_prepare_sensor_query() {
        let service = service(MemoryRepository::default());
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, start + TimeDelta::hours(2)).unwrap();

        let query = service.prepare_sensor_query(
            "SELECT value FROM r WHERE tank='${tank}' AND time >= '${start}' AND time <= '${end}'",
            "Fish_Tank_A",
            range,
        );
        assert_eq!(
            query,
            "SELECT value FROM r WHERE tank='Fish_Tank_A' AND time >= '2025-08-01T00:00:00Z' AND time <= '2025-08-01T02:00:00Z'"
        );
    }

    #[test]
    fn test_prepare_sensor_query_escapes_tank_id() {
        let service = service(MemoryRepository::default());
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, start + TimeDelta::hours(2)).unwrap();

        let query = service.prepare_sensor_query(
            "SELECT value FROM r WHERE tank = '${tank}'",
            "x' OR tank =~ /.*/ OR tank = 'y",
            range,
        );
        assert_eq!(
            query,
            r"SELECT value FROM r WHERE tank = 'x\' OR tank =~ /.*/ OR tank = \'y'"
        );
    }
}
