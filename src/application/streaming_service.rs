// Streaming dashboard service - Progressive loading with chunked JSON frames
use crate::application::chart_service::{ChartService, ChartWindow, SensorChart};
use crate::domain::reading::{RangeError, TimeRange};
use crate::domain::tank::Tank;
use crate::infrastructure::config::SensorConfig;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub sensor_type: String,
    pub unit: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSkeleton {
    pub tank: Tank,
    pub hours: u32,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEvent {
    pub total_widgets: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    ChartUpdate(SensorChart),
    Complete(CompletionEvent),
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    charts: ChartService,
}

impl StreamingDashboardService {
    pub fn new(charts: ChartService) -> Self {
        Self { charts }
    }

    pub async fn stream_dashboard(
        &self,
        tank_id: &str,
        hours: u32,
    ) -> Result<mpsc::Receiver<StreamMessage>, RangeError> {
        let range = TimeRange::trailing_hours(Utc::now(), hours)?;
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();

        // 0. Sensor types with data in the selected window
        let available: HashSet<String> = match self
            .charts
            .repository()
            .list_sensor_types(tank_id, range)
            .await
        {
            Ok(types) => types.into_iter().collect(),
            Err(e) => {
                tracing::warn!("Could not list sensor types for {}: {:#}", tank_id, e);
                HashSet::new()
            }
        };
        tracing::debug!(
            "Available sensor types for {}: {} types",
            tank_id,
            available.len()
        );

        let sensors: Vec<SensorConfig> = self
            .charts
            .dashboard()
            .sensors
            .iter()
            .filter(|s| available.contains(&s.sensor_type))
            .cloned()
            .collect();

        // 1. Send skeleton immediately
        let skeleton = DashboardSkeleton {
            tank: Tank::new(tank_id.to_string()),
            hours,
            charts: sensors.iter().map(skeleton_for).collect(),
        };
        let total_widgets = skeleton.charts.len();
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        // 2. One task per chart
        let window = ChartWindow {
            query: range,
            explicit: None,
        };
        let budget = self.charts.default_budget();
        let mut tasks = Vec::with_capacity(sensors.len());
        for sensor in sensors {
            let tx = tx.clone();
            let charts = self.charts.clone();
            let tank_id = tank_id.to_string();

            tasks.push(tokio::spawn(async move {
                match charts.render_sensor(&tank_id, &sensor, window, budget).await {
                    Ok(chart) if !chart.render.is_empty() => {
                        let _ = tx.send(StreamMessage::ChartUpdate(chart)).await;
                    }
                    Ok(_) => {
                        tracing::debug!("No readings for {} on {}", sensor.id, tank_id);
                    }
                    Err(e) => {
                        tracing::error!("Error rendering {} for {}: {:#}", sensor.id, tank_id, e);
                    }
                }
            }));
        }

        // 3. Completion once every chart task has finished
        tokio::spawn(async move {
            for result in join_all(tasks).await {
                if let Err(e) = result {
                    tracing::error!("Chart task failed: {}", e);
                }
            }
            let complete = CompletionEvent {
                total_widgets,
                duration_ms: start_time.elapsed().as_millis() as u64,
            };
            let _ = tx.send(StreamMessage::Complete(complete)).await;
        });

        Ok(rx)
    }
}

fn skeleton_for(sensor: &SensorConfig) -> ChartSkeleton {
    ChartSkeleton {
        id: sensor.id.clone(),
        title: sensor.title.clone(),
        sensor_type: sensor.sensor_type.clone(),
        unit: sensor.unit.clone(),
        color: sensor.color.clone(),
    }
}
