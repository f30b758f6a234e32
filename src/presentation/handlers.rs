// HTTP request handlers
use crate::application::chart_service::{ChartError, ChartRequest};
use crate::domain::tank::Tank;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub hours: Option<u32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub max_points: Option<usize>,
}

impl From<ChartQuery> for ChartRequest {
    fn from(query: ChartQuery) -> Self {
        Self {
            hours: query.hours,
            start: query.start,
            end: query.end,
            max_points: query.max_points,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

async fn respond<T: serde::Serialize>(status: StatusCode, data: &T, compress: bool) -> Response {
    match json_response(status, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// List all tanks
pub async fn list_tanks(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    match state.tank_service.list_tanks().await {
        Ok(tanks) => respond(StatusCode::OK, &tanks, compress).await,
        Err(e) => {
            tracing::error!("Error fetching tanks: {:#}", e);
            // Return empty list on error
            respond(StatusCode::OK, &Vec::<Tank>::new(), compress).await
        }
    }
}

/// Render one sensor chart for a tank
pub async fn get_chart(
    Path((tank_id, sensor_id)): Path<(String, String)>,
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    match state
        .chart_service
        .chart(&tank_id, &sensor_id, query.into())
        .await
    {
        Ok(chart) => respond(StatusCode::OK, &chart, compress).await,
        Err(e) => {
            let status = match &e {
                ChartError::UnknownSensor(_) => StatusCode::NOT_FOUND,
                ChartError::InvalidRange(_) | ChartError::InvalidBudget(_) => {
                    StatusCode::BAD_REQUEST
                }
                ChartError::Repository(_) => {
                    tracing::error!("Error rendering chart {}/{}: {:#}", tank_id, sensor_id, e);
                    StatusCode::BAD_GATEWAY
                }
            };
            respond(status, &json!({ "error": e.to_string() }), compress).await
        }
    }
}

/// Stream dashboard for a specific tank (progressive loading)
pub async fn stream_dashboard(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hours = query
        .hours
        .unwrap_or(state.chart_service.dashboard().chart.default_hours);
    let compress = accepts_brotli(&headers);

    match state.streaming_service.stream_dashboard(&id, hours).await {
        Ok(rx) => stream_from_receiver(rx, compress).await.into_response(),
        Err(e) => {
            let body = json!({ "error": e.to_string() });
            respond(StatusCode::BAD_REQUEST, &body, compress).await
        }
    }
}
