use crate::application::pipeline::{PipelineSettings, SettingsError};
use crate::domain::thresholds::ThresholdBand;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    /// Acceptable band per sensor type, e.g. `temperature` or `ph`.
    #[serde(default)]
    pub thresholds: HashMap<String, ThresholdBand>,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub max_points: usize,
    pub sampling_floor: usize,
    pub target_ticks: usize,
    pub display_utc_offset_minutes: i32,
    pub default_hours: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let pipeline = PipelineSettings::default();
        Self {
            max_points: pipeline.max_points,
            sampling_floor: pipeline.sampling_floor,
            target_ticks: pipeline.target_ticks,
            display_utc_offset_minutes: 0,
            default_hours: 6,
        }
    }
}

impl ChartSettings {
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, SettingsError> {
        let settings = PipelineSettings {
            max_points: self.max_points,
            sampling_floor: self.sampling_floor,
            target_ticks: self.target_ticks,
            ..PipelineSettings::default()
        }
        .with_offset_minutes(self.display_utc_offset_minutes)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// One chart widget on the tank dashboard.
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    pub id: String,
    pub title: String,
    pub sensor_type: String,
    pub unit: Option<String>,
    pub color: Option<String>,
    /// InfluxQL template with `${tank}`, `${start}` and `${end}` placeholders.
    pub query: String,
}

impl DashboardConfig {
    pub fn sensor(&self, id: &str) -> Option<&SensorConfig> {
        self.sensors.iter().find(|s| s.id == id)
    }

    pub fn threshold_for(&self, sensor_type: &str) -> Option<&ThresholdBand> {
        self.thresholds.get(sensor_type)
    }
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .add_source(config::Environment::with_prefix("AQUA").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("AQUA").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Escape a value for use inside a single-quoted InfluxQL string literal
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
