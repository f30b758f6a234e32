// Repository trait for sensor reading access
use crate::domain::reading::{Reading, TimeRange};
use async_trait::async_trait;

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// List all tank IDs that have reported readings
    async fn list_tank_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Sensor types with at least one reading for the tank within `range`
    async fn list_sensor_types(&self, tank_id: &str, range: TimeRange)
        -> anyhow::Result<Vec<String>>;

    /// Run a prepared query and return its readings in ascending time order
    async fn fetch_readings(&self, query: &str) -> anyhow::Result<Vec<Reading>>;
}
