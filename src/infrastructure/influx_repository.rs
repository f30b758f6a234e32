// InfluxDB repository implementation
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::{Reading, TimeRange};
use crate::infrastructure::config::escape_string_literal;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

const MEASUREMENT: &str = "sensor_reading";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    tags: Option<std::collections::HashMap<String, String>>,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, database: String, retention_policy: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

/// InfluxQL string literal escaping for tag values.
fn tag_values(response: &InfluxQLResponse) -> Vec<String> {
    let mut values = Vec::new();
    if let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) {
        for s in series {
            let value_idx = s.columns.iter().position(|c| c == "value").unwrap_or(1);
            for row in &s.values {
                if let Some(value) = row.get(value_idx).and_then(|v| v.as_str()) {
                    values.push(value.to_string());
                }
            }
        }
    }
    values
}

fn series_tags(response: &InfluxQLResponse, tag: &str) -> Vec<String> {
    let mut values = Vec::new();
    if let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) {
        for s in series {
            if let Some(value) = s.tags.as_ref().and_then(|t| t.get(tag)) {
                values.push(value.clone());
            }
        }
    }
    values
}

/// Readings from every series in the response, ordered by time.
fn readings_from(response: &InfluxQLResponse) -> Vec<Reading> {
    let mut readings = Vec::new();
    if let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) {
        for s in series {
            let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
            let value_idx = s.columns.iter().position(|c| c == "value").unwrap_or(1);

            for row in &s.values {
                let time = row.get(time_idx).and_then(|v| v.as_str());
                let value = row.get(value_idx).and_then(|v| v.as_f64());
                if let (Some(time), Some(value)) = (time, value) {
                    match chrono::DateTime::parse_from_rfc3339(time) {
                        Ok(time) => readings.push(Reading::new(time.with_timezone(&Utc), value)),
                        Err(e) => tracing::warn!("Skipping row with bad time {:?}: {}", time, e),
                    }
                }
            }
        }
    }
    // Stable: equal timestamps keep their row order
    readings.sort_by_key(|r| r.time);
    readings
}

#[async_trait]
impl ReadingRepository for InfluxRepository {
    async fn list_tank_ids(&self) -> Result<Vec<String>> {
        let query = format!("SHOW TAG VALUES FROM {} WITH KEY = tank", MEASUREMENT);
        let response = self.execute_query(&query).await?;
        Ok(tag_values(&response))
    }

    async fn list_sensor_types(&self, tank_id: &str, range: TimeRange) -> Result<Vec<String>> {
        // A field must be selected; the sensor_type tag comes back via GROUP BY
        let query = format!(
            "SELECT value FROM {} WHERE tank = '{}' AND time >= '{}' AND time <= '{}' GROUP BY sensor_type LIMIT 1",
            MEASUREMENT,
            escape_string_literal(tank_id),
            range.start().to_rfc3339_opts(SecondsFormat::Secs, true),
            range.end().to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        tracing::debug!("Executing sensor type query: {}", query);
        let response = self.execute_query(&query).await?;
        let types = series_tags(&response, "sensor_type");

        tracing::debug!("Found {} sensor types for tank {}", types.len(), tank_id);
        Ok(types)
    }

    async fn fetch_readings(&self, query: &str) -> Result<Vec<Reading>> {
        let response = self.execute_query(query).await?;
        Ok(readings_from(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> InfluxQLResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_readings_are_parsed_and_ordered() {
        let body = response(
            r#"{"results":[{"series":[
                {"name":"sensor_reading","columns":["time","value"],
                 "values":[["2025-06-01T00:02:00Z",24.5],["2025-06-01T00:00:00Z",24.1],
                           ["not-a-time",1.0],["2025-06-01T00:01:00Z",null]]}
            ]}]}"#,
        );

        let readings = readings_from(&body);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value, 24.1);
        assert_eq!(readings[1].value, 24.5);
        assert!(readings[0].time < readings[1].time);
    }

    #[test]
    fn test_tag_extraction() {
        let tanks = response(
            r#"{"results":[{"series":[{"name":"sensor_reading","columns":["key","value"],
                "values":[["tank","Fish_Tank_A"],["tank","Grow_Bed_1_"]]}]}]}"#,
        );
        assert_eq!(tag_values(&tanks), vec!["Fish_Tank_A", "Grow_Bed_1_"]);

        let types = response(
            r#"{"results":[{"series":[
                {"name":"sensor_reading","tags":{"sensor_type":"ph"},"columns":["time","value"],"values":[]},
                {"name":"sensor_reading","tags":{"sensor_type":"temperature"},"columns":["time","value"],"values":[]}
            ]}]}"#,
        );
        assert_eq!(series_tags(&types, "sensor_type"), vec!["ph", "temperature"]);
    }

    #[test]
    fn test_empty_result() {
        let body = response(r#"{"results":[{"statement_id":0}]}"#);
        assert!(readings_from(&body).is_empty());
        assert!(tag_values(&body).is_empty());
    }

    #[test]
    fn test_query_url() {
        let repo = InfluxRepository::new(
            "http://influx:8086/".to_string(),
            "secret".to_string(),
            "aquaponics".to_string(),
            "autogen".to_string(),
        );
        let url = repo.build_query_url("SHOW TAG VALUES");
        assert_eq!(
            url,
            "http://influx:8086/query?db=aquaponics&rp=autogen&q=SHOW%20TAG%20VALUES"
        );
    }
}
