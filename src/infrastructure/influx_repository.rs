// InfluxDB repository implementation
use crate::application::session_repository::SessionRepository;
use crate::domain::efficiency::EfficiencyProfile;
use crate::domain::snapshot::{SessionMetadata, TelemetrySnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

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
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
    #[serde(default)]
    tags: Option<std::collections::HashMap<String, String>>,
}

impl InfluxQLResponse {
    fn series(&self) -> impl Iterator<Item = &InfluxQLSeries> {
        self.results
            .first()
            .and_then(|r| r.series.as_ref())
            .into_iter()
            .flatten()
    }
}

impl InfluxQLSeries {
    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
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
        format!(
            "{}/query?db={}&rp={}&epoch=ms&q={}",
            self.host,
            self.database,
            self.retention_policy,
            urlencoding::encode(query)
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing InfluxQL query: {}", query);

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

        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            anyhow::bail!("InfluxDB query error: {}", error);
        }

        Ok(data)
    }
}

/// Escape a value for use inside a single-quoted InfluxQL string
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Quote an identifier so reserved words like `name` are safe to select
fn identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\\\""))
}

fn metadata_query(session_id: &str, owner_id: &str) -> String {
    format!(
        "SELECT \"start_date\", \"end_date\", \"interval_seconds\" FROM \"sessions\" \
         WHERE \"session_id\" = {} AND \"owner_id\" = {} LIMIT 1",
        quote(session_id),
        quote(owner_id)
    )
}

fn snapshots_query(session_id: &str, projection: &[&str]) -> String {
    let fields: Vec<String> = projection.iter().map(|f| identifier(f)).collect();
    format!(
        "SELECT {} FROM \"snapshots\" WHERE \"session_id\" = {} ORDER BY time ASC",
        fields.join(", "),
        quote(session_id)
    )
}

fn efficiency_query(owner_id: &str) -> String {
    format!(
        "SELECT mean(\"wh_per_mile\") AS \"wh_per_mile\" FROM \"efficiency\" \
         WHERE \"owner_id\" = {} GROUP BY \"software_version\"",
        quote(owner_id)
    )
}

/// Epoch milliseconds from either an integer column or an RFC 3339 string
fn parse_time(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.timestamp_millis()),
        _ => None,
    }
}

fn parse_snapshot(columns: &[String], row: &[Value]) -> TelemetrySnapshot {
    let mut snapshot = TelemetrySnapshot::default();

    for (column, value) in columns.iter().zip(row) {
        let number = value.as_f64();
        let text = value.as_str().map(str::to_string);
        match column.as_str() {
            "time" => snapshot.timestamp = parse_time(value),
            "speed" => snapshot.speed = number,
            "power" => snapshot.power = number,
            "odometer" => snapshot.odometer = number,
            "battery_level" => snapshot.battery_level = number,
            "usable_battery_level" => snapshot.usable_battery_level = number,
            "battery_range" => snapshot.battery_range = number,
            "charge_energy_added" => snapshot.charge_energy_added = number,
            "charge_miles_added_rated" => snapshot.charge_miles_added_rated = number,
            "charge_miles_added_ideal" => snapshot.charge_miles_added_ideal = number,
            "charger_power" => snapshot.charger_power = number,
            "fast_charger_type" => snapshot.fast_charger_type = text,
            "outside_temp" => snapshot.outside_temp = number,
            "inside_temp" => snapshot.inside_temp = number,
            "latitude" => snapshot.latitude = number,
            "longitude" => snapshot.longitude = number,
            "heading" => snapshot.heading = number,
            "software_version" => snapshot.software_version = text,
            _ => {}
        }
    }

    snapshot
}

fn parse_metadata(series: &InfluxQLSeries) -> Option<SessionMetadata> {
    let row = series.values.first()?;
    let field = |name: &str| series.column(name).and_then(|idx| row.get(idx));

    let start_date = field("start_date").and_then(parse_time)?;
    let end_date = field("end_date").and_then(parse_time)?;
    let interval_seconds = field("interval_seconds")
        .and_then(Value::as_f64)
        .map(|s| s.max(0.0) as u32)
        .unwrap_or(0);

    Some(SessionMetadata::new(start_date, end_date, interval_seconds))
}

fn parse_profile(response: &InfluxQLResponse) -> EfficiencyProfile {
    response
        .series()
        .filter_map(|series| {
            let version = series.tags.as_ref()?.get("software_version")?.clone();
            let idx = series.column("wh_per_mile")?;
            let average = series.values.first()?.get(idx)?.as_f64()?;
            Some((version, average))
        })
        .collect()
}

#[async_trait]
impl SessionRepository for InfluxRepository {
    async fn fetch_session_metadata(
        &self,
        session_id: &str,
        owner_id: &str,
    ) -> Result<Option<SessionMetadata>> {
        let response = self.execute_query(&metadata_query(session_id, owner_id)).await?;
        Ok(response.series().find_map(parse_metadata))
    }

    async fn fetch_ordered_snapshots(
        &self,
        session_id: &str,
        projection: &[&str],
    ) -> Result<Vec<TelemetrySnapshot>> {
        let response = self
            .execute_query(&snapshots_query(session_id, projection))
            .await?;

        let snapshots: Vec<TelemetrySnapshot> = response
            .series()
            .flat_map(|s| s.values.iter().map(|row| parse_snapshot(&s.columns, row)))
            .collect();

        tracing::debug!("Loaded {} snapshots for session {}", snapshots.len(), session_id);
        Ok(snapshots)
    }

    async fn fetch_efficiency_profile(&self, owner_id: &str) -> Result<EfficiencyProfile> {
        let response = self.execute_query(&efficiency_query(owner_id)).await?;
        Ok(parse_profile(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> InfluxQLResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_query_url_encodes_query() {
        let repo = InfluxRepository::new(
            "http://influx:8086/".to_string(),
            "token".to_string(),
            "vehicle".to_string(),
            "autogen".to_string(),
        );
        let url = repo.build_query_url("SELECT \"speed\" FROM \"snapshots\"");
        assert_eq!(
            url,
            "http://influx:8086/query?db=vehicle&rp=autogen&epoch=ms&q=SELECT%20%22speed%22%20FROM%20%22snapshots%22"
        );
    }

    #[test]
    fn test_tag_values_are_escaped() {
        let query = metadata_query("42' OR '1'='1", "alice");
        assert!(query.contains("\"session_id\" = '42\\' OR \\'1\\'=\\'1'"));
        assert!(query.ends_with("\"owner_id\" = 'alice' LIMIT 1"));
    }

    #[test]
    fn test_snapshot_query_selects_projection_in_order() {
        let query = snapshots_query("7", &["speed", "power"]);
        assert_eq!(
            query,
            "SELECT \"speed\", \"power\" FROM \"snapshots\" WHERE \"session_id\" = '7' ORDER BY time ASC"
        );
    }

    #[test]
    fn test_parse_snapshot_rows() {
        let columns: Vec<String> = ["time", "speed", "fast_charger_type", "odometer", "unknown"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let row = [
            json!(1_700_000_000_000i64),
            json!(54.5),
            json!("Tesla"),
            Value::Null,
            json!(1),
        ];
        let snapshot = parse_snapshot(&columns, &row);
        assert_eq!(snapshot.timestamp, Some(1_700_000_000_000));
        assert_eq!(snapshot.speed, Some(54.5));
        assert_eq!(snapshot.fast_charger_type.as_deref(), Some("Tesla"));
        assert_eq!(snapshot.odometer, None);
    }

    #[test]
    fn test_parse_rfc3339_time() {
        assert_eq!(parse_time(&json!("1970-01-01T00:00:01.5Z")), Some(1_500));
        assert_eq!(parse_time(&json!("yesterday")), None);
        assert_eq!(parse_time(&Value::Null), None);
    }

    #[test]
    fn test_parse_metadata() {
        let body = response(json!({
            "results": [{
                "series": [{
                    "name": "sessions",
                    "columns": ["time", "start_date", "end_date", "interval_seconds"],
                    "values": [[0, 1_000, 61_000, 15]]
                }]
            }]
        }));

        let metadata = body.series().find_map(parse_metadata).unwrap();
        assert_eq!(metadata, SessionMetadata::new(1_000, 61_000, 15));
    }

    #[test]
    fn test_missing_metadata_series() {
        let body = response(json!({"results": [{}]}));
        assert!(body.series().find_map(parse_metadata).is_none());
    }

    #[test]
    fn test_parse_profile_groups() {
        let body = response(json!({
            "results": [{
                "series": [
                    {
                        "name": "efficiency",
                        "tags": {"software_version": "2024.8.7"},
                        "columns": ["time", "wh_per_mile"],
                        "values": [[0, 251.5]]
                    },
                    {
                        "name": "efficiency",
                        "tags": {"software_version": "2024.14.3"},
                        "columns": ["time", "wh_per_mile"],
                        "values": [[0, null]]
                    }
                ]
            }]
        }));

        let profile = parse_profile(&body);
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.average_for(Some("2024.8.7")), 251.5);
        assert_eq!(profile.average_for(Some("2024.14.3")), 0.0);
    }
}
