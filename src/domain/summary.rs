// Session summary domain model and its builder
use super::snapshot::PositionFix;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// Largest integer an IEEE double represents exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A reading or statistic that serializes integral values as JSON integers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(pub f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Number(Number),
    Text(String),
    Flag(bool),
    Missing,
}

impl StatValue {
    pub fn number(value: Option<f64>) -> Self {
        value.map_or(StatValue::Missing, |v| StatValue::Number(Number(v)))
    }

    pub fn text(value: Option<String>) -> Self {
        value.map_or(StatValue::Missing, StatValue::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    Number,
    String,
    Date,
    Bool,
    Duration,
    Degrees,
}

/// Fixed presentation attributes of one statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    pub display_order: u32,
    pub unit: &'static str,
    pub display_type: DisplayType,
}

const fn stat(
    key: &'static str,
    display_name: &'static str,
    display_order: u32,
    unit: &'static str,
    display_type: DisplayType,
) -> StatSpec {
    StatSpec {
        key,
        display_name,
        display_order,
        unit,
        display_type,
    }
}

/// Statistics table of a charge session
pub mod charge_stats {
    use super::{stat, DisplayType, StatSpec};

    pub const START_DATE: StatSpec = stat("startDate", "Start Date", 1, "", DisplayType::Date);
    pub const FROM_TO: StatSpec = stat("fromTo", "Battery", 2, "%", DisplayType::String);
    pub const MAX_POWER: StatSpec = stat("maxPower", "Max Power", 3, " kW", DisplayType::Number);
    pub const AVG_POWER: StatSpec = stat("avgPower", "Avg Power", 4, " kW", DisplayType::Number);
    pub const MILES_ADDED: StatSpec =
        stat("milesAdded", "Miles Added", 5, " miles", DisplayType::Number);
    pub const DURATION: StatSpec = stat("duration", "Duration", 6, "", DisplayType::Duration);
    pub const ENERGY_ADDED: StatSpec =
        stat("energyAdded", "Energy Added", 7, " kWh", DisplayType::Number);
    pub const SUPERCHARGER: StatSpec =
        stat("supercharger", "Supercharger", 8, "", DisplayType::Bool);
    pub const AVG_EX_TEMP: StatSpec =
        stat("avgExTemp", "Avg Outside Temp", 11, "", DisplayType::Degrees);
    pub const AVG_IN_TEMP: StatSpec =
        stat("avgInTemp", "Avg Inside Temp", 12, "", DisplayType::Degrees);

    pub const ALL: [StatSpec; 10] = [
        START_DATE,
        FROM_TO,
        MAX_POWER,
        AVG_POWER,
        MILES_ADDED,
        DURATION,
        ENERGY_ADDED,
        SUPERCHARGER,
        AVG_EX_TEMP,
        AVG_IN_TEMP,
    ];
}

/// Statistics table of a drive session
pub mod drive_stats {
    use super::{stat, DisplayType, StatSpec};

    pub const START_DATE: StatSpec = stat("startDate", "Start Date", 1, "", DisplayType::Date);
    pub const DISTANCE: StatSpec = stat("distance", "Distance", 2, " miles", DisplayType::Number);
    pub const FROM_TO: StatSpec = stat("fromTo", "Battery", 3, "%", DisplayType::String);
    pub const DURATION: StatSpec = stat("duration", "Duration", 4, "", DisplayType::Duration);
    pub const EST_TIME_WAITING: StatSpec =
        stat("estTimeWaiting", "Est. Time Waiting", 5, "", DisplayType::Duration);
    pub const AVG_SPEED: StatSpec = stat("avgSpeed", "Avg Speed", 6, " mph", DisplayType::Number);
    pub const MAX_SPEED: StatSpec = stat("maxSpeed", "Max Speed", 7, " mph", DisplayType::Number);
    pub const EFFICIENCY: StatSpec =
        stat("efficiency", "Efficiency", 8, " Wh/mile", DisplayType::Number);
    pub const MAX_POWER: StatSpec = stat("maxPower", "Max Power", 9, " kW", DisplayType::Number);
    pub const MAX_REGEN: StatSpec = stat("maxRegen", "Max Regen", 10, " kW", DisplayType::Number);
    pub const AVG_EX_TEMP: StatSpec =
        stat("avgExTemp", "Avg Outside Temp", 11, "", DisplayType::Degrees);
    pub const AVG_IN_TEMP: StatSpec =
        stat("avgInTemp", "Avg Inside Temp", 12, "", DisplayType::Degrees);

    pub const ALL: [StatSpec; 12] = [
        START_DATE,
        DISTANCE,
        FROM_TO,
        DURATION,
        EST_TIME_WAITING,
        AVG_SPEED,
        MAX_SPEED,
        EFFICIENCY,
        MAX_POWER,
        MAX_REGEN,
        AVG_EX_TEMP,
        AVG_IN_TEMP,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub value: StatValue,
    pub display_name: &'static str,
    pub display_order: u32,
    pub unit: &'static str,
    pub display_type: DisplayType,
}

impl StatEntry {
    /// Value followed by its unit, as the stats table shows it
    pub fn display_text(&self) -> String {
        let value = match &self.value {
            StatValue::Integer(v) => v.to_string(),
            StatValue::Number(v) => v.to_string(),
            StatValue::Text(v) => v.clone(),
            StatValue::Flag(v) => v.to_string(),
            StatValue::Missing => return "-".to_string(),
        };
        format!("{}{}", value, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<Option<Number>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    pub labels: Vec<i64>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub graph_data: GraphData,
    pub session_data: BTreeMap<&'static str, StatEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_data: Option<Vec<PositionFix>>,
}

impl SessionSummary {
    pub fn stat(&self, key: &str) -> Option<&StatEntry> {
        self.session_data.get(key)
    }

    pub fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.graph_data.datasets.iter().find(|d| d.label == label)
    }
}

/// Assembles a `SessionSummary` from already computed values
#[derive(Debug, Default)]
pub struct SessionSummaryBuilder {
    graph_data: GraphData,
    session_data: BTreeMap<&'static str, StatEntry>,
    map_data: Option<Vec<PositionFix>>,
}

impl SessionSummaryBuilder {
    pub fn new(labels: Vec<i64>) -> Self {
        Self {
            graph_data: GraphData {
                labels,
                datasets: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub fn dataset(mut self, label: &'static str, data: Vec<Option<f64>>) -> Self {
        let data = data.into_iter().map(|v| v.map(Number)).collect();
        self.graph_data.datasets.push(Dataset { label, data });
        self
    }

    pub fn stat(mut self, template: StatSpec, value: StatValue) -> Self {
        self.session_data.insert(
            template.key,
            StatEntry {
                value,
                display_name: template.display_name,
                display_order: template.display_order,
                unit: template.unit,
                display_type: template.display_type,
            },
        );
        self
    }

    pub fn map_data(mut self, fixes: Vec<PositionFix>) -> Self {
        self.map_data = Some(fixes);
        self
    }

    pub fn build(self) -> SessionSummary {
        SessionSummary {
            graph_data: self.graph_data,
            session_data: self.session_data,
            map_data: self.map_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_display_orders_are_unique_per_session_type() {
        let charge: HashSet<u32> = charge_stats::ALL.iter().map(|s| s.display_order).collect();
        assert_eq!(charge.len(), charge_stats::ALL.len());

        let drive: HashSet<u32> = drive_stats::ALL.iter().map(|s| s.display_order).collect();
        assert_eq!(drive.len(), drive_stats::ALL.len());
    }

    #[test]
    fn test_typed_stats_carry_no_unit() {
        for table_entry in charge_stats::ALL.iter().chain(drive_stats::ALL.iter()) {
            if !matches!(table_entry.display_type, DisplayType::Number | DisplayType::String) {
                assert_eq!(table_entry.unit, "", "{} should have no unit", table_entry.key);
            }
        }
    }

    #[test]
    fn test_summary_serialization_shape() {
        let summary = SessionSummaryBuilder::new(vec![1_000, 2_000])
            .dataset("speed", vec![Some(0.0), Some(31.5)])
            .stat(drive_stats::DISTANCE, StatValue::Text("1.20".to_string()))
            .stat(drive_stats::EFFICIENCY, StatValue::Integer(0))
            .stat(drive_stats::AVG_SPEED, StatValue::Missing)
            .map_data(vec![PositionFix {
                latitude: 52.5,
                longitude: 13.4,
                heading: None,
            }])
            .build();

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({
                "graphData": {
                    "labels": [1000, 2000],
                    "datasets": [{"label": "speed", "data": [0, 31.5]}]
                },
                "sessionData": {
                    "avgSpeed": {
                        "value": null,
                        "displayName": "Avg Speed",
                        "displayOrder": 6,
                        "unit": " mph",
                        "displayType": "number"
                    },
                    "distance": {
                        "value": "1.20",
                        "displayName": "Distance",
                        "displayOrder": 2,
                        "unit": " miles",
                        "displayType": "number"
                    },
                    "efficiency": {
                        "value": 0,
                        "displayName": "Efficiency",
                        "displayOrder": 8,
                        "unit": " Wh/mile",
                        "displayType": "number"
                    }
                },
                "mapData": [{"latitude": 52.5, "longitude": 13.4, "heading": null}]
            })
        );
    }

    #[test]
    fn test_map_data_omitted_when_not_set() {
        let summary = SessionSummaryBuilder::new(vec![5]).build();
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("mapData").is_none());
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        let encoded = serde_json::to_string(&vec![
            Number(20.0),
            Number(-3.0),
            Number(7.25),
            Number(-0.0),
        ])
        .unwrap();
        assert_eq!(encoded, "[20,-3,7.25,0]");
    }

    #[test]
    fn test_display_text_appends_unit() {
        let summary = SessionSummaryBuilder::new(vec![])
            .stat(charge_stats::FROM_TO, StatValue::Text("20% -> 80".to_string()))
            .stat(charge_stats::MAX_POWER, StatValue::number(Some(150.0)))
            .stat(charge_stats::SUPERCHARGER, StatValue::Flag(true))
            .stat(charge_stats::AVG_POWER, StatValue::Missing)
            .build();

        assert_eq!(summary.stat("fromTo").unwrap().display_text(), "20% -> 80%");
        assert_eq!(summary.stat("maxPower").unwrap().display_text(), "150 kW");
        assert_eq!(summary.stat("supercharger").unwrap().display_text(), "true");
        assert_eq!(summary.stat("avgPower").unwrap().display_text(), "-");
    }
}
