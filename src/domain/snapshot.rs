// Telemetry snapshot and session metadata domain models
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One telemetry record reported by the vehicle.
///
/// Every field is optional: the vehicle does not report every attribute in
/// every sample. A snapshot without a timestamp is malformed and is skipped
/// by the aggregators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Epoch milliseconds
    pub timestamp: Option<i64>,
    pub speed: Option<f64>,
    /// Negative while regenerative braking
    pub power: Option<f64>,
    pub odometer: Option<f64>,
    pub battery_level: Option<f64>,
    pub usable_battery_level: Option<f64>,
    pub battery_range: Option<f64>,
    pub charge_energy_added: Option<f64>,
    pub charge_miles_added_rated: Option<f64>,
    pub charge_miles_added_ideal: Option<f64>,
    pub charger_power: Option<f64>,
    pub fast_charger_type: Option<String>,
    pub outside_temp: Option<f64>,
    pub inside_temp: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub heading: Option<f64>,
    pub software_version: Option<String>,
}

impl TelemetrySnapshot {
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// Position fix for the route map, if the snapshot has coordinates
    pub fn position(&self) -> Option<PositionFix> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(PositionFix {
                latitude,
                longitude,
                heading: self.heading,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMetadata {
    pub start_date: i64,
    pub end_date: i64,
    /// Sampling interval used to extrapolate idle time
    pub interval_seconds: u32,
    pub vehicle_software_version: Option<String>,
}

impl SessionMetadata {
    pub fn new(start_date: i64, end_date: i64, interval_seconds: u32) -> Self {
        Self {
            start_date,
            end_date,
            interval_seconds,
            vehicle_software_version: None,
        }
    }
}

const CHARGE_PROJECTION: &[&str] = &[
    "battery_level",
    "usable_battery_level",
    "charger_power",
    "fast_charger_type",
    "charge_energy_added",
    "charge_miles_added_rated",
    "outside_temp",
    "inside_temp",
];

const DRIVE_PROJECTION: &[&str] = &[
    "battery_level",
    "battery_range",
    "power",
    "speed",
    "odometer",
    "charge_energy_added",
    "charge_miles_added_rated",
    "outside_temp",
    "inside_temp",
    "latitude",
    "longitude",
    "heading",
    "software_version",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Charge,
    Drive,
}

impl SessionType {
    /// Snapshot fields the telemetry store has to return for this session type
    pub fn projection(self) -> &'static [&'static str] {
        match self {
            SessionType::Charge => CHARGE_PROJECTION,
            SessionType::Drive => DRIVE_PROJECTION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Charge => "charge",
            SessionType::Drive => "drive",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown session type: {0}")]
pub struct UnknownSessionType(pub String);

impl FromStr for SessionType {
    type Err = UnknownSessionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(SessionType::Charge),
            "drive" => Ok(SessionType::Drive),
            other => Err(UnknownSessionType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_parsing() {
        assert_eq!("charge".parse::<SessionType>(), Ok(SessionType::Charge));
        assert_eq!("drive".parse::<SessionType>(), Ok(SessionType::Drive));
        assert_eq!(
            "Drive".parse::<SessionType>(),
            Err(UnknownSessionType("Drive".to_string()))
        );
    }

    #[test]
    fn test_projections_differ_by_session_type() {
        assert!(SessionType::Charge.projection().contains(&"charger_power"));
        assert!(!SessionType::Charge.projection().contains(&"latitude"));
        assert!(SessionType::Drive.projection().contains(&"odometer"));
        assert!(!SessionType::Drive.projection().contains(&"fast_charger_type"));
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let mut snapshot = TelemetrySnapshot::at(0);
        snapshot.latitude = Some(52.1);
        assert_eq!(snapshot.position(), None);

        snapshot.longitude = Some(4.3);
        snapshot.heading = Some(90.0);
        assert_eq!(
            snapshot.position(),
            Some(PositionFix {
                latitude: 52.1,
                longitude: 4.3,
                heading: Some(90.0),
            })
        );
    }
}
