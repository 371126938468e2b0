// Drive session aggregation, including the efficiency estimate
use crate::application::aggregator::{battery_from_to, FieldReduction, SessionAggregator};
use crate::domain::error::SessionError;
use crate::domain::snapshot::{SessionMetadata, TelemetrySnapshot};
use crate::domain::summary::{drive_stats, SessionSummary, SessionSummaryBuilder, StatValue};
use crate::domain::truncate::truncate;

/// Wh/mile used when neither history nor the session itself gives a ratio
pub const FALLBACK_EFFICIENCY: f64 = 241.9;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Aggregates a drive, given the owner's historical average efficiency
/// (Wh/mile) for the vehicle's software version, or 0 when unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveSessionAggregator {
    average_efficiency: f64,
}

impl DriveSessionAggregator {
    pub fn new(average_efficiency: f64) -> Self {
        Self { average_efficiency }
    }
}

impl SessionAggregator for DriveSessionAggregator {
    fn aggregate(
        &self,
        snapshots: &[TelemetrySnapshot],
        metadata: &SessionMetadata,
    ) -> Result<SessionSummary, SessionError> {
        let capacity = snapshots.len();
        let mut timestamps = Vec::with_capacity(capacity);
        let mut speeds = Vec::with_capacity(capacity);
        let mut powers = Vec::with_capacity(capacity);
        let mut positions = Vec::with_capacity(capacity);

        let mut battery = FieldReduction::default();
        let mut range = FieldReduction::default();
        let mut odometer = FieldReduction::default();
        let mut speed = FieldReduction::default();
        let mut power = FieldReduction::default();
        let mut energy_added = FieldReduction::default();
        let mut miles_added = FieldReduction::default();
        let mut outside_temp = FieldReduction::default();
        let mut inside_temp = FieldReduction::default();

        for snapshot in snapshots {
            let Some(timestamp) = snapshot.timestamp else {
                continue;
            };
            timestamps.push(timestamp);
            speeds.push(snapshot.speed);
            powers.push(snapshot.power);
            positions.extend(snapshot.position());

            battery.push(snapshot.battery_level);
            range.push(snapshot.battery_range);
            odometer.push(snapshot.odometer);
            speed.push(snapshot.speed);
            power.push(snapshot.power);
            energy_added.push(snapshot.charge_energy_added);
            miles_added.push(snapshot.charge_miles_added_rated);
            outside_temp.push(snapshot.outside_temp);
            inside_temp.push(snapshot.inside_temp);
        }

        let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
            return Err(SessionError::EmptySession);
        };

        let distance = odometer.rise();
        let elapsed_hours = (first - last).abs() as f64 / MILLIS_PER_HOUR;
        let avg_speed = distance.map(|d| d / elapsed_hours);
        let efficiency = estimate_efficiency(
            distance,
            range.fall(),
            self.average_efficiency,
            energy_added.last.unwrap_or(0.0),
            miles_added.last.unwrap_or(0.0),
        );
        let waiting = estimate_time_waiting(&speeds, metadata.interval_seconds);

        // Most recent fix first, the map draws it on top
        positions.reverse();

        Ok(SessionSummaryBuilder::new(timestamps)
            .dataset("speed", speeds)
            .dataset("power", powers)
            .stat(drive_stats::START_DATE, StatValue::Integer(first))
            .stat(drive_stats::DISTANCE, StatValue::text(truncate(distance, 2)))
            .stat(drive_stats::FROM_TO, StatValue::text(battery_from_to(&battery)))
            .stat(drive_stats::DURATION, StatValue::Integer(last - first))
            .stat(drive_stats::EST_TIME_WAITING, StatValue::Integer(waiting))
            .stat(drive_stats::AVG_SPEED, StatValue::text(truncate(avg_speed, 2)))
            .stat(drive_stats::MAX_SPEED, StatValue::number(speed.max))
            .stat(drive_stats::EFFICIENCY, efficiency)
            .stat(drive_stats::MAX_POWER, StatValue::number(power.max))
            .stat(drive_stats::MAX_REGEN, StatValue::number(power.min))
            .stat(
                drive_stats::AVG_EX_TEMP,
                StatValue::text(truncate(outside_temp.mean(), 0)),
            )
            .stat(
                drive_stats::AVG_IN_TEMP,
                StatValue::text(truncate(inside_temp.mean(), 0)),
            )
            .map_data(positions)
            .build())
    }
}

/// Wh/mile consumed over the drive.
///
/// Zero when the drive covered no distance or used no range. Otherwise the
/// rated efficiency is taken from, in order: the historical average, the
/// session's energy added per mile added, and `FALLBACK_EFFICIENCY`. It is
/// then scaled by how far the car went per mile of range used.
pub fn estimate_efficiency(
    odometer_delta: Option<f64>,
    range_delta: Option<f64>,
    average_efficiency: f64,
    energy_added: f64,
    miles_added: f64,
) -> StatValue {
    let odometer_delta = odometer_delta.unwrap_or(0.0);
    let range_delta = range_delta.unwrap_or(0.0);
    if odometer_delta == 0.0 || range_delta == 0.0 {
        return StatValue::Integer(0);
    }

    let used = if average_efficiency == 0.0 {
        if energy_added == 0.0 || miles_added == 0.0 {
            FALLBACK_EFFICIENCY
        } else {
            (energy_added / miles_added) * 1000.0
        }
    } else {
        average_efficiency
    };

    StatValue::text(truncate(Some(used / (odometer_delta / range_delta)), 2))
}

/// Milliseconds spent stopped, extrapolated from the interior samples
/// (first and last excluded) reporting a speed of zero or less.
pub fn estimate_time_waiting(speeds: &[Option<f64>], interval_seconds: u32) -> i64 {
    if speeds.len() <= 2 {
        return 0;
    }
    let stopped = speeds[1..speeds.len() - 1]
        .iter()
        .filter(|speed| matches!(speed, Some(s) if *s <= 0.0))
        .count() as i64;
    stopped * i64::from(interval_seconds) * 1000
}
