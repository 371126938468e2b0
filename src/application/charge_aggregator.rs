// Charge session aggregation
use crate::application::aggregator::{battery_from_to, FieldReduction, SessionAggregator};
use crate::domain::error::SessionError;
use crate::domain::snapshot::{SessionMetadata, TelemetrySnapshot};
use crate::domain::summary::{charge_stats, SessionSummary, SessionSummaryBuilder, StatValue};
use crate::domain::truncate::truncate;

/// Charger type reported by Tesla superchargers
const SUPERCHARGER_TYPE: &str = "Tesla";

#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeSessionAggregator;

impl SessionAggregator for ChargeSessionAggregator {
    fn aggregate(
        &self,
        snapshots: &[TelemetrySnapshot],
        _metadata: &SessionMetadata,
    ) -> Result<SessionSummary, SessionError> {
        let capacity = snapshots.len();
        let mut timestamps = Vec::with_capacity(capacity);
        let mut battery_levels = Vec::with_capacity(capacity);
        let mut usable_battery_levels = Vec::with_capacity(capacity);
        let mut charger_powers = Vec::with_capacity(capacity);

        let mut battery = FieldReduction::default();
        let mut charger_power = FieldReduction::default();
        let mut energy_added = FieldReduction::default();
        let mut miles_added = FieldReduction::default();
        let mut outside_temp = FieldReduction::default();
        let mut inside_temp = FieldReduction::default();
        let mut supercharger = false;

        for snapshot in snapshots {
            let Some(timestamp) = snapshot.timestamp else {
                continue;
            };
            timestamps.push(timestamp);
            battery_levels.push(snapshot.battery_level);
            usable_battery_levels.push(snapshot.usable_battery_level);
            charger_powers.push(snapshot.charger_power);

            battery.push(snapshot.battery_level);
            charger_power.push(snapshot.charger_power);
            energy_added.push(snapshot.charge_energy_added);
            miles_added.push(snapshot.charge_miles_added_rated);
            outside_temp.push(snapshot.outside_temp);
            inside_temp.push(snapshot.inside_temp);
            supercharger |= snapshot.fast_charger_type.as_deref() == Some(SUPERCHARGER_TYPE);
        }

        let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
            return Err(SessionError::EmptySession);
        };

        Ok(SessionSummaryBuilder::new(timestamps)
            .dataset("battery level", battery_levels)
            .dataset("usable battery level", usable_battery_levels)
            .dataset("charger power", charger_powers)
            .stat(charge_stats::START_DATE, StatValue::Integer(first))
            .stat(charge_stats::FROM_TO, StatValue::text(battery_from_to(&battery)))
            .stat(charge_stats::MAX_POWER, StatValue::number(charger_power.max))
            .stat(
                charge_stats::AVG_POWER,
                StatValue::text(truncate(charger_power.mean(), 2)),
            )
            .stat(charge_stats::MILES_ADDED, StatValue::number(miles_added.max))
            .stat(charge_stats::DURATION, StatValue::Integer(last - first))
            .stat(charge_stats::ENERGY_ADDED, StatValue::number(energy_added.max))
            .stat(charge_stats::SUPERCHARGER, StatValue::Flag(supercharger))
            .stat(
                charge_stats::AVG_EX_TEMP,
                StatValue::text(truncate(outside_temp.mean(), 0)),
            )
            .stat(
                charge_stats::AVG_IN_TEMP,
                StatValue::text(truncate(inside_temp.mean(), 0)),
            )
            .build())
    }
}
