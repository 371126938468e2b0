// Common aggregation contract and the single-pass field reducer
use crate::domain::error::SessionError;
use crate::domain::snapshot::{SessionMetadata, TelemetrySnapshot};
use crate::domain::summary::SessionSummary;

/// Reduces the ordered snapshots of one session into its summary.
///
/// Snapshots must already be sorted by ascending timestamp; aggregators never
/// re-sort. Snapshots without a timestamp are skipped, and a sequence with no
/// timestamped snapshot fails with `SessionError::EmptySession`.
pub trait SessionAggregator {
    fn aggregate(
        &self,
        snapshots: &[TelemetrySnapshot],
        metadata: &SessionMetadata,
    ) -> Result<SessionSummary, SessionError>;
}

/// Running first/last/min/max/mean of one optional snapshot field.
/// Absent readings are left out of every aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldReduction {
    pub first: Option<f64>,
    pub last: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    sum: f64,
    count: usize,
}

impl FieldReduction {
    pub fn push(&mut self, value: Option<f64>) {
        let Some(value) = value else {
            return;
        };
        if self.first.is_none() {
            self.first = Some(value);
        }
        self.last = Some(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Last present reading minus first present reading
    pub fn rise(&self) -> Option<f64> {
        Some(self.last? - self.first?)
    }

    /// First present reading minus last present reading
    pub fn fall(&self) -> Option<f64> {
        Some(self.first? - self.last?)
    }
}

/// `"{first}% -> {last}"` from the first and last reported battery levels
pub fn battery_from_to(battery_level: &FieldReduction) -> Option<String> {
    match (battery_level.first, battery_level.last) {
        (Some(first), Some(last)) => Some(format!("{}% -> {}", first, last)),
        _ => None,
    }
}
