// Session summary service - Use case for summarising one drive or charge
use crate::application::aggregator::SessionAggregator;
use crate::application::charge_aggregator::ChargeSessionAggregator;
use crate::application::drive_aggregator::DriveSessionAggregator;
use crate::application::session_repository::SessionRepository;
use crate::domain::error::SessionError;
use crate::domain::snapshot::{SessionType, TelemetrySnapshot};
use crate::domain::summary::SessionSummary;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct SessionSummaryService {
    repository: Arc<dyn SessionRepository>,
}

impl SessionSummaryService {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn summarize(
        &self,
        session_id: &str,
        owner_id: &str,
        session_type: SessionType,
    ) -> Result<SessionSummary, SessionError> {
        let start_time = Instant::now();

        let mut metadata = self
            .repository
            .fetch_session_metadata(session_id, owner_id)
            .await?
            .ok_or_else(|| SessionError::not_found(session_id, owner_id))?;

        let snapshots = self
            .repository
            .fetch_ordered_snapshots(session_id, session_type.projection())
            .await?;
        tracing::debug!(
            "Fetched {} snapshots for {} session {} ({} - {})",
            snapshots.len(),
            session_type,
            session_id,
            metadata.start_date,
            metadata.end_date
        );

        if !snapshots.iter().any(|s| s.timestamp.is_some()) {
            tracing::warn!("{} session {} has no usable snapshots", session_type, session_id);
            return Err(SessionError::EmptySession);
        }

        let summary = match session_type {
            SessionType::Charge => ChargeSessionAggregator.aggregate(&snapshots, &metadata)?,
            SessionType::Drive => {
                metadata.vehicle_software_version = software_version(&snapshots);
                let average_efficiency = self
                    .lookup_average_efficiency(metadata.vehicle_software_version.as_deref(), owner_id)
                    .await?;
                DriveSessionAggregator::new(average_efficiency).aggregate(&snapshots, &metadata)?
            }
        };

        tracing::info!(
            "Summarised {} session {} ({} snapshots) in {:?}",
            session_type,
            session_id,
            snapshots.len(),
            start_time.elapsed()
        );
        Ok(summary)
    }

    /// Owner's average Wh/mile for a software version, 0 when unknown
    pub async fn lookup_average_efficiency(
        &self,
        version: Option<&str>,
        owner_id: &str,
    ) -> Result<f64, SessionError> {
        let Some(version) = version else {
            return Ok(0.0);
        };
        let profile = self.repository.fetch_efficiency_profile(owner_id).await?;
        if profile.is_empty() {
            tracing::debug!("No efficiency history for owner {}", owner_id);
            return Ok(0.0);
        }
        let average = profile.average_for(Some(version));
        tracing::debug!(
            "Average efficiency for version {} of owner {}: {} Wh/mile ({} versions known)",
            version,
            owner_id,
            average,
            profile.len()
        );
        Ok(average)
    }
}

/// Software version reported by the first snapshot that carries one
fn software_version(snapshots: &[TelemetrySnapshot]) -> Option<String> {
    snapshots.iter().find_map(|s| s.software_version.clone())
}
