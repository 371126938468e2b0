// Repository trait for session data access
use crate::domain::efficiency::EfficiencyProfile;
use crate::domain::snapshot::{SessionMetadata, TelemetrySnapshot};
use async_trait::async_trait;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Metadata of a session owned by `owner_id`, `None` when there is no such session
    async fn fetch_session_metadata(
        &self,
        session_id: &str,
        owner_id: &str,
    ) -> anyhow::Result<Option<SessionMetadata>>;

    /// Snapshots of a session in ascending timestamp order, restricted to `projection`
    async fn fetch_ordered_snapshots(
        &self,
        session_id: &str,
        projection: &[&str],
    ) -> anyhow::Result<Vec<TelemetrySnapshot>>;

    /// Historical average efficiency per vehicle software version
    async fn fetch_efficiency_profile(&self, owner_id: &str) -> anyhow::Result<EfficiencyProfile>;
}
