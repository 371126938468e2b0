// Errors surfaced while summarising a session
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No snapshot with a timestamp, so there is nothing to anchor deltas on
    #[error("not enough data")]
    EmptySession,

    #[error("session {session_id} not found for owner {owner_id}")]
    SessionNotFound { session_id: String, owner_id: String },

    #[error("telemetry store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl SessionError {
    pub fn not_found(session_id: &str, owner_id: &str) -> Self {
        SessionError::SessionNotFound {
            session_id: session_id.to_string(),
            owner_id: owner_id.to_string(),
        }
    }
}
