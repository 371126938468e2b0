// Application state for HTTP handlers
use crate::application::session_service::SessionSummaryService;

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionSummaryService,
}
