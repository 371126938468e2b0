// HTTP request handlers
use crate::domain::error::SessionError;
use crate::domain::snapshot::SessionType;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn error_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::EmptySession => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::Store(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn error_response(status: StatusCode, message: String, compress: bool) -> Response {
    let body = ErrorBody { error: message };
    match json_response(status, &body, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Summary of one drive or charge session
pub async fn session_summary(
    Path((session_type, id)): Path<(String, String)>,
    Query(query): Query<OwnerQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let session_type = match session_type.parse::<SessionType>() {
        Ok(session_type) => session_type,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string(), compress).await,
    };

    match state
        .session_service
        .summarize(&id, &query.owner, session_type)
        .await
    {
        Ok(summary) => match json_response(StatusCode::OK, &summary, compress).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                tracing::error!("Error summarising {} session {}: {}", session_type, id, e);
            } else {
                tracing::info!("Cannot summarise {} session {}: {}", session_type, id, e);
            }
            error_response(status, e.to_string(), compress).await
        }
    }
}
