//! Activity log handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::DraftingService,
        journal::{Journal, JournalEntry, LogStream},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Entries returned when the query does not name a limit
const DEFAULT_LIMIT: usize = 100;

/// The most entries a single request may return
const MAX_LIMIT: usize = 500;

/// The journal stream to read
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Email activity only
    Emails,

    /// Error-level entries only
    Error,

    /// Every entry
    #[default]
    Combined,
}

impl From<LogType> for LogStream {
    fn from(log_type: LogType) -> Self {
        match log_type {
            LogType::Emails => LogStream::Emails,
            LogType::Error => LogStream::Error,
            LogType::Combined => LogStream::Combined,
        }
    }
}

/// Query parameters for reading the activity log
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsParams {
    /// Which log stream to read
    #[serde(default, rename = "type")]
    pub log_type: LogType,

    /// The most entries to return, capped at 500
    pub limit: Option<usize>,
}

/// The activity log response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogsResponse {
    /// The entries, newest first
    #[schema(value_type = Vec<Object>)]
    pub logs: Vec<JournalEntry>,
}

/// Read back recent activity log entries
#[utoipa::path(
    get,
    operation_id = "logs",
    tag = "Logs",
    path = "/api/v1/logs",
    params(LogsParams),
    responses(
        (status = StatusCode::OK, description = "Recent log entries, newest first", body = LogsResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "The log store could not be read", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let logs = state.journal.recent(params.log_type.into(), limit)?;

    Ok(Json(LogsResponse { logs }))
}
