//! Subject line suggestion handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::DraftingService,
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Suggestions returned when the request does not name a count
const DEFAULT_COUNT: usize = 3;

/// Subject line request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectLinesBody {
    /// The email copy to write subject lines for
    #[schema(example = "<p>Our spring sale starts today</p>")]
    #[serde(default)]
    pub email_content: String,

    /// How many suggestions to return
    #[serde(default)]
    pub count: Option<usize>,
}

/// Subject line response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectLinesResponse {
    /// Whether suggestion succeeded
    pub success: bool,

    /// The suggested subject lines
    pub subject_lines: Vec<String>,
}

/// Suggest subject lines for email copy
#[utoipa::path(
    post,
    operation_id = "subject_lines",
    tag = "Drafts",
    path = "/api/v1/drafts/subjects",
    request_body = SubjectLinesBody,
    responses(
        (status = StatusCode::OK, description = "Subject lines were suggested", body = SubjectLinesResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "No content was given", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Suggestion failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<SubjectLinesBody>, JsonRejection>,
) -> Result<Json<SubjectLinesResponse>, ApiError> {
    let Json(request) = request?;

    if request.email_content.is_empty() {
        return Err(ApiError::new_422("Email content is required"));
    }

    let count = request.count.unwrap_or(DEFAULT_COUNT);

    let result = state
        .drafting
        .subjects(&request.email_content, count)
        .await;

    match result {
        Ok(subject_lines) => {
            state.journal.append(
                JournalEntry::info(EntryCategory::Drafting, "AI subject lines generated")
                    .with_field("count", subject_lines.len()),
            );

            Ok(Json(SubjectLinesResponse {
                success: true,
                subject_lines,
            }))
        }
        Err(err) => {
            state.journal.append(
                JournalEntry::error(EntryCategory::Drafting, "AI subject generation error")
                    .with_field("error", err.to_string()),
            );

            Err(ApiError::new_500("Failed to generate subject lines").with_detail(&err.to_string()))
        }
    }
}
