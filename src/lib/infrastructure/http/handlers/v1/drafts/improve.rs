//! Email improvement handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::{DraftingService, Improvement, Tone},
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Email improvement request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImproveDraftBody {
    /// The email copy to revise
    #[schema(example = "<p>heres our new stuff</p>")]
    #[serde(default)]
    pub content: String,

    /// The revision to apply: grammar, clarity, tone, persuasiveness or brevity
    #[serde(default)]
    pub improvement: Option<String>,

    /// The tone to steer towards, for tone revisions
    #[serde(default)]
    pub target_tone: Option<String>,
}

/// Email improvement response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImproveDraftResponse {
    /// Whether the revision succeeded
    pub success: bool,

    /// The revised email copy
    pub content: String,
}

/// Revise existing email copy
#[utoipa::path(
    post,
    operation_id = "improve_draft",
    tag = "Drafts",
    path = "/api/v1/drafts/improve",
    request_body = ImproveDraftBody,
    responses(
        (status = StatusCode::OK, description = "Copy was revised", body = ImproveDraftResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "No content was given", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "The revision failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<ImproveDraftBody>, JsonRejection>,
) -> Result<Json<ImproveDraftResponse>, ApiError> {
    let Json(request) = request?;

    if request.content.is_empty() {
        return Err(ApiError::new_422("Email content is required"));
    }

    let improvement = Improvement::from(request.improvement.as_deref().unwrap_or_default());
    let target_tone = request
        .target_tone
        .as_deref()
        .filter(|tone| !tone.is_empty())
        .map(Tone::from);

    let result = state
        .drafting
        .improve(&request.content, improvement, target_tone)
        .await;

    match result {
        Ok(content) => {
            state.journal.append(
                JournalEntry::info(EntryCategory::Drafting, "AI email improved")
                    .with_field("improvement", improvement.as_str())
                    .with_field("hasTargetTone", target_tone.is_some()),
            );

            Ok(Json(ImproveDraftResponse {
                success: true,
                content,
            }))
        }
        Err(err) => {
            state.journal.append(
                JournalEntry::error(EntryCategory::Drafting, "AI improvement error")
                    .with_field("error", err.to_string()),
            );

            Err(ApiError::new_500("Failed to improve email").with_detail(&err.to_string()))
        }
    }
}
