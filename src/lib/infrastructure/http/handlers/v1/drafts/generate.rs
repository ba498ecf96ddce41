//! Email generation handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::{DraftFormat, DraftLength, DraftingService, Tone},
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Email generation request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateDraftBody {
    /// What the email should be about
    #[schema(example = "a spring sale on all plans")]
    #[serde(default)]
    pub prompt: String,

    /// The tone of voice: professional, casual, friendly, formal or persuasive
    #[serde(default)]
    pub tone: Option<String>,

    /// The length: short, medium or long
    #[serde(default)]
    pub length: Option<String>,

    /// Who the email addresses
    #[serde(default)]
    pub recipient: Option<String>,

    /// The output format: html or plain
    #[serde(default)]
    pub format: Option<String>,
}

/// Email generation response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateDraftResponse {
    /// Whether generation succeeded
    pub success: bool,

    /// The generated email copy
    pub content: String,
}

/// Generate email copy from a prompt
#[utoipa::path(
    post,
    operation_id = "generate_draft",
    tag = "Drafts",
    path = "/api/v1/drafts/generate",
    request_body = GenerateDraftBody,
    responses(
        (status = StatusCode::OK, description = "Copy was generated", body = GenerateDraftResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "No prompt was given", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Generation failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<GenerateDraftBody>, JsonRejection>,
) -> Result<Json<GenerateDraftResponse>, ApiError> {
    let Json(request) = request?;

    if request.prompt.is_empty() {
        return Err(ApiError::new_422("Prompt is required"));
    }

    let tone = Tone::from(request.tone.as_deref().unwrap_or_default());
    let length = DraftLength::from(request.length.as_deref().unwrap_or_default());
    let format = DraftFormat::from(request.format.as_deref().unwrap_or_default());
    let recipient = request.recipient.filter(|recipient| !recipient.is_empty());

    let result = state
        .drafting
        .generate(&request.prompt, tone, length, recipient, format)
        .await;

    match result {
        Ok(content) => {
            state.journal.append(
                JournalEntry::info(EntryCategory::Drafting, "AI email generated")
                    .with_field("tone", tone.as_str())
                    .with_field("length", length.as_str())
                    .with_field("promptLength", request.prompt.len()),
            );

            Ok(Json(GenerateDraftResponse {
                success: true,
                content,
            }))
        }
        Err(err) => {
            state.journal.append(
                JournalEntry::error(EntryCategory::Drafting, "AI generation error")
                    .with_field("error", err.to_string()),
            );

            Err(ApiError::new_500("Failed to generate email").with_detail(&err.to_string()))
        }
    }
}
