//! Assistant chat handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::{ChatMessage, ChatRole, DraftingService},
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// One prior turn of the assistant conversation
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    /// Who spoke: user or assistant
    #[schema(example = "user")]
    pub role: String,

    /// What was said
    pub content: String,
}

/// Assistant chat request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    /// The user's latest message
    #[schema(example = "How do I personalise the subject line?")]
    #[serde(default)]
    pub message: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

/// Assistant chat response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Whether a reply was produced
    pub success: bool,

    /// The assistant's reply
    pub response: String,

    /// When the reply was produced
    pub timestamp: DateTime<Utc>,
}

/// Ask the in-app assistant a question
#[utoipa::path(
    post,
    operation_id = "chat",
    tag = "Drafts",
    path = "/api/v1/drafts/chat",
    request_body = ChatBody,
    responses(
        (status = StatusCode::OK, description = "The assistant replied", body = ChatResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "No message was given", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "The assistant failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = request?;

    if request.message.trim().is_empty() {
        return Err(ApiError::new_422("Message is required"));
    }

    let history = request
        .conversation_history
        .into_iter()
        .map(|turn| ChatMessage {
            role: ChatRole::from(turn.role.as_str()),
            content: turn.content,
        })
        .collect();

    let result = state.drafting.chat(&request.message, history).await;

    match result {
        Ok(response) => {
            state.journal.append(
                JournalEntry::info(EntryCategory::Drafting, "AI chat response generated")
                    .with_field("messageLength", request.message.len()),
            );

            Ok(Json(ChatResponse {
                success: true,
                response,
                timestamp: Utc::now(),
            }))
        }
        Err(err) => {
            state.journal.append(
                JournalEntry::error(EntryCategory::Drafting, "AI chat error")
                    .with_field("error", err.to_string()),
            );

            Err(ApiError::new_500("Failed to get chat response").with_detail(&err.to_string()))
        }
    }
}
