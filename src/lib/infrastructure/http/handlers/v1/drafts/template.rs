//! Bulk template generation handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        drafting::{BulkTemplate, DraftingService},
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Bulk template request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkTemplateBody {
    /// What the campaign is about
    #[schema(example = "a loyalty discount for long-time customers")]
    #[serde(default)]
    pub campaign_description: String,

    /// The CSV columns available as placeholders
    #[serde(default)]
    pub csv_columns: Option<Vec<String>>,
}

/// A generated campaign template
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeneratedTemplate {
    /// The subject template
    #[schema(example = "A thank-you for {{name}}")]
    pub subject: String,

    /// The HTML body template
    pub html: String,
}

impl From<BulkTemplate> for GeneratedTemplate {
    fn from(template: BulkTemplate) -> Self {
        Self {
            subject: template.subject,
            html: template.html,
        }
    }
}

/// Bulk template response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkTemplateResponse {
    /// Whether generation succeeded
    pub success: bool,

    /// The generated template
    pub template: GeneratedTemplate,
}

/// Generate a personalisable template for a bulk campaign
#[utoipa::path(
    post,
    operation_id = "bulk_template",
    tag = "Drafts",
    path = "/api/v1/drafts/template",
    request_body = BulkTemplateBody,
    responses(
        (status = StatusCode::OK, description = "A template was generated", body = BulkTemplateResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "No campaign description was given", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Generation failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<BulkTemplateBody>, JsonRejection>,
) -> Result<Json<BulkTemplateResponse>, ApiError> {
    let Json(request) = request?;

    if request.campaign_description.is_empty() {
        return Err(ApiError::new_422("Campaign description is required"));
    }

    let columns = request
        .csv_columns
        .unwrap_or_else(|| vec!["email".to_string(), "name".to_string()]);

    let result = state
        .drafting
        .bulk_template(&request.campaign_description, &columns)
        .await;

    match result {
        Ok(template) => {
            state.journal.append(
                JournalEntry::info(EntryCategory::Drafting, "AI bulk template generated")
                    .with_field("hasSubject", !template.subject.is_empty())
                    .with_field("hasHtml", !template.html.is_empty()),
            );

            Ok(Json(BulkTemplateResponse {
                success: true,
                template: template.into(),
            }))
        }
        Err(err) => {
            state.journal.append(
                JournalEntry::error(EntryCategory::Drafting, "AI template generation error")
                    .with_field("error", err.to_string()),
            );

            Err(ApiError::new_500("Failed to generate template").with_detail(&err.to_string()))
        }
    }
}
