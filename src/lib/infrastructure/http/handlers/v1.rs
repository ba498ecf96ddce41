use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::{campaigns::CampaignService, drafting::DraftingService, journal::Journal},
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod drafts;
pub mod emails;
pub mod logs;
pub mod stoplight;
pub mod uptime;

pub fn router<C: CampaignService, D: DraftingService, J: Journal>() -> Router<AppState<C, D, J>> {
    Router::new()
        .route("/", get(stoplight::handler))
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
        .route("/logs", get(logs::handler))
        .route("/emails/send", post(emails::send::handler))
        .route("/emails/bulk", post(emails::bulk::handler))
        .route("/emails/verify", get(emails::verify::handler))
        .route("/drafts/generate", post(drafts::generate::handler))
        .route("/drafts/improve", post(drafts::improve::handler))
        .route("/drafts/subjects", post(drafts::subjects::handler))
        .route("/drafts/template", post(drafts::template::handler))
        .route("/drafts/chat", post(drafts::chat::handler))
}
