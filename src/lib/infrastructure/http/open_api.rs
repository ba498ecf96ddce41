//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::{errors::ErrorResponse, handlers::v1::*};

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Bulk Mailer"),
    paths(
        emails::send::handler,
        emails::bulk::handler,
        emails::verify::handler,
        drafts::generate::handler,
        drafts::improve::handler,
        drafts::subjects::handler,
        drafts::template::handler,
        drafts::chat::handler,
        logs::handler,
        uptime::handler
    ),
    components(schemas(
        emails::send::SendEmailBody,
        emails::send::SendEmailResponse,
        emails::bulk::BulkSendBody,
        emails::bulk::BulkOutcome,
        emails::bulk::BulkSendResponse,
        emails::bulk::TooManyEmailsResponse,
        emails::verify::VerifyEmailResponse,
        drafts::generate::GenerateDraftBody,
        drafts::generate::GenerateDraftResponse,
        drafts::improve::ImproveDraftBody,
        drafts::improve::ImproveDraftResponse,
        drafts::subjects::SubjectLinesBody,
        drafts::subjects::SubjectLinesResponse,
        drafts::template::BulkTemplateBody,
        drafts::template::GeneratedTemplate,
        drafts::template::BulkTemplateResponse,
        drafts::chat::ChatTurn,
        drafts::chat::ChatBody,
        drafts::chat::ChatResponse,
        logs::LogType,
        logs::LogsResponse,
        uptime::UptimeResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;
