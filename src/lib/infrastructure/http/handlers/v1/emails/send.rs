//! Single email send handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::CampaignService,
        comms::{EmailAddress, OutboundEmail},
        drafting::DraftingService,
        journal::Journal,
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Single email request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailBody {
    /// The recipient address
    #[schema(example = "email@example.com")]
    #[serde(default)]
    pub to: String,

    /// The subject line
    #[schema(example = "Welcome aboard")]
    #[serde(default)]
    pub subject: String,

    /// The HTML body
    #[schema(example = "<p>Hello!</p>")]
    #[serde(default)]
    pub html: String,

    /// An optional plain text body
    #[serde(default)]
    pub text: Option<String>,

    /// Carbon copy recipients
    #[serde(default)]
    pub cc: Vec<String>,

    /// Blind carbon copy recipients
    #[serde(default)]
    pub bcc: Vec<String>,
}

/// Single email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Whether the message was accepted
    pub success: bool,

    /// The message id the relay accepted
    #[schema(example = "<id@example.com>")]
    pub message_id: String,
}

/// Send one email
#[utoipa::path(
    post,
    operation_id = "send_email",
    tag = "Emails",
    path = "/api/v1/emails/send",
    request_body = SendEmailBody,
    responses(
        (status = StatusCode::OK, description = "Email accepted by the relay", body = SendEmailResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Missing or invalid fields", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "The send failed", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    request: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(request) = request?;

    if request.to.is_empty() || request.subject.is_empty() || request.html.is_empty() {
        return Err(ApiError::new_422("Missing required fields: to, subject, html"));
    }

    let to = EmailAddress::new(&request.to)?;

    let email = OutboundEmail::new(to, &request.subject, &request.html)?
        .with_text_body(request.text)
        .with_copies(request.cc, request.bcc);

    let message_id = state.campaigns.send_single(email).await?;

    Ok(Json(SendEmailResponse {
        success: true,
        message_id,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::{campaigns::tests::MockCampaignService, comms::errors::MailerError},
        infrastructure::http::{errors::ErrorResponse, router, state::test_state},
    };

    use super::{SendEmailBody, SendEmailResponse};

    impl SendEmailBody {
        /// Create a minimal body with the given recipient
        fn new(to: &str) -> Self {
            Self {
                to: to.to_string(),
                subject: "Hello".to_string(),
                html: "<p>Hi there</p>".to_string(),
                text: None,
                cc: Vec::new(),
                bcc: Vec::new(),
            }
        }
    }

    #[tokio::test]
    async fn test_send_email_success() -> TestResult {
        let mut campaigns = MockCampaignService::new();

        campaigns
            .expect_send_single()
            .withf(|email| {
                email.to().as_str() == "email@example.com" && email.subject() == "Hello"
            })
            .times(1)
            .returning(|_| Ok("<id@example.com>".to_string()));

        let state = test_state(Some(campaigns), None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/send")
            .json(&SendEmailBody::new("email@example.com"))
            .await;

        response.assert_status_ok();

        let json = response.json::<SendEmailResponse>();

        assert!(json.success);
        assert_eq!(json.message_id, "<id@example.com>");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_missing_fields() -> TestResult {
        let state = test_state(None, None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/send")
            .json(&serde_json::json!({ "to": "email@example.com" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<ErrorResponse>();

        assert_eq!(json.error, "Missing required fields: to, subject, html");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_invalid_address() -> TestResult {
        let state = test_state(None, None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/send")
            .json(&SendEmailBody::new("not an email"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<ErrorResponse>();

        assert_eq!(json.error, "Please provide a valid email address");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_failure_carries_the_mailer_error() -> TestResult {
        let mut campaigns = MockCampaignService::new();

        campaigns
            .expect_send_single()
            .times(1)
            .returning(|_| Err(MailerError::NotInitialized));

        let state = test_state(Some(campaigns), None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/send")
            .json(&SendEmailBody::new("email@example.com"))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = response.json::<ErrorResponse>();

        assert_eq!(json.error, "Email transporter not initialized");

        Ok(())
    }
}
