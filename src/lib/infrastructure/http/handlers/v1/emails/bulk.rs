//! Bulk email send handler

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        campaigns::{expand, parse_recipients, CampaignService, SendOutcome},
        comms::OutboundEmail,
        drafting::DraftingService,
        journal::{EntryCategory, Journal, JournalEntry},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Batches above this size get a warning in the journal
const LARGE_BATCH_WARNING_THRESHOLD: usize = 5000;

/// Bulk send form fields
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkSendBody {
    /// A CSV of recipients with at least an email column
    #[schema(value_type = String, format = Binary)]
    pub csv: String,

    /// The subject template
    #[schema(example = "Hi {{name}}")]
    pub subject: String,

    /// The HTML body template
    #[schema(example = "<p>Hi {{name}}</p>")]
    pub html: String,

    /// An optional plain text body template
    pub text: Option<String>,
}

/// Per-recipient outcome of a bulk send
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkOutcome {
    /// The recipient address
    pub email: String,

    /// Whether the message was accepted
    pub success: bool,

    /// Failure detail when the send failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SendOutcome> for BulkOutcome {
    fn from(outcome: SendOutcome) -> Self {
        Self {
            email: outcome.email,
            success: outcome.success,
            error: outcome.error,
        }
    }
}

/// Bulk send response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkSendResponse {
    /// Whether the batch was processed
    pub success: bool,

    /// Recipients addressed
    pub total: usize,

    /// Messages accepted by the relay
    pub sent: usize,

    /// Messages that failed
    pub failed: usize,

    /// Per-recipient outcomes, in CSV row order
    pub results: Vec<BulkOutcome>,
}

/// Returned when the CSV holds more recipients than the configured cap
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TooManyEmailsResponse {
    /// The error message
    pub error: String,

    /// The configured cap
    pub max_allowed: usize,

    /// How many recipients the CSV held
    pub received: usize,
}

/// Send a templated email to every recipient in a CSV
#[utoipa::path(
    post,
    operation_id = "bulk_send",
    tag = "Emails",
    path = "/api/v1/emails/bulk",
    request_body(content = BulkSendBody, content_type = "multipart/form-data"),
    responses(
        (status = StatusCode::OK, description = "The batch was processed", body = BulkSendResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Missing fields, an unusable CSV, or too many recipients", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut csv = None;
    let mut subject = None;
    let mut html = None;
    let mut text = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let value = field.text().await?;

        match name.as_str() {
            "csv" => csv = Some(value),
            "subject" => subject = Some(value),
            "html" => html = Some(value),
            "text" => text = Some(value),
            _ => {}
        }
    }

    let csv = csv.unwrap_or_default();
    let subject_template = subject.unwrap_or_default();
    let html_template = html.unwrap_or_default();
    let text_template = text.filter(|template| !template.is_empty());

    if csv.is_empty() || subject_template.is_empty() || html_template.is_empty() {
        return Err(ApiError::new_422(
            "Missing required fields: csv, subject, html",
        ));
    }

    let parsed = parse_recipients(&csv).map_err(|err| {
        state.journal.append(
            JournalEntry::error(EntryCategory::Email, "Failed to parse CSV")
                .with_field("error", err.to_string()),
        );
        ApiError::from(err)
    })?;

    state.journal.append(
        JournalEntry::info(EntryCategory::Email, "CSV parsed successfully")
            .with_field("total", parsed.summary.total)
            .with_field("valid", parsed.summary.valid)
            .with_field("invalid", parsed.summary.invalid),
    );

    if parsed.records.is_empty() {
        return Err(ApiError::new_422("No valid email addresses found in CSV"));
    }

    let max_allowed = state.config.max_bulk_emails;
    let received = parsed.records.len();

    if received > max_allowed {
        let response = TooManyEmailsResponse {
            error: format!(
                "Too many emails. Maximum allowed: {max_allowed}. Your CSV contains: {received}"
            ),
            max_allowed,
            received,
        };

        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response());
    }

    if received > LARGE_BATCH_WARNING_THRESHOLD {
        state.journal.append(
            JournalEntry::warn(EntryCategory::Email, "Large batch detected")
                .with_field("count", received)
                .with_field(
                    "suggestion",
                    "Consider splitting into smaller batches for better reliability",
                ),
        );
    }

    let mut emails = Vec::with_capacity(received);
    let mut build_failures = Vec::new();

    for (index, recipient) in parsed.records.iter().enumerate() {
        let subject_source = recipient
            .subject_override
            .as_deref()
            .unwrap_or(&subject_template);

        let subject_line = expand(subject_source, recipient);
        let html_body = expand(&html_template, recipient);

        let email = OutboundEmail::new(recipient.email.clone(), &subject_line, &html_body).map(
            |email| {
                email.with_text_body(
                    text_template
                        .as_deref()
                        .map(|template| expand(template, recipient)),
                )
            },
        );

        match email {
            Ok(email) => emails.push(email),
            Err(err) => build_failures.push((
                index,
                SendOutcome::failed(recipient.email.as_str(), &err.to_string()),
            )),
        }
    }

    let report = state.campaigns.send_batch(emails, None).await;

    let mut outcomes = report.outcomes().to_vec();

    for (index, failure) in build_failures {
        outcomes.insert(index, failure);
    }

    let total = outcomes.len();
    let sent = report.sent();
    let failed = total - sent;

    state.journal.append(
        JournalEntry::info(EntryCategory::Email, "Bulk email API completed")
            .with_field("total", total)
            .with_field("success", sent)
            .with_field("failed", failed),
    );

    let response = BulkSendResponse {
        success: true,
        total,
        sent,
        failed,
        results: outcomes.into_iter().map(BulkOutcome::from).collect(),
    };

    Ok(Json(response).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::{
        multipart::MultipartForm,
        TestServer,
    };
    use testresult::TestResult;

    use crate::{
        domain::{
            campaigns::{tests::MockCampaignService, BatchReport, SendOutcome},
            journal::MockJournal,
        },
        infrastructure::http::{errors::ErrorResponse, router, state::test_state},
    };

    use super::{BulkSendResponse, TooManyEmailsResponse};

    fn form(csv: &str, subject: &str, html: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("csv", csv)
            .add_text("subject", subject)
            .add_text("html", html)
    }

    fn delivered_report(emails: &[crate::domain::comms::OutboundEmail]) -> BatchReport {
        let mut report = BatchReport::new();

        for email in emails {
            report.record(SendOutcome::delivered(email.to().as_str()));
        }

        report
    }

    #[tokio::test]
    async fn test_bulk_send_expands_templates_per_recipient() -> TestResult {
        let mut campaigns = MockCampaignService::new();

        campaigns
            .expect_send_batch()
            .withf(|emails, _| {
                emails.len() == 2
                    && emails[0].subject() == "Hi Alice"
                    && emails[0].html_body() == "<p>Your plan: Pro</p>"
                    && emails[1].subject() == "Hi Valued Customer"
            })
            .times(1)
            .returning(|emails, _| delivered_report(&emails));

        let state = test_state(Some(campaigns), None, None);

        let csv = "email,name,plan\na@x.com,Alice,Pro\nb@x.com,,Basic\n";

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form(csv, "Hi {{name}}", "<p>Your plan: {{plan}}</p>"))
            .await;

        response.assert_status_ok();

        let json = response.json::<BulkSendResponse>();

        assert!(json.success);
        assert_eq!(json.total, 2);
        assert_eq!(json.sent, 2);
        assert_eq!(json.failed, 0);
        assert_eq!(json.results[0].email, "a@x.com");
        assert!(json.results[0].success);

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_prefers_the_subject_column() -> TestResult {
        let mut campaigns = MockCampaignService::new();

        campaigns
            .expect_send_batch()
            .withf(|emails, _| emails[0].subject() == "Your Pro invoice")
            .times(1)
            .returning(|emails, _| delivered_report(&emails));

        let state = test_state(Some(campaigns), None, None);

        let csv = "email,subject,plan\na@x.com,Your {{plan}} invoice,Pro\n";

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form(csv, "Fallback subject", "<p>Hello</p>"))
            .await;

        response.assert_status_ok();

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_missing_fields() -> TestResult {
        let state = test_state(None, None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(MultipartForm::new().add_text("subject", "Hello"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<ErrorResponse>();

        assert_eq!(json.error, "Missing required fields: csv, subject, html");

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_rejects_a_csv_without_valid_recipients() -> TestResult {
        let state = test_state(None, None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form("email\nnot-an-email\n", "Hello", "<p>Hello</p>"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<ErrorResponse>();

        assert_eq!(json.error, "No valid email addresses found in CSV");

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_enforces_the_recipient_cap() -> TestResult {
        let mut state = test_state(None, None, None);
        state.config.max_bulk_emails = 1;

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form(
                "email\na@x.com\nb@x.com\n",
                "Hello",
                "<p>Hello</p>",
            ))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<TooManyEmailsResponse>();

        assert_eq!(
            json.error,
            "Too many emails. Maximum allowed: 1. Your CSV contains: 2"
        );
        assert_eq!(json.max_allowed, 1);
        assert_eq!(json.received, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_warns_about_large_batches() -> TestResult {
        let mut campaigns = MockCampaignService::new();
        campaigns
            .expect_send_batch()
            .times(1)
            .returning(|emails, _| delivered_report(&emails));

        let mut journal = MockJournal::new();
        journal
            .expect_append()
            .withf(|entry| entry.message == "Large batch detected")
            .times(1)
            .returning(|_| ());
        journal.expect_append().returning(|_| ());

        let mut csv = String::from("email\n");
        for index in 0..5001 {
            csv.push_str(&format!("user{index}@x.com\n"));
        }

        let state = test_state(Some(campaigns), None, Some(journal));

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form(&csv, "Hello", "<p>Hello</p>"))
            .await;

        response.assert_status_ok();

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_send_counts_failures() -> TestResult {
        let mut campaigns = MockCampaignService::new();

        campaigns.expect_send_batch().returning(|emails, _| {
            let mut report = BatchReport::new();

            for (index, email) in emails.iter().enumerate() {
                if index == 0 {
                    report.record(SendOutcome::failed(email.to().as_str(), "Mailbox full"));
                } else {
                    report.record(SendOutcome::delivered(email.to().as_str()));
                }
            }

            report
        });

        let state = test_state(Some(campaigns), None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/emails/bulk")
            .multipart(form(
                "email\na@x.com\nb@x.com\n",
                "Hello",
                "<p>Hello</p>",
            ))
            .await;

        response.assert_status_ok();

        let json = response.json::<BulkSendResponse>();

        assert_eq!(json.total, 2);
        assert_eq!(json.sent, 1);
        assert_eq!(json.failed, 1);
        assert_eq!(json.results[0].error.as_deref(), Some("Mailbox full"));

        Ok(())
    }
}
