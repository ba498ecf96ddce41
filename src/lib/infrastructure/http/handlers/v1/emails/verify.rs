//! SMTP verification handler

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{campaigns::CampaignService, drafting::DraftingService, journal::Journal},
    infrastructure::http::state::AppState,
};

/// SMTP verification response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailResponse {
    /// Whether the SMTP connection is usable
    pub success: bool,

    /// A human-readable verdict
    #[schema(example = "SMTP connection verified successfully")]
    pub message: String,
}

/// Check the SMTP connection
#[utoipa::path(
    get,
    operation_id = "verify_email",
    tag = "Emails",
    path = "/api/v1/emails/verify",
    responses(
        (status = StatusCode::OK, description = "The SMTP connection works", body = VerifyEmailResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "The SMTP connection failed", body = VerifyEmailResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<C: CampaignService, D: DraftingService, J: Journal>(
    State(state): State<AppState<C, D, J>>,
) -> (StatusCode, Json<VerifyEmailResponse>) {
    if state.campaigns.verify_connectivity().await {
        (
            StatusCode::OK,
            Json(VerifyEmailResponse {
                success: true,
                message: "SMTP connection verified successfully".to_string(),
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(VerifyEmailResponse {
                success: false,
                message: "SMTP connection verification failed".to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::campaigns::tests::MockCampaignService,
        infrastructure::http::{router, state::test_state},
    };

    use super::VerifyEmailResponse;

    #[tokio::test]
    async fn test_verify_email_success() -> TestResult {
        let mut campaigns = MockCampaignService::new();
        campaigns
            .expect_verify_connectivity()
            .times(1)
            .returning(|| true);

        let state = test_state(Some(campaigns), None, None);

        let response = TestServer::new(router(state))?
            .get("/api/v1/emails/verify")
            .await;

        response.assert_status_ok();

        let json = response.json::<VerifyEmailResponse>();

        assert!(json.success);
        assert_eq!(json.message, "SMTP connection verified successfully");

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_email_failure() -> TestResult {
        let mut campaigns = MockCampaignService::new();
        campaigns
            .expect_verify_connectivity()
            .times(1)
            .returning(|| false);

        let state = test_state(Some(campaigns), None, None);

        let response = TestServer::new(router(state))?
            .get("/api/v1/emails/verify")
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = response.json::<VerifyEmailResponse>();

        assert!(!json.success);
        assert_eq!(json.message, "SMTP connection verification failed");

        Ok(())
    }
}
