//! Campaign service module

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::sleep;

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    campaigns::{BatchReport, PacingPolicy, ProgressHook, SendOutcome},
    comms::{errors::MailerError, Mailer, OutboundEmail},
    journal::{EntryCategory, Journal, JournalEntry},
};

/// Campaign service
#[async_trait]
pub trait CampaignService: Clone + Send + Sync + 'static {
    /// Check that the mail transport can reach its server.
    async fn verify_connectivity(&self) -> bool;

    /// Send one email and journal the outcome.
    ///
    /// # Arguments
    /// * `email` - The [`OutboundEmail`] to deliver.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the assigned message id, or an
    /// [`Err`] containing a [`MailerError`] if the send failed.
    async fn send_single(&self, email: OutboundEmail) -> Result<String, MailerError>;

    /// Send a batch of emails sequentially, in input order.
    ///
    /// Every message is attempted exactly once; individual failures are
    /// captured in the report and never abort the batch. Pacing pauses are
    /// inserted between sends according to the configured policy.
    ///
    /// # Arguments
    /// * `emails` - The messages to deliver, in send order.
    /// * `progress` - An optional [`ProgressHook`] invoked after each message.
    ///
    /// # Returns
    /// A [`BatchReport`] with one outcome per message, in send order.
    async fn send_batch(
        &self,
        emails: Vec<OutboundEmail>,
        progress: Option<ProgressHook>,
    ) -> BatchReport;
}

#[cfg(test)]
mock! {
    pub CampaignService {}

    impl Clone for CampaignService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl CampaignService for CampaignService {
        async fn verify_connectivity(&self) -> bool;
        async fn send_single(&self, email: OutboundEmail) -> Result<String, MailerError>;
        async fn send_batch(
            &self,
            emails: Vec<OutboundEmail>,
            progress: Option<ProgressHook>,
        ) -> BatchReport;
    }
}

/// Campaign service implementation
#[derive(Debug, Clone)]
pub struct CampaignServiceImpl<M, J>
where
    M: Mailer,
    J: Journal,
{
    mailer: Arc<M>,
    journal: Arc<J>,
    pacing: PacingPolicy,
}

impl<M, J> CampaignServiceImpl<M, J>
where
    M: Mailer,
    J: Journal,
{
    /// Create a new campaign service
    pub fn new(mailer: Arc<M>, journal: Arc<J>, pacing: PacingPolicy) -> Self {
        Self {
            mailer,
            journal,
            pacing,
        }
    }

    async fn send_and_journal(&self, email: &OutboundEmail) -> Result<String, MailerError> {
        match self.mailer.send(email).await {
            Ok(message_id) => {
                self.journal.append(
                    JournalEntry::info(EntryCategory::Email, "Email sent successfully")
                        .with_field("messageId", message_id.as_str())
                        .with_field("to", email.to().as_str())
                        .with_field("subject", email.subject()),
                );

                Ok(message_id)
            }
            Err(err) => {
                self.journal.append(
                    JournalEntry::error(EntryCategory::Email, "Failed to send email")
                        .with_field("error", err.to_string())
                        .with_field("to", email.to().as_str())
                        .with_field("subject", email.subject()),
                );

                Err(err)
            }
        }
    }
}

#[async_trait]
impl<M, J> CampaignService for CampaignServiceImpl<M, J>
where
    M: Mailer,
    J: Journal,
{
    async fn verify_connectivity(&self) -> bool {
        let verified = self.mailer.verify().await;

        if verified {
            self.journal.append(JournalEntry::info(
                EntryCategory::Email,
                "SMTP connection verified",
            ));
        } else {
            self.journal.append(JournalEntry::error(
                EntryCategory::Email,
                "SMTP connection verification failed",
            ));
        }

        verified
    }

    async fn send_single(&self, email: OutboundEmail) -> Result<String, MailerError> {
        self.send_and_journal(&email).await
    }

    async fn send_batch(
        &self,
        emails: Vec<OutboundEmail>,
        progress: Option<ProgressHook>,
    ) -> BatchReport {
        let total = emails.len();
        let mut report = BatchReport::new();

        self.journal.append(
            JournalEntry::info(EntryCategory::Email, "Starting bulk email send")
                .with_field("total", total),
        );

        for (i, email) in emails.iter().enumerate() {
            let outcome = match self.send_and_journal(email).await {
                Ok(_) => SendOutcome::delivered(email.to().as_str()),
                Err(err) => SendOutcome::failed(email.to().as_str(), &err.to_string()),
            };

            report.record(outcome);

            if let Some(progress) = &progress {
                progress(report.total(), total, email);
            }

            if i + 1 < total {
                sleep(self.pacing.delay_between_sends(total)).await;
            }

            if let Some(pause) = self.pacing.cooldown_after(total, i + 1) {
                sleep(pause).await;
            }
        }

        self.journal.append(
            JournalEntry::info(EntryCategory::Email, "Bulk email send completed")
                .with_field("total", total)
                .with_field("success", report.sent())
                .with_field("failed", report.failed()),
        );

        report
    }
}
