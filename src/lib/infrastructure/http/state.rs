//! Application state module

use std::sync::Arc;

use std::fmt;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::domain::{
    campaigns::CampaignService, drafting::DraftingService, journal::Journal,
};

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct AppConfig {
    /// The base delay between two sends in a bulk batch, in milliseconds
    #[arg(long, env = "EMAIL_DELAY_MS", default_value = "50")]
    pub email_delay_ms: u64,

    /// The most recipients a single bulk request may address
    #[arg(long, env = "MAX_BULK_EMAILS", default_value = "10000")]
    pub max_bulk_emails: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            email_delay_ms: 50,
            max_bulk_emails: 10_000,
        }
    }
}

/// Global application state
#[derive(Clone)]
pub struct AppState<C: CampaignService, D: DraftingService, J: Journal> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// The application configuration
    pub config: AppConfig,

    /// Campaign service
    pub campaigns: Arc<C>,

    /// Drafting service
    pub drafting: Arc<D>,

    /// Activity journal
    pub journal: Arc<J>,
}

/// Implementation of the application state
impl<C, D, J> AppState<C, D, J>
where
    C: CampaignService,
    D: DraftingService,
    J: Journal,
{
    /// Create a new application state
    pub fn new(config: AppConfig, campaigns: C, drafting: D, journal: J) -> Self {
        Self {
            config,
            start_time: Utc::now(),
            campaigns: Arc::new(campaigns),
            drafting: Arc::new(drafting),
            journal: Arc::new(journal),
        }
    }
}

impl<C, D, J> fmt::Debug for AppState<C, D, J>
where
    C: CampaignService,
    D: DraftingService,
    J: Journal,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("config", &self.config)
            .field("campaigns", &"CampaignService")
            .field("drafting", &"DraftingService")
            .field("journal", &"Journal")
            .finish()
    }
}

#[cfg(test)]
use crate::domain::{
    campaigns::tests::MockCampaignService, drafting::tests::MockDraftingService,
    journal::MockJournal,
};

#[cfg(test)]
pub fn test_state(
    campaigns: Option<MockCampaignService>,
    drafting: Option<MockDraftingService>,
    journal: Option<MockJournal>,
) -> AppState<MockCampaignService, MockDraftingService, MockJournal> {
    let campaigns = campaigns
        .map(Arc::new)
        .unwrap_or_else(|| Arc::new(MockCampaignService::new()));

    let drafting = drafting
        .map(Arc::new)
        .unwrap_or_else(|| Arc::new(MockDraftingService::new()));

    // Handlers journal freely, so the default mock accepts any entry.
    let journal = journal.map(Arc::new).unwrap_or_else(|| {
        let mut journal = MockJournal::new();
        journal.expect_append().returning(|_| ());
        Arc::new(journal)
    });

    AppState {
        start_time: Utc::now(),
        config: AppConfig::default(),
        campaigns,
        drafting,
        journal,
    }
}
