#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! REST API for the bulk mailer

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use bulk_mailer::{
    domain::{
        campaigns::{CampaignServiceImpl, PacingPolicy},
        drafting::DraftingServiceImpl,
    },
    infrastructure::{
        ai::open_ai::{OpenAiChatClient, OpenAiConfig},
        email::smtp::{SmtpConfig, SmtpMailer},
        http::{
            servers::{http::HttpServer, https::HttpsServer},
            state::{AppConfig, AppState},
            HttpServerConfig, Server,
        },
        journal::file::{FileJournal, JournalConfig},
    },
};
use clap::Parser;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The application configuration
    #[clap(flatten)]
    pub app: AppConfig,

    /// The SMTP relay configuration
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// The OpenAI API configuration
    #[clap(flatten)]
    pub open_ai: OpenAiConfig,

    /// The journal configuration
    #[clap(flatten)]
    pub journal: JournalConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Failed to load environment: {}", e);

        return Err(e.into());
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let journal = FileJournal::new(&args.journal)?;
    let mailer = SmtpMailer::new(args.smtp);
    let chat_client = OpenAiChatClient::new(args.open_ai)?;

    let pacing = PacingPolicy::new(Duration::from_millis(args.app.email_delay_ms));
    let campaigns = CampaignServiceImpl::new(Arc::new(mailer), Arc::new(journal.clone()), pacing);
    let drafting = DraftingServiceImpl::new(Arc::new(chat_client));

    let state = AppState::new(args.app, campaigns, drafting, journal);

    let http_server = HttpServer::new(state.clone(), &args.server).await?;

    if args.server.cert_path.is_some() && args.server.key_path.is_some() {
        let https_server = HttpsServer::new(state, &args.server).await?;

        let _ = tokio::join!(
            tokio::spawn(http_server.run()),
            tokio::spawn(https_server.run()),
        );
    } else {
        let _ = tokio::join!(tokio::spawn(http_server.run()));
    }

    Ok(())
}
