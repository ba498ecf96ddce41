//! Campaign building and bulk sending.

mod batch;
mod recipients;
mod templates;

pub mod errors;
pub mod service;

pub use batch::{BatchReport, PacingPolicy, ProgressHook, SendOutcome};
pub use recipients::{parse_recipients, ParseSummary, ParsedRecipients, RecipientRecord};
pub use service::{CampaignService, CampaignServiceImpl};
pub use templates::expand;
