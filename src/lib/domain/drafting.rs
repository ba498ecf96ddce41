//! AI-assisted email drafting

mod models;

pub mod client;
pub mod errors;
pub mod service;

pub use client::{ChatClient, ChatMessage, ChatRequest, ChatRole};
pub use errors::DraftingError;
pub use models::{BulkTemplate, DraftFormat, DraftLength, Improvement, Tone};
pub use service::{DraftingService, DraftingServiceImpl};

#[cfg(test)]
pub mod tests {
    pub use super::client::MockChatClient;
    pub use super::service::MockDraftingService;
}
