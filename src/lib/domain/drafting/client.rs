//! Chat completion client abstraction

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::drafting::errors::DraftingError;

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    /// Instructions that frame the conversation
    System,

    /// A message from the person using the application
    User,

    /// A previous reply from the model
    Assistant,
}

impl ChatRole {
    /// The wire label for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl From<&str> for ChatRole {
    fn from(label: &str) -> Self {
        match label {
            "system" => ChatRole::System,
            "assistant" => ChatRole::Assistant,
            _ => ChatRole::User,
        }
    }
}

/// A single message in a chat completion conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    /// Which party authored the message
    pub role: ChatRole,

    /// The message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// The conversation submitted to the model, in order
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on the number of tokens in the reply
    pub max_tokens: u32,

    /// Whether the model must reply with a single JSON object
    pub json_response: bool,
}

impl ChatRequest {
    /// Create a request for a free-form text reply
    pub fn new(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens,
            json_response: false,
        }
    }

    /// Require the reply to be a single JSON object
    pub fn expecting_json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Chat completion client
#[async_trait]
pub trait ChatClient: Clone + Send + Sync + 'static {
    /// Execute a chat completion request.
    ///
    /// # Arguments
    /// * `request` - The conversation and sampling parameters to submit.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the model's reply text, empty
    /// when the model returned no content, or an [`Err`] containing a
    /// [`DraftingError`] if the request could not be completed.
    async fn complete(&self, request: ChatRequest) -> Result<String, DraftingError>;
}

#[cfg(test)]
mock! {
    pub ChatClient {}

    impl Clone for ChatClient {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl ChatClient for ChatClient {
        async fn complete(&self, request: ChatRequest) -> Result<String, DraftingError>;
    }
}
