//! OpenAI-compatible chat completion client

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::drafting::{ChatClient, ChatRequest, DraftingError};

/// Timeout applied to every completion request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI API configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct OpenAiConfig {
    /// The API key used to authenticate
    #[clap(long, env = "OPENAI_API_KEY")]
    pub api_key: String,

    /// The chat completion model
    #[clap(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// The base URL of the OpenAI-compatible API
    #[clap(
        long,
        env = "OPENAI_BASE_URL",
        default_value = "https://api.openai.com/v1"
    )]
    pub base_url: String,
}

/// OpenAI chat client
#[derive(Clone, Debug)]
pub struct OpenAiChatClient {
    config: OpenAiConfig,
    http: Client,
}

impl OpenAiChatClient {
    /// Create a new chat client
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { config, http })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    messages: Vec<PayloadMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct PayloadMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, DraftingError> {
        let payload = CompletionPayload {
            model: &self.config.model,
            messages: request
                .messages
                .iter()
                .map(|message| PayloadMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(DraftingError::Api(format!("HTTP {status}: {body}")));
        }

        let completion: CompletionResponse = response.json().await?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::drafting::ChatMessage;

    use super::*;

    fn client(base_url: &str) -> OpenAiChatClient {
        OpenAiChatClient::new(OpenAiConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: base_url.to_string(),
        })
        .expect("client should build")
    }

    #[test]
    fn test_completions_url_tolerates_trailing_slashes() {
        assert_eq!(
            client("https://api.openai.com/v1/").completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client("http://localhost:8080/v1").completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_payload_omits_response_format_for_text_replies() -> TestResult {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")], 0.7, 100);

        let payload = CompletionPayload {
            model: "gpt-4o-mini",
            messages: request
                .messages
                .iter()
                .map(|message| PayloadMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let value = serde_json::to_value(&payload)?;

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert!(value.get("response_format").is_none());

        Ok(())
    }

    #[test]
    fn test_payload_requests_json_object_replies_when_asked() -> TestResult {
        let request = ChatRequest::new(vec![ChatMessage::system("rules")], 0.7, 100).expecting_json();

        let payload = CompletionPayload {
            model: "gpt-4o-mini",
            messages: Vec::new(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let value = serde_json::to_value(&payload)?;

        assert_eq!(value["response_format"]["type"], "json_object");

        Ok(())
    }

    #[test]
    fn test_replies_without_content_deserialize_as_none() -> TestResult {
        let completion: CompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#)?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        assert_eq!(content, None);

        Ok(())
    }
}
