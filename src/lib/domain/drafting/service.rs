//! Drafting service module

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

#[cfg(test)]
use mockall::mock;

use crate::domain::drafting::{
    client::{ChatClient, ChatMessage, ChatRequest},
    errors::DraftingError,
    models::{BulkTemplate, DraftFormat, DraftLength, Improvement, Tone},
};

lazy_static! {
    static ref HTML_FENCE_REGEX: Regex = Regex::new("```html\n?").unwrap();
    static ref FENCE_REGEX: Regex = Regex::new("```\n?").unwrap();
    static ref DOCTYPE_REGEX: Regex = Regex::new(r"(?i)<!DOCTYPE[^>]*>").unwrap();
    static ref HTML_OPEN_REGEX: Regex = Regex::new(r"(?i)<html[^>]*>").unwrap();
    static ref HTML_CLOSE_REGEX: Regex = Regex::new(r"(?i)</html>").unwrap();
    static ref HEAD_REGEX: Regex = Regex::new(r"(?is)<head[^>]*>.*?</head>").unwrap();
    static ref BODY_OPEN_REGEX: Regex = Regex::new(r"(?i)<body[^>]*>").unwrap();
    static ref BODY_CLOSE_REGEX: Regex = Regex::new(r"(?i)</body>").unwrap();
    static ref STYLE_REGEX: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    static ref NUMBERED_LINE_REGEX: Regex = Regex::new(r"^\d+[.)]").unwrap();
    static ref BULLET_PREFIX_REGEX: Regex = Regex::new(r"(?m)^[-*•]\s+").unwrap();
    static ref EXTRA_BREAKS_REGEX: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref NUMBERED_PREFIX_REGEX: Regex = Regex::new(r"(?m)^\d+\.\s+").unwrap();
}

/// How many prior conversation turns are kept when chatting.
const CHAT_HISTORY_WINDOW: usize = 8;

/// Reply used when the model returns no chat content.
const CHAT_FALLBACK: &str = "Sorry, I could not understand that. Can you try asking again?";

/// Strip code fences and full-document HTML structure from a model reply,
/// leaving only body content.
fn strip_document_markup(content: &str) -> String {
    let content = HTML_FENCE_REGEX.replace_all(content, "");
    let content = FENCE_REGEX.replace_all(&content, "");
    let content = content.trim();
    let content = DOCTYPE_REGEX.replace_all(content, "");
    let content = HTML_OPEN_REGEX.replace_all(&content, "");
    let content = HTML_CLOSE_REGEX.replace_all(&content, "");
    let content = HEAD_REGEX.replace_all(&content, "");
    let content = BODY_OPEN_REGEX.replace_all(&content, "");
    let content = BODY_CLOSE_REGEX.replace_all(&content, "");
    let content = STYLE_REGEX.replace_all(&content, "");

    content.trim().to_string()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Drafting service
#[async_trait]
pub trait DraftingService: Clone + Send + Sync + 'static {
    /// Generate fresh email copy from a prompt.
    ///
    /// # Arguments
    /// * `prompt` - What the email should be about.
    /// * `tone` - The requested tone of voice.
    /// * `length` - The requested length of the copy.
    /// * `recipient` - An optional recipient to address the email to.
    /// * `format` - Whether to produce simple HTML or plain text.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the generated copy, or an
    /// [`Err`] containing a [`DraftingError`] if generation failed.
    async fn generate(
        &self,
        prompt: &str,
        tone: Tone,
        length: DraftLength,
        recipient: Option<String>,
        format: DraftFormat,
    ) -> Result<String, DraftingError>;

    /// Revise existing email copy.
    ///
    /// # Arguments
    /// * `content` - The copy to revise.
    /// * `improvement` - The kind of revision to apply.
    /// * `target_tone` - The tone to steer towards, for tone revisions.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the revised copy, or an
    /// [`Err`] containing a [`DraftingError`] if the revision failed.
    async fn improve(
        &self,
        content: &str,
        improvement: Improvement,
        target_tone: Option<Tone>,
    ) -> Result<String, DraftingError>;

    /// Suggest subject lines for existing email copy.
    ///
    /// # Arguments
    /// * `content` - The email copy to write subject lines for.
    /// * `count` - How many suggestions to return.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing at most `count` subject
    /// lines, or an [`Err`] containing a [`DraftingError`] if the request
    /// failed.
    async fn subjects(&self, content: &str, count: usize) -> Result<Vec<String>, DraftingError>;

    /// Generate a personalisable template for a bulk campaign.
    ///
    /// # Arguments
    /// * `description` - What the campaign is about.
    /// * `columns` - The CSV columns available as placeholders.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing a [`BulkTemplate`], or an
    /// [`Err`] containing a [`DraftingError`] if the model's reply was not
    /// a valid template.
    async fn bulk_template(
        &self,
        description: &str,
        columns: &[String],
    ) -> Result<BulkTemplate, DraftingError>;

    /// Answer a question in the in-app assistant conversation.
    ///
    /// # Arguments
    /// * `message` - The user's latest message.
    /// * `history` - Prior turns of the conversation, oldest first.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the assistant's reply, or an
    /// [`Err`] containing a [`DraftingError`] if the request failed.
    async fn chat(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<String, DraftingError>;
}

#[cfg(test)]
mock! {
    pub DraftingService {}

    impl Clone for DraftingService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl DraftingService for DraftingService {
        async fn generate(
            &self,
            prompt: &str,
            tone: Tone,
            length: DraftLength,
            recipient: Option<String>,
            format: DraftFormat,
        ) -> Result<String, DraftingError>;

        async fn improve(
            &self,
            content: &str,
            improvement: Improvement,
            target_tone: Option<Tone>,
        ) -> Result<String, DraftingError>;

        async fn subjects(&self, content: &str, count: usize) -> Result<Vec<String>, DraftingError>;

        async fn bulk_template(
            &self,
            description: &str,
            columns: &[String],
        ) -> Result<BulkTemplate, DraftingError>;

        async fn chat(
            &self,
            message: &str,
            history: Vec<ChatMessage>,
        ) -> Result<String, DraftingError>;
    }
}

/// Drafting service implementation
#[derive(Debug, Clone)]
pub struct DraftingServiceImpl<C>
where
    C: ChatClient,
{
    client: Arc<C>,
}

impl<C> DraftingServiceImpl<C>
where
    C: ChatClient,
{
    /// Create a new drafting service
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> DraftingService for DraftingServiceImpl<C>
where
    C: ChatClient,
{
    async fn generate(
        &self,
        prompt: &str,
        tone: Tone,
        length: DraftLength,
        recipient: Option<String>,
        format: DraftFormat,
    ) -> Result<String, DraftingError> {
        let tone_description = tone.description();
        let length_description = length.description();

        let (system_prompt, mut user_prompt, closing) = match format {
            DraftFormat::Plain => (
                format!(
                    "You are an expert email writer. Generate clean, readable plain text email content.\n\
                     The email should be {tone_description} in tone and approximately {length_description} in length.\n\
                     Return only the plain text email content without any HTML tags, markdown, or formatting. Just the text."
                ),
                format!("Write a plain text email in a {tone_description} tone about: {prompt}"),
                "\n\nReturn only plain text, no HTML, no formatting.",
            ),
            DraftFormat::Html => (
                format!(
                    "You are an expert email writer. Generate clean, simple HTML email content.\n\
                     IMPORTANT: \n\
                     - Use ONLY simple HTML tags like <p>, <h1>, <h2>, <strong>, <em>, <br>, <a>\n\
                     - Do NOT include DOCTYPE, <html>, <head>, <body>, or <style> tags\n\
                     - Do NOT include inline styles or complex formatting\n\
                     - Keep it simple and readable - just the email body content\n\
                     The email should be {tone_description} in tone and approximately {length_description} in length.\n\
                     Return only the simple HTML body content without any explanations, markdown, or full HTML document structure."
                ),
                format!("Write a simple email in a {tone_description} tone about: {prompt}"),
                "\n\nUse only simple HTML tags like <p>, <h2>, <strong>. No styles, no full HTML structure.",
            ),
        };

        if let Some(recipient) = recipient {
            user_prompt.push_str(&format!("\n\nRecipient: {recipient}"));
        }

        user_prompt.push_str(closing);

        let reply = self
            .client
            .complete(ChatRequest::new(
                vec![
                    ChatMessage::system(system_prompt),
                    ChatMessage::user(user_prompt),
                ],
                0.7,
                1000,
            ))
            .await?;

        Ok(strip_document_markup(&reply))
    }

    async fn improve(
        &self,
        content: &str,
        improvement: Improvement,
        target_tone: Option<Tone>,
    ) -> Result<String, DraftingError> {
        let description = improvement.description(target_tone);

        let system_prompt = format!(
            "You are an expert email editor. {}.\n\
             IMPORTANT: \n\
             - Use ONLY simple HTML tags like <p>, <h1>, <h2>, <strong>, <em>, <br>, <a>\n\
             - Do NOT include DOCTYPE, <html>, <head>, <body>, or <style> tags\n\
             - Do NOT add inline styles or complex formatting\n\
             - Keep it simple and readable - just the email body content\n\
             Return only the improved simple HTML body content without any explanations, markdown, or full HTML document structure.",
            capitalize_first(&description)
        );

        let user_prompt = format!("Improve this email content ({description}):\n\n{content}");

        let reply = self
            .client
            .complete(ChatRequest::new(
                vec![
                    ChatMessage::system(system_prompt),
                    ChatMessage::user(user_prompt),
                ],
                0.5,
                1500,
            ))
            .await?;

        Ok(strip_document_markup(&reply))
    }

    async fn subjects(&self, content: &str, count: usize) -> Result<Vec<String>, DraftingError> {
        let system_prompt = "You are an expert email marketer. Generate compelling, concise subject lines for emails.\n\
                             Return only the subject lines, one per line, without numbering or bullet points.";

        let user_prompt =
            format!("Generate {count} subject line options for this email content:\n\n{content}");

        let reply = self
            .client
            .complete(ChatRequest::new(
                vec![
                    ChatMessage::system(system_prompt),
                    ChatMessage::user(user_prompt),
                ],
                0.8,
                200,
            ))
            .await?;

        Ok(reply
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !NUMBERED_LINE_REGEX.is_match(line))
            .take(count)
            .map(String::from)
            .collect())
    }

    async fn bulk_template(
        &self,
        description: &str,
        columns: &[String],
    ) -> Result<BulkTemplate, DraftingError> {
        let system_prompt = "You are an expert email marketer. Generate email templates for bulk campaigns.\n\
                             The template should use placeholders like {{name}}, {{email}}, etc. for personalization.\n\
                             IMPORTANT for HTML field:\n\
                             - Use ONLY simple HTML tags like <p>, <h1>, <h2>, <strong>, <em>, <br>, <a>\n\
                             - Do NOT include DOCTYPE, <html>, <head>, <body>, or <style> tags\n\
                             - Do NOT include inline styles or complex formatting\n\
                             - Keep it simple and readable - just the email body content\n\
                             You must return ONLY a valid JSON object with \"subject\" and \"html\" fields. The HTML should be simple and professional.\n\
                             Do not include any text before or after the JSON object.";

        let user_prompt = format!(
            "Generate an email template for: {description}\n\n\
             Available CSV columns: {columns}\n\n\
             Use placeholders like {{{{columnName}}}} in the template.",
            columns = columns.join(", ")
        );

        let reply = self
            .client
            .complete(
                ChatRequest::new(
                    vec![
                        ChatMessage::system(system_prompt),
                        ChatMessage::user(user_prompt),
                    ],
                    0.7,
                    1500,
                )
                .expecting_json(),
            )
            .await?;

        let parsed: Value = serde_json::from_str(&reply)?;

        Ok(BulkTemplate {
            subject: parsed
                .get("subject")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            html: parsed
                .get("html")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    async fn chat(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<String, DraftingError> {
        let system_prompt = "You are a friendly and helpful assistant for a bulk email application called BulkEmail Pro. \n\n\
                             This application helps users send emails through SMTP. Here's what it can do:\n\n\
                             1. Single Email Sending - Users can send individual emails with HTML content\n\
                             2. Bulk Email Sending - Users can upload CSV files and send personalized emails to multiple recipients using templates with placeholders like {{name}}, {{email}}, etc.\n\
                             3. SMTP Configuration - Works with Gmail, SendGrid, AWS SES, Mailgun, and other SMTP providers\n\
                             4. Email Logs - Users can view logs of sent emails, errors, and delivery status\n\
                             5. AI Features - The app has AI tools to generate email content, improve emails, suggest subject lines, and generate bulk email templates\n\n\
                             When users ask questions:\n\
                             - Answer in a simple, conversational way like you're talking to a friend\n\
                             - No special characters, bullet points, or fancy formatting - just plain natural text\n\
                             - Be helpful and explain things clearly\n\
                             - If they ask about how to use the app, guide them step by step\n\
                             - If they ask about email writing, give practical advice\n\
                             - Keep responses natural and human-like, not robotic\n\n\
                             Remember: Keep it simple, friendly, and human. No lists with dashes or special formatting. Just talk naturally.";

        let skip = history.len().saturating_sub(CHAT_HISTORY_WINDOW);

        let mut messages = Vec::with_capacity(history.len() - skip + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.into_iter().skip(skip));
        messages.push(ChatMessage::user(message));

        let reply = self
            .client
            .complete(ChatRequest::new(messages, 0.9, 400))
            .await?;

        let reply = if reply.is_empty() {
            CHAT_FALLBACK.to_string()
        } else {
            reply
        };

        let reply = BULLET_PREFIX_REGEX.replace_all(&reply, "");
        let reply = EXTRA_BREAKS_REGEX.replace_all(&reply, "\n\n");
        let reply = NUMBERED_PREFIX_REGEX.replace_all(&reply, "");

        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::drafting::{client::ChatRole, tests::MockChatClient};

    use super::*;

    #[test]
    fn test_strip_document_markup_unwraps_full_documents() {
        let reply = "```html\n<!DOCTYPE html>\n<html>\n<head><title>x</title></head>\n<body>\n<p>Hello</p>\n<style>p { color: red; }</style>\n</body>\n</html>\n```";

        assert_eq!(strip_document_markup(reply), "<p>Hello</p>");
    }

    #[test]
    fn test_strip_document_markup_leaves_simple_content_alone() {
        assert_eq!(
            strip_document_markup("<p>Hello <strong>there</strong></p>"),
            "<p>Hello <strong>there</strong></p>"
        );
    }

    #[tokio::test]
    async fn test_generate_html_builds_prompts_and_strips_markup() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.temperature == 0.7
                    && request.max_tokens == 1000
                    && !request.json_response
                    && request.messages.len() == 2
                    && request.messages[0].role == ChatRole::System
                    && request.messages[0].content.contains("warm and friendly")
                    && request.messages[0].content.contains("2-3 sentences")
                    && request.messages[1].content.starts_with(
                        "Write a simple email in a warm and friendly tone about: a spring sale",
                    )
                    && request.messages[1].content.ends_with("No styles, no full HTML structure.")
            })
            .returning(|_| Ok("```html\n<html><body><p>Sale!</p></body></html>\n```".to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let content = service
            .generate(
                "a spring sale",
                Tone::Friendly,
                DraftLength::Short,
                None,
                DraftFormat::Html,
            )
            .await?;

        assert_eq!(content, "<p>Sale!</p>");

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_plain_mentions_recipient() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.messages[0]
                    .content
                    .starts_with("You are an expert email writer. Generate clean, readable plain text")
                    && request.messages[1].content.contains("\n\nRecipient: Dana\n\n")
                    && request.messages[1].content.ends_with("no HTML, no formatting.")
            })
            .returning(|_| Ok("Hi Dana".to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let content = service
            .generate(
                "a quick check-in",
                Tone::Professional,
                DraftLength::Medium,
                Some("Dana".to_string()),
                DraftFormat::Plain,
            )
            .await?;

        assert_eq!(content, "Hi Dana");

        Ok(())
    }

    #[tokio::test]
    async fn test_improve_capitalizes_the_instruction() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.temperature == 0.5
                    && request.max_tokens == 1500
                    && request.messages[0].content.starts_with(
                        "You are an expert email editor. Adjust the tone to be more casual.",
                    )
                    && request.messages[1].content.starts_with(
                        "Improve this email content (adjust the tone to be more casual):",
                    )
            })
            .returning(|_| Ok("<p>Hey!</p>".to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let content = service
            .improve("<p>Greetings.</p>", Improvement::Tone, Some(Tone::Casual))
            .await?;

        assert_eq!(content, "<p>Hey!</p>");

        Ok(())
    }

    #[tokio::test]
    async fn test_subjects_filters_numbered_and_blank_lines() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.temperature == 0.8
                    && request.max_tokens == 200
                    && request.messages[1]
                        .content
                        .starts_with("Generate 3 subject line options")
            })
            .returning(|_| {
                Ok("Big News Inside\n\n1. Numbered Option\n2) Another Numbered\n  Your Spring Update  \nOne Last Idea\nToo Many".to_string())
            });

        let service = DraftingServiceImpl::new(Arc::new(client));

        let subjects = service.subjects("<p>Spring sale</p>", 3).await?;

        assert_eq!(
            subjects,
            vec!["Big News Inside", "Your Spring Update", "One Last Idea"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_template_parses_the_json_reply() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.json_response
                    && request.temperature == 0.7
                    && request.max_tokens == 1500
                    && request.messages[1]
                        .content
                        .contains("Available CSV columns: email, name, city")
            })
            .returning(|_| {
                Ok(r#"{"subject": "Hello {{name}}", "html": "<p>Hi {{name}} from {{city}}</p>"}"#
                    .to_string())
            });

        let service = DraftingServiceImpl::new(Arc::new(client));

        let columns = vec!["email".to_string(), "name".to_string(), "city".to_string()];
        let template = service.bulk_template("spring sale", &columns).await?;

        assert_eq!(template.subject, "Hello {{name}}");
        assert_eq!(template.html, "<p>Hi {{name}} from {{city}}</p>");

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_template_rejects_replies_that_are_not_bare_json() {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .returning(|_| Ok("Here is your template: subject and html".to_string()));

        client.expect_complete().times(1).returning(|_| {
            Ok("```json\n{\"subject\": \"Sale\", \"html\": \"<p>Hi</p>\"}\n```".to_string())
        });

        let service = DraftingServiceImpl::new(Arc::new(client));

        let prose = service
            .bulk_template("spring sale", &["email".to_string()])
            .await;

        assert!(matches!(prose, Err(DraftingError::TemplateParse(_))));

        let fenced = service
            .bulk_template("spring sale", &["email".to_string()])
            .await;

        assert!(matches!(fenced, Err(DraftingError::TemplateParse(_))));
    }

    #[tokio::test]
    async fn test_bulk_template_defaults_missing_fields_to_empty() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .returning(|_| Ok(r#"{"subject": "Just a subject"}"#.to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let template = service
            .bulk_template("spring sale", &["email".to_string()])
            .await?;

        assert_eq!(template.subject, "Just a subject");
        assert_eq!(template.html, "");

        Ok(())
    }

    #[tokio::test]
    async fn test_chat_keeps_the_last_eight_turns() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.temperature == 0.9
                    && request.max_tokens == 400
                    && request.messages.len() == 10
                    && request.messages[0].role == ChatRole::System
                    && request.messages[1].content == "turn 2"
                    && request.messages[9].content == "latest question"
            })
            .returning(|_| Ok("Happy to help.".to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let history: Vec<ChatMessage> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("turn {i}"))
                } else {
                    ChatMessage::assistant(format!("turn {i}"))
                }
            })
            .collect();

        let reply = service.chat("latest question", history).await?;

        assert_eq!(reply, "Happy to help.");

        Ok(())
    }

    #[tokio::test]
    async fn test_chat_falls_back_when_the_model_is_silent() -> TestResult {
        let mut client = MockChatClient::new();

        client.expect_complete().returning(|_| Ok(String::new()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let reply = service.chat("hello?", Vec::new()).await?;

        assert_eq!(
            reply,
            "Sorry, I could not understand that. Can you try asking again?"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_chat_scrubs_list_formatting() -> TestResult {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .returning(|_| Ok("- First point\n\n\n\n2. Second point\n• Third point".to_string()));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let reply = service.chat("how do I start?", Vec::new()).await?;

        assert_eq!(reply, "First point\n\nSecond point\nThird point");

        Ok(())
    }

    #[tokio::test]
    async fn test_client_errors_surface_unchanged() {
        let mut client = MockChatClient::new();

        client
            .expect_complete()
            .returning(|_| Err(DraftingError::Api("connection refused".to_string())));

        let service = DraftingServiceImpl::new(Arc::new(client));

        let result = service
            .generate(
                "anything",
                Tone::Professional,
                DraftLength::Medium,
                None,
                DraftFormat::Html,
            )
            .await;

        assert!(matches!(result, Err(DraftingError::Api(message)) if message == "connection refused"));
    }
}
