//! SMTP email service implementation

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::domain::comms::{errors::MailerError, Mailer, OutboundEmail};

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[clap(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub host: String,

    /// The SMTP port
    #[clap(long, env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// Connect over implicit TLS instead of upgrading with STARTTLS
    #[clap(long, env = "SMTP_SECURE", default_value = "false")]
    pub secure: bool,

    /// The SMTP username
    #[clap(long, env = "SMTP_USER", default_value = "")]
    pub username: String,

    /// The SMTP password
    #[clap(long, env = "SMTP_PASSWORD", default_value = "")]
    pub password: String,

    /// The sender email address, falls back to the SMTP username
    #[clap(long, env = "FROM_EMAIL", default_value = "")]
    pub from_email: String,

    /// The sender display name
    #[clap(long, env = "FROM_NAME", default_value = "Bulk Email Sender")]
    pub from_name: String,
}

impl SmtpConfig {
    /// The effective sender address
    pub fn sender(&self) -> &str {
        if self.from_email.is_empty() {
            &self.username
        } else {
            &self.from_email
        }
    }
}

/// SMTP mailer
#[derive(Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    ///
    /// The transport session is established once here. When it cannot be
    /// built, the mailer stays usable but every send fails with
    /// [`MailerError::NotInitialized`].
    pub fn new(config: SmtpConfig) -> Self {
        let transport = match Self::build_transport(&config) {
            Ok(transport) => Some(transport),
            Err(err) => {
                tracing::error!(error = %err, "Failed to initialize email transporter");
                None
            }
        };

        Self { config, transport }
    }

    fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let relay = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        Ok(relay.credentials(creds).port(config.port).build())
    }

    fn build_message(
        &self,
        email: &OutboundEmail,
        message_id: &str,
    ) -> Result<Message, MailerError> {
        let sender = Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config.sender().parse()?,
        );

        let mut builder = Message::builder()
            .from(sender)
            .to(email.to().as_str().parse()?)
            .subject(email.subject().to_string())
            .message_id(Some(message_id.to_string()));

        for cc in email.cc() {
            builder = builder.cc(cc.parse()?);
        }

        for bcc in email.bcc() {
            builder = builder.bcc(bcc.parse()?);
        }

        Ok(builder.multipart(MultiPart::alternative_plain_html(
            email.resolved_text_body(),
            email.html_body().to_string(),
        ))?)
    }

    fn next_message_id(&self) -> String {
        let domain = self
            .config
            .sender()
            .split('@')
            .nth(1)
            .unwrap_or("localhost");

        format!("<{}@{}>", Uuid::now_v7(), domain)
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> bool {
        match &self.transport {
            Some(transport) => transport.test_connection().await.unwrap_or(false),
            None => false,
        }
    }

    async fn send(&self, email: &OutboundEmail) -> Result<String, MailerError> {
        let Some(transport) = &self.transport else {
            return Err(MailerError::NotInitialized);
        };

        let message_id = self.next_message_id();
        let message = self.build_message(email, &message_id)?;

        match transport.send(message).await {
            Ok(_) => Ok(message_id),
            Err(err) => Err(MailerError::Transport(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::comms::EmailAddress;

    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            username: "user@example.com".to_string(),
            password: "hunter2".to_string(),
            from_email: String::new(),
            from_name: "Bulk Email Sender".to_string(),
        })
    }

    fn email() -> OutboundEmail {
        OutboundEmail::new(
            EmailAddress::new("to@example.com").expect("valid email"),
            "Hello",
            "<p>Hello</p>",
        )
        .expect("valid email message")
    }

    #[test]
    fn test_sender_falls_back_to_the_username() {
        let mut config = SmtpConfig {
            username: "user@example.com".to_string(),
            ..SmtpConfig::default()
        };

        assert_eq!(config.sender(), "user@example.com");

        config.from_email = "noreply@example.com".to_string();

        assert_eq!(config.sender(), "noreply@example.com");
    }

    #[tokio::test]
    async fn test_message_ids_carry_the_sender_domain() {
        let id = mailer().next_message_id();

        assert!(id.starts_with('<'));
        assert!(id.ends_with("@example.com>"));
    }

    #[tokio::test]
    async fn test_build_message_accepts_copies() -> TestResult {
        let email = email().with_copies(
            vec!["cc@example.com".to_string()],
            vec!["bcc@example.com".to_string()],
        );

        let message = mailer().build_message(&email, "<id@example.com>")?;

        let formatted = String::from_utf8(message.formatted())?;

        assert!(formatted.contains("cc@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn test_build_message_rejects_invalid_copies() {
        let email = email().with_copies(vec!["not an address".to_string()], Vec::new());

        let result = mailer().build_message(&email, "<id@example.com>");

        assert!(matches!(result, Err(MailerError::InvalidAddress)));
    }

    #[tokio::test]
    async fn test_send_without_a_session_fails_fast() {
        let mailer = SmtpMailer {
            config: SmtpConfig::default(),
            transport: None,
        };

        let err = mailer.send(&email()).await.unwrap_err();

        assert!(matches!(err, MailerError::NotInitialized));
        assert_eq!(err.to_string(), "Email transporter not initialized");
        assert!(!mailer.verify().await);
    }
}
