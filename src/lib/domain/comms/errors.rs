//! Error types for outbound email

use lettre::{address::AddressError, error::Error};
use thiserror::Error;

/// Errors that can occur when assembling an outbound email
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    /// The subject is empty
    #[error("Email subject must not be empty")]
    EmptySubject,

    /// The HTML body is empty
    #[error("Email body must not be empty")]
    EmptyHtmlBody,
}

/// Errors that can occur when sending an email
#[derive(Debug, Error)]
pub enum MailerError {
    /// The transport session was never established
    #[error("Email transporter not initialized")]
    NotInitialized,

    /// A sender or recipient address could not be parsed
    #[error("Invalid email address")]
    InvalidAddress,

    /// The message could not be assembled
    #[error("Could not build email message: {0}")]
    BuildMessage(String),

    /// The SMTP server rejected or failed the send
    #[error("{0}")]
    Transport(String),
}

impl From<AddressError> for MailerError {
    fn from(_err: AddressError) -> Self {
        MailerError::InvalidAddress
    }
}

impl From<Error> for MailerError {
    fn from(err: Error) -> Self {
        MailerError::BuildMessage(err.to_string())
    }
}
