//! Outbound email message

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::comms::{errors::MessageError, EmailAddress};

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// A fully specified email, ready to hand to a transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    /// The recipient of the email
    to: EmailAddress,

    /// The subject line
    subject: String,

    /// The HTML body
    html_body: String,

    /// The plain text body, if one was supplied
    text_body: Option<String>,

    /// Carbon copy recipients
    cc: Vec<String>,

    /// Blind carbon copy recipients
    bcc: Vec<String>,
}

impl OutboundEmail {
    /// Create a new outbound email
    pub fn new(to: EmailAddress, subject: &str, html_body: &str) -> Result<Self, MessageError> {
        if subject.is_empty() {
            return Err(MessageError::EmptySubject);
        }

        if html_body.is_empty() {
            return Err(MessageError::EmptyHtmlBody);
        }

        Ok(Self {
            to,
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            text_body: None,
            cc: Vec::new(),
            bcc: Vec::new(),
        })
    }

    /// Attach a plain text body; empty strings count as absent
    pub fn with_text_body(mut self, text_body: Option<String>) -> Self {
        self.text_body = text_body.filter(|text| !text.is_empty());
        self
    }

    /// Attach carbon copy and blind carbon copy recipients
    pub fn with_copies(mut self, cc: Vec<String>, bcc: Vec<String>) -> Self {
        self.cc = cc;
        self.bcc = bcc;
        self
    }

    /// Get the recipient
    pub fn to(&self) -> &EmailAddress {
        &self.to
    }

    /// Get the subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Get the HTML body
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// Get the carbon copy recipients
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Get the blind carbon copy recipients
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// The plain text body, deriving one from the HTML when none was
    /// supplied by removing markup tags. Best effort, not a full parse.
    pub fn resolved_text_body(&self) -> String {
        match &self.text_body {
            Some(text) => text.clone(),
            None => HTML_TAG_REGEX.replace_all(&self.html_body, "").to_string(),
        }
    }
}
