//! Append-only activity journal.
//!
//! The journal is the user-facing record of what the application has done,
//! kept separate from developer diagnostics. Entries are structured, carry a
//! category and severity, and can be queried back newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[cfg(test)]
use mockall::mock;

/// Severity of a journal entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine activity
    Info,

    /// Something unusual that did not prevent the operation
    Warn,

    /// A failed operation
    Error,
}

/// The subsystem a journal entry belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    /// Email sending activity
    Email,

    /// AI drafting activity
    Drafting,

    /// Everything else
    System,
}

/// A queryable slice of the journal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    /// Email activity only
    Emails,

    /// Error-level entries only
    Error,

    /// Every entry
    #[default]
    Combined,
}

/// Errors that can occur when reading the journal back
#[derive(Debug, Error)]
pub enum JournalError {
    /// The underlying store could not be read
    #[error("Failed to read logs")]
    ReadError(#[source] anyhow::Error),
}

/// One journal record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,

    /// Severity
    pub level: LogLevel,

    /// Human-readable summary
    pub message: String,

    /// Subsystem the entry belongs to
    pub category: EntryCategory,

    /// Structured context attached to the entry
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JournalEntry {
    /// Create an entry with the given severity
    pub fn new(level: LogLevel, category: EntryCategory, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            category,
            fields: Map::new(),
        }
    }

    /// Create an info-level entry
    pub fn info(category: EntryCategory, message: &str) -> Self {
        Self::new(LogLevel::Info, category, message)
    }

    /// Create a warn-level entry
    pub fn warn(category: EntryCategory, message: &str) -> Self {
        Self::new(LogLevel::Warn, category, message)
    }

    /// Create an error-level entry
    pub fn error(category: EntryCategory, message: &str) -> Self {
        Self::new(LogLevel::Error, category, message)
    }

    /// Attach a structured field to the entry
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Append-only journal of application activity
pub trait Journal: Clone + Send + Sync + 'static {
    /// Record an entry.
    ///
    /// Appending never fails at the call site; implementations log and
    /// swallow write failures so sending is never blocked on bookkeeping.
    fn append(&self, entry: JournalEntry);

    /// Read back the most recent entries in a stream, newest first.
    ///
    /// # Arguments
    /// * `stream` - The [`LogStream`] to read from.
    /// * `limit` - The maximum number of entries to return.
    fn recent(&self, stream: LogStream, limit: usize) -> Result<Vec<JournalEntry>, JournalError>;
}

#[cfg(test)]
mock! {
    pub Journal {}

    impl Clone for Journal {
        fn clone(&self) -> Self;
    }

    impl Journal for Journal {
        fn append(&self, entry: JournalEntry);
        fn recent(&self, stream: LogStream, limit: usize) -> Result<Vec<JournalEntry>, JournalError>;
    }
}
