//! Error types for campaign parsing

use thiserror::Error;

/// Errors that can occur when parsing recipient CSV
#[derive(Debug, Error)]
pub enum CsvParseError {
    /// The CSV was structurally unreadable
    #[error("CSV parsing failed: {0}")]
    Malformed(String),
}
