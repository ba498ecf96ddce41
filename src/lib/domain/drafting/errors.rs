//! Error types for AI drafting

use thiserror::Error;

/// Errors that can occur when drafting email copy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftingError {
    /// The chat completion service rejected or failed the request
    #[error("{0}")]
    Api(String),

    /// The model's reply was not the JSON object a template requires
    #[error("The generated template was not valid JSON: {0}")]
    TemplateParse(String),
}

impl From<reqwest::Error> for DraftingError {
    fn from(err: reqwest::Error) -> Self {
        DraftingError::Api(err.to_string())
    }
}

impl From<serde_json::Error> for DraftingError {
    fn from(err: serde_json::Error) -> Self {
        DraftingError::TemplateParse(err.to_string())
    }
}
