//! Error handling for the candidate ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchEngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Extraction error for record '{record_id}': {reason}")]
    Extraction { record_id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, MatchEngineError>;

impl MatchEngineError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        MatchEngineError::NotFound(format!("{} '{}'", kind, id))
    }

    pub fn extraction(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchEngineError::Extraction {
            record_id: record_id.into(),
            reason: reason.into(),
        }
    }
}
