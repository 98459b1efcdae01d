//! Token list parsing and token identity shared by feature and requirement extraction

use crate::error::{MatchEngineError, Result};
use regex::Regex;
use serde_json::Value;

/// Splits token lists given as JSON arrays or one delimited string.
///
/// `/` is not a delimiter, so tokens like `CI/CD` stay whole.
pub struct TokenParser {
    delimiter: Regex,
}

impl TokenParser {
    pub fn new() -> Result<Self> {
        let delimiter = Regex::new(r"\s*[,;|]\s*").map_err(|e| {
            MatchEngineError::Configuration(format!("Invalid token delimiter pattern: {}", e))
        })?;
        Ok(Self { delimiter })
    }

    /// Trimmed, non-empty tokens; non-string array items and other value types yield nothing
    pub fn parse(&self, value: &Value) -> Vec<String> {
        let raw: Vec<&str> = match value {
            Value::Array(items) => items.iter().filter_map(|item| item.as_str()).collect(),
            Value::String(s) => self.delimiter.split(s).collect(),
            _ => Vec::new(),
        };

        raw.into_iter()
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string())
            .collect()
    }
}

/// Case-insensitive token identity, using the same Unicode lowercasing as matching
pub fn same_token(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
