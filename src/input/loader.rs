//! Loads raw records from JSON, JSON Lines or TOML files

use crate::error::{MatchEngineError, Result};
use crate::input::file_detector::FileType;
use crate::input::record::RawRecord;
use crate::input::repository::InMemoryRepository;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct RecordLoader {
    cache: HashMap<String, Vec<RawRecord>>,
    enable_cache: bool,
}

impl RecordLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn load(&mut self, path: &Path) -> Result<Vec<RawRecord>> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&path_str) {
                info!("Using cached records for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(MatchEngineError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = self.detect_file_type(path)?;
        let content = fs::read_to_string(path).await?;

        let items = match file_type {
            FileType::Json => record_items(serde_json::from_str(&content)?, path)?,
            FileType::JsonLines => json_lines(&content, path),
            FileType::Toml => record_items(toml::from_str(&content)?, path)?,
            FileType::Unknown => {
                return Err(MatchEngineError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        let records = into_records(items, path);
        info!("Loaded {} records from {}", records.len(), path.display());

        if self.enable_cache {
            self.cache.insert(path_str, records.clone());
        }

        Ok(records)
    }

    /// Load a file straight into an in-memory repository
    pub async fn load_repository(&mut self, path: &Path) -> Result<InMemoryRepository> {
        Ok(InMemoryRepository::from_records(self.load(path).await?))
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                MatchEngineError::InvalidInput(format!(
                    "File has no extension: {}",
                    path.display()
                ))
            })?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

/// Record values from a parsed document: a bare array, or a table with a
/// `records` array
fn record_items(document: Value, path: &Path) -> Result<Vec<Value>> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut table) => match table.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(MatchEngineError::InvalidInput(format!(
                "Expected a `records` array in {}",
                path.display()
            ))),
        },
        _ => Err(MatchEngineError::InvalidInput(format!(
            "Expected an array of records in {}",
            path.display()
        ))),
    }
}

/// One value per non-blank line; unparseable lines are skipped
fn json_lines(content: &str, path: &Path) -> Vec<Value> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping line {} of {}: {}", idx + 1, path.display(), e);
                None
            }
        })
        .collect()
}

/// Converts each value on its own so one malformed record cannot empty the file
fn into_records(items: Vec<Value>, path: &Path) -> Vec<RawRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value::<RawRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping record {} in {}: {}", idx, path.display(), e);
                None
            }
        })
        .collect()
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_json_table_form() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(
            &path,
            r#"{"records": [{"id": "job-1", "min_experience_years": 3}]}"#,
        )
        .unwrap();

        let records = RecordLoader::new().load(&path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "job-1");
    }

    #[tokio::test]
    async fn test_load_json_lines_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidates.jsonl");
        std::fs::write(&path, "{\"id\": \"a\"}\n\n{\"id\": \"b\", \"experience_years\": 2}\n").unwrap();

        let records = RecordLoader::new().load(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "b");
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.toml");
        std::fs::write(
            &path,
            "[[records]]\nid = \"job-9\"\nmin_experience_years = 5\ntechnical_requirements = [\"rust\"]\n",
        )
        .unwrap();

        let repo = RecordLoader::new().load_repository(&path).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.get("job-9").unwrap().get("technical_requirements").is_some());
    }

    #[tokio::test]
    async fn test_malformed_records_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.json");
        std::fs::write(
            &path,
            r#"[{"id": "good", "experience_years": 4}, {"id": 7}, {"experience_years": 2}, "x"]"#,
        )
        .unwrap();

        let records = RecordLoader::new().load(&path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }

    #[tokio::test]
    async fn test_bad_json_line_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.jsonl");
        std::fs::write(&path, "{\"id\": \"a\"}\n{not json\n{\"id\": 3}\n{\"id\": \"b\"}\n").unwrap();

        let records = RecordLoader::new().load(&path).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_document_without_records_is_invalid_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, r#"{"jobs": []}"#).unwrap();

        let err = RecordLoader::new().load(&path).await.unwrap_err();
        assert!(matches!(err, MatchEngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_extension_is_invalid_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records");
        std::fs::write(&path, "[]").unwrap();

        let err = RecordLoader::new().load(&path).await.unwrap_err();
        assert!(matches!(err, MatchEngineError::InvalidInput(_)));
    }
}
