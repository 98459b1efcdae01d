//! Configuration management for the candidate ranker

use crate::error::{MatchEngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_SCORE_THRESHOLD: f32 = 0.3;
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight per scorer name; resolved and validated when the engine is built
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f32>,
    #[serde(default = "default_threshold")]
    pub min_score_threshold: f32,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

fn default_weights() -> BTreeMap<String, f32> {
    let mut weights = BTreeMap::new();
    weights.insert("experience".to_string(), 0.3);
    weights.insert("skills".to_string(), 0.4);
    weights.insert("qualitative_fit".to_string(), 0.2);
    weights.insert("categorical".to_string(), 0.1);
    weights
}

fn default_threshold() -> f32 {
    DEFAULT_MIN_SCORE_THRESHOLD
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            min_score_threshold: DEFAULT_MIN_SCORE_THRESHOLD,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the platform config directory, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            MatchEngineError::Configuration(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            MatchEngineError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("candidate-ranker")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = Config::default();
        let sum: f32 = config.scoring.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(config.scoring.min_score_threshold, 0.3);
        assert_eq!(config.scoring.default_limit, 10);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.scoring.min_score_threshold = 0.45;
        config.output.format = OutputFormat::Markdown;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.min_score_threshold, 0.45);
        assert_eq!(loaded.output.format, OutputFormat::Markdown);
        assert_eq!(loaded.scoring.weights.len(), 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[scoring]\nweights = { skills = 0.5, experience = 0.5 }\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.weights.len(), 2);
        assert_eq!(loaded.scoring.default_limit, DEFAULT_LIMIT);
        assert_eq!(loaded.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_scoring_table_without_weights() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nmin_score_threshold = 0.5\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.min_score_threshold, 0.5);
        assert_eq!(loaded.scoring.weights, default_weights());
        assert_eq!(loaded.scoring.default_limit, DEFAULT_LIMIT);

        std::fs::write(&path, "[scoring]\ndefault_limit = 3\n").unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.default_limit, 3);
        assert_eq!(loaded.scoring.weights.len(), 4);
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring\nweights = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, MatchEngineError::Configuration(_)));
    }
}
