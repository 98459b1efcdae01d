//! CLI interface for the candidate ranker

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "candidate-ranker")]
#[command(about = "Weighted multi-factor candidate matching and ranking")]
#[command(long_about = "Rank candidate records against a job or query record using weighted experience, skill, fit and education scores, with an explanation for every result")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidates against a query
    Match {
        /// Query (job) id to rank against
        #[arg(short, long)]
        query: String,

        /// File with query records (JSON, JSONL, TOML)
        #[arg(long)]
        queries: PathBuf,

        /// File with candidate records (JSON, JSONL, TOML)
        #[arg(long)]
        candidates: PathBuf,

        /// Minimum overall score, overrides the configured threshold
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Maximum number of results, overrides the configured limit
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include near misses and risk factors in console output
        #[arg(short, long)]
        detailed: bool,
    },

    /// Explain how one candidate scores against a query
    Explain {
        /// Candidate id
        #[arg(long)]
        candidate: String,

        /// Query (job) id
        #[arg(short, long)]
        query: String,

        /// File with query records
        #[arg(long)]
        queries: PathBuf,

        /// File with candidate records
        #[arg(long)]
        candidates: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
