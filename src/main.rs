//! candidate-ranker: rank candidate records against a job or query record

use anyhow::{Context, Result};
use candidate_ranker::cli::{self, Cli, Commands, ConfigAction};
use candidate_ranker::config::{Config, OutputFormat};
use candidate_ranker::input::loader::RecordLoader;
use candidate_ranker::input::repository::InMemoryRepository;
use candidate_ranker::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use candidate_ranker::output::report::MatchReport;
use candidate_ranker::{MatchEngine, MatchOptions};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

const RECORD_EXTENSIONS: [&str; 4] = ["json", "jsonl", "ndjson", "toml"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Config::load().context("reading default config"),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Match {
            query,
            queries,
            candidates,
            threshold,
            limit,
            output,
            save,
            detailed,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let engine = MatchEngine::from_config(&config).context("invalid scoring configuration")?;
            let (query_repo, population) = load_repositories(&queries, &candidates).await?;

            let options = MatchOptions { threshold, limit };
            let spinner = spinner(&format!("Ranking {} candidates against {}", population.len(), query));
            let start = Instant::now();
            let results = engine.match_candidates(&query, &query_repo, &population, &options);
            spinner.finish_and_clear();
            let results = results.with_context(|| format!("matching query '{}'", query))?;
            let summary = engine
                .summarize(&population)
                .context("summarizing candidate population")?;

            let report = MatchReport::new(
                &query,
                threshold.unwrap_or(engine.min_score_threshold()),
                limit.unwrap_or(engine.default_limit()),
                engine.weights(),
                results,
            )
            .with_summary(summary)
            .with_processing_time(start.elapsed().as_millis() as u64);

            let generator = ReportGenerator::with_options(
                config.output.color_output,
                detailed || config.output.detailed,
            );
            let rendered = generator.generate_report(&report, &format)?;
            emit(&rendered, save, &format, &query)?;
        }

        Commands::Explain {
            candidate,
            query,
            queries,
            candidates,
            output,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let engine = MatchEngine::from_config(&config).context("invalid scoring configuration")?;
            let (query_repo, population) = load_repositories(&queries, &candidates).await?;

            let result = engine
                .match_pair(&candidate, &query, &query_repo, &population)
                .with_context(|| format!("explaining '{}' against '{}'", candidate, query))?;

            let report = MatchReport::new(
                &query,
                engine.min_score_threshold(),
                1,
                engine.weights(),
                vec![result],
            );
            let generator = ReportGenerator::with_options(config.output.color_output, true);
            println!("{}", generator.generate_report(&report, &format)?);
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Scoring Weights:");
                for (scorer, weight) in &config.scoring.weights {
                    println!("  {}: {:.1}%", scorer, weight * 100.0);
                }
                println!("Minimum score threshold: {:.2}", config.scoring.min_score_threshold);
                println!("Default limit: {}", config.scoring.default_limit);
                println!("Output format: {:?}", config.output.format);
            }

            Some(ConfigAction::Path) => {
                let path = config_path.unwrap_or_else(Config::config_path);
                println!("{}", path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                let path = config_path.unwrap_or_else(Config::config_path);
                Config::default().save_to(&path)?;
                println!("✅ Configuration reset: {}", path.display());
            }
        },
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(anyhow::Error::msg),
        None => Ok(config.output.format),
    }
}

async fn load_repositories(
    queries: &Path,
    candidates: &Path,
) -> Result<(InMemoryRepository, InMemoryRepository)> {
    for path in [queries, candidates] {
        cli::validate_file_extension(path, &RECORD_EXTENSIONS)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("record file {}", path.display()))?;
    }

    let mut loader = RecordLoader::new();
    let query_repo = loader
        .load_repository(queries)
        .await
        .with_context(|| format!("loading queries from {}", queries.display()))?;
    let population = loader
        .load_repository(candidates)
        .await
        .with_context(|| format!("loading candidates from {}", candidates.display()))?;

    info!(
        "Loaded {} queries and {} candidates",
        query_repo.len(),
        population.len()
    );
    Ok((query_repo, population))
}

fn emit(rendered: &str, save: Option<PathBuf>, format: &OutputFormat, query: &str) -> Result<()> {
    match save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(format, query, true))
            } else {
                path
            };
            save_report_to_file(rendered, &path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
