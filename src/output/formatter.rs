//! Output formatters for match reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{score_percentage, MatchReport};
use crate::processing::engine::MatchResult;
use crate::processing::summary::PopulationSummary;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering match reports
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for API integration and structured data
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing shortlists
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for a requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            80..=100 => ("STRONG", Color::Green),
            60..=79 => ("GOOD", Color::Yellow),
            40..=59 => ("FAIR", Color::BrightYellow),
            _ => ("WEAK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_result(&self, rank: usize, result: &MatchResult) -> String {
        let mut output = String::new();
        let percentage = score_percentage(result.overall_score);

        output.push_str(&format!(
            "{}. {} - {}% {}\n",
            rank,
            self.colorize(&result.entity_id, Color::Cyan),
            percentage,
            self.format_score_badge(percentage)
        ));

        for component in &result.components {
            output.push_str(&format!(
                "   {:<16} {:>5.1}% (weight {:.0}%)\n",
                component.label,
                component.score * 100.0,
                component.weight * 100.0
            ));
        }

        output.push_str(&format!(
            "   Experience: {:.1} years ({}), {} previous roles\n",
            result.experience.years, result.experience.level, result.experience.previous_roles
        ));

        let explanation = &result.explanation;
        for strength in &explanation.strengths {
            output.push_str(&format!("   {} {}\n", self.colorize("+", Color::Green), strength));
        }
        for gap in &explanation.gaps {
            output.push_str(&format!("   {} {}\n", self.colorize("-", Color::Red), gap));
        }

        if self.detailed {
            for near in &explanation.near_misses {
                output.push_str(&format!(
                    "   ~ {} looks like {} ({:.0}%)\n",
                    near.requirement,
                    near.closest,
                    near.similarity * 100.0
                ));
            }
            for qualification in &explanation.additional_qualifications {
                output.push_str(&format!("   * {}\n", qualification));
            }
            for risk in &explanation.risk_factors {
                output.push_str(&format!("   {} {}\n", self.colorize("!", Color::Yellow), risk));
            }
        }

        for recommendation in &explanation.recommendations {
            output.push_str(&format!("   > {}\n", recommendation));
        }

        output
    }

    fn format_summary(&self, summary: &PopulationSummary) -> String {
        let mut output = self.format_header("Population", 2);

        let levels: Vec<String> = summary
            .experience_distribution
            .iter()
            .map(|(level, count)| format!("{} {}", level, count))
            .collect();
        output.push_str(&format!("Experience levels: {}\n", levels.join(", ")));
        output.push_str(&format!(
            "Average progression: {:.2} roles/year\n",
            summary.average_progression_rate
        ));

        if !summary.top_skills.is_empty() {
            let skills: Vec<String> = summary
                .top_skills
                .iter()
                .map(|s| format!("{} ({})", s.skill, s.count))
                .collect();
            output.push_str(&format!("Top skills: {}\n", skills.join(", ")));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(
            &format!("CANDIDATE RANKING FOR {}", report.query_id),
            1,
        ));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        let weights: Vec<String> = report
            .weights
            .iter()
            .map(|w| format!("{} {:.0}%", w.scorer, w.weight * 100.0))
            .collect();
        output.push_str(&format!(
            "Threshold: {:.0}% | Limit: {} | Weights: {}\n",
            report.threshold * 100.0,
            report.limit,
            weights.join(", ")
        ));

        output.push_str(&self.format_header("Results", 2));
        if report.is_empty() {
            output.push_str(&self.colorize("No candidates met the threshold.\n", Color::Yellow));
        }
        for (idx, result) in report.results.iter().enumerate() {
            output.push_str(&self.format_result(idx + 1, result));
            output.push('\n');
        }

        if let Some(size) = report.population_size {
            output.push_str(&format!(
                "{} of {} candidates shown\n",
                report.results.len(),
                size
            ));
        }

        if let Some(summary) = &report.summary {
            output.push_str(&self.format_summary(summary));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn bullet_list(title: &str, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let mut output = format!("**{}**\n\n", title);
        for item in items {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = format!("# Candidate ranking for `{}`\n\n", report.query_id);

        if self.include_metadata {
            output.push_str(&format!(
                "_Generated {} by candidate-ranker {}_\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.ranker_version
            ));
        }

        output.push_str("| Rank | Candidate | Score |");
        for weight in &report.weights {
            output.push_str(&format!(" {} |", weight.scorer));
        }
        output.push_str("\n|---|---|---|");
        for _ in &report.weights {
            output.push_str("---|");
        }
        output.push('\n');

        for (idx, result) in report.results.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {}% |",
                idx + 1,
                result.entity_id,
                score_percentage(result.overall_score)
            ));
            for component in &result.components {
                output.push_str(&format!(" {:.2} |", component.score));
            }
            output.push('\n');
        }
        output.push('\n');

        for result in &report.results {
            output.push_str(&format!("## {}\n\n", result.entity_id));
            output.push_str(&format!(
                "_{:.1} years, {} level, {} previous roles_\n\n",
                result.experience.years, result.experience.level, result.experience.previous_roles
            ));
            let explanation = &result.explanation;
            output.push_str(&Self::bullet_list("Strengths", &explanation.strengths));
            output.push_str(&Self::bullet_list("Gaps", &explanation.gaps));
            output.push_str(&Self::bullet_list("Risk factors", &explanation.risk_factors));
            output.push_str(&Self::bullet_list(
                "Recommendations",
                &explanation.recommendations,
            ));
        }

        if let Some(summary) = &report.summary {
            output.push_str("## Population\n\n| Level | Candidates |\n|---|---|\n");
            for (level, count) in &summary.experience_distribution {
                output.push_str(&format!("| {} | {} |\n", level, count));
            }
            output.push('\n');
            let skills: Vec<String> = summary
                .top_skills
                .iter()
                .map(|s| format!("{} ({})", s.skill, s.count))
                .collect();
            output.push_str(&Self::bullet_list("Top skills", &skills));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, query_id: &str, timestamp: bool) -> String {
    let base_name: String = query_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_ranking{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_ranking{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_ranking{}.md", base_name, timestamp_suffix),
    }
}
