//! Report structures wrapping ranked match results for presentation

use crate::processing::aggregator::ScoringWeights;
use crate::processing::engine::MatchResult;
use crate::processing::summary::PopulationSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a formatter needs to render one match call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Query the population was ranked against
    pub query_id: String,

    /// Threshold and limit actually applied
    pub threshold: f32,
    pub limit: usize,

    /// Normalized weight per scorer name
    pub weights: Vec<WeightEntry>,

    /// Entities considered before filtering, when known
    pub population_size: Option<usize>,

    /// Ranked results, best first
    pub results: Vec<MatchResult>,

    /// Overview of the whole population, not just the ranked results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PopulationSummary>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub scorer: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub ranker_version: String,
    pub processing_time_ms: u64,
}

impl MatchReport {
    pub fn new(
        query_id: impl Into<String>,
        threshold: f32,
        limit: usize,
        weights: &ScoringWeights,
        results: Vec<MatchResult>,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            threshold,
            limit,
            weights: weights
                .iter()
                .map(|(scorer, weight)| WeightEntry {
                    scorer: scorer.name().to_string(),
                    weight,
                })
                .collect(),
            population_size: None,
            results,
            summary: None,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                ranker_version: env!("CARGO_PKG_VERSION").to_string(),
                processing_time_ms: 0,
            },
        }
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    pub fn with_summary(mut self, summary: PopulationSummary) -> Self {
        self.population_size = Some(summary.total);
        self.summary = Some(summary);
        self
    }

    pub fn with_processing_time(mut self, millis: u64) -> Self {
        self.metadata.processing_time_ms = millis;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Score as a whole percentage, for badges and summaries
pub fn score_percentage(score: f32) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}
