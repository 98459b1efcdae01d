//! Matching engine: ranks a population of candidates against one query

use crate::config::{Config, ScoringConfig};
use crate::error::{MatchEngineError, Result};
use crate::input::record::RawRecord;
use crate::input::repository::{EntityRepository, EntitySelector, QueryRepository};
use crate::processing::aggregator::{aggregate, ScoringWeights};
use crate::processing::explanation::{Explanation, ExplanationGenerator};
use crate::processing::features::{EntityFeatures, ExperienceProfile, FeatureExtractor};
use crate::processing::ranker::{rank, Rankable};
use crate::processing::requirements::{RequirementExtractor, RequirementSet};
use crate::processing::scorers::ScorerKind;
use crate::processing::summary::PopulationSummary;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub scorer: ScorerKind,
    pub label: String,
    pub score: f32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entity_id: String,
    pub query_id: String,
    pub overall_score: f32,
    pub components: Vec<ComponentScore>,
    pub experience: ExperienceProfile,
    #[serde(flatten)]
    pub explanation: Explanation,
}

impl MatchResult {
    /// Equality over scores and explanation content, ignoring `generated_at`
    pub fn same_outcome(&self, other: &MatchResult) -> bool {
        self.entity_id == other.entity_id
            && self.query_id == other.query_id
            && self.overall_score.to_bits() == other.overall_score.to_bits()
            && self.components == other.components
            && self.experience == other.experience
            && self.explanation.same_content(&other.explanation)
    }

    pub fn component(&self, scorer: ScorerKind) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.scorer == scorer)
    }
}

/// Per-call overrides; `None` falls back to the configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchOptions {
    pub threshold: Option<f32>,
    pub limit: Option<usize>,
}

impl MatchOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Scores for one candidate before ranking
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub features: EntityFeatures,
    pub components: Vec<ComponentScore>,
    pub overall_score: f32,
}

impl Rankable for ScoredCandidate {
    fn rank_id(&self) -> &str {
        &self.features.id
    }

    fn rank_score(&self) -> f32 {
        self.overall_score
    }
}

/// Stateless between calls: holds only resolved configuration and the
/// extractors, so one instance can serve concurrent queries.
pub struct MatchEngine {
    weights: ScoringWeights,
    min_score_threshold: f32,
    default_limit: usize,
    features: FeatureExtractor,
    requirements: RequirementExtractor,
    explainer: ExplanationGenerator,
}

impl MatchEngine {
    /// Build an engine, failing fast on invalid weights, threshold or limit
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let weights = ScoringWeights::from_config(&config.weights)?;
        validate_threshold(config.min_score_threshold).map_err(MatchEngineError::Configuration)?;
        if config.default_limit == 0 {
            return Err(MatchEngineError::Configuration(
                "default_limit must be at least 1".to_string(),
            ));
        }

        debug!(
            "Match engine ready: {} scorers, threshold {:.2}, limit {}",
            weights.len(),
            config.min_score_threshold,
            config.default_limit
        );

        Ok(Self {
            weights,
            min_score_threshold: config.min_score_threshold,
            default_limit: config.default_limit,
            features: FeatureExtractor::new()?,
            requirements: RequirementExtractor::new()?,
            explainer: ExplanationGenerator::new(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.scoring)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn min_score_threshold(&self) -> f32 {
        self.min_score_threshold
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Rank every entity in `population` against query `query_id`.
    ///
    /// Unknown query ids fail with `NotFound`. Malformed entity records are
    /// scored as featureless rather than failing the call.
    pub fn match_candidates(
        &self,
        query_id: &str,
        queries: &dyn QueryRepository,
        population: &dyn EntityRepository,
        options: &MatchOptions,
    ) -> Result<Vec<MatchResult>> {
        let (threshold, limit) = self.resolve_options(options)?;
        let query = queries.get_query(query_id)?;
        let requirements = self.requirements.extract(&query)?;
        let records = population.get_entities(&EntitySelector::All)?;

        let start = Instant::now();
        let results = self.rank_records(&requirements, &records, threshold, limit);

        info!(
            "Matched query '{}' against {} entities: {} results in {}ms",
            query_id,
            records.len(),
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(results)
    }

    /// Score, filter and rank already-fetched records
    pub fn rank_records(
        &self,
        requirements: &RequirementSet,
        records: &[RawRecord],
        threshold: f32,
        limit: usize,
    ) -> Vec<MatchResult> {
        let scored: Vec<ScoredCandidate> = records
            .par_iter()
            .map(|record| {
                let features = self.features.extract_or_empty(record);
                self.score_features(features, requirements)
            })
            .collect();

        debug!("Scored {} candidates for '{}'", scored.len(), requirements.id);

        rank(scored, threshold, limit)
            .into_iter()
            .map(|candidate| self.build_result(candidate, requirements))
            .collect()
    }

    /// Full result for a single candidate/query pair, regardless of threshold
    pub fn match_pair(
        &self,
        entity_id: &str,
        query_id: &str,
        queries: &dyn QueryRepository,
        population: &dyn EntityRepository,
    ) -> Result<MatchResult> {
        let query = queries.get_query(query_id)?;
        let requirements = self.requirements.extract(&query)?;

        let record = population
            .get_entities(&EntitySelector::Ids(vec![entity_id.to_string()]))?
            .into_iter()
            .next()
            .ok_or_else(|| MatchEngineError::not_found("entity", entity_id))?;

        let features = self.features.extract_or_empty(&record);
        let candidate = self.score_features(features, &requirements);
        Ok(self.build_result(candidate, &requirements))
    }

    /// Strengths, gaps and recommendations for one pair without ranking the
    /// whole population.
    pub fn explain(
        &self,
        entity_id: &str,
        query_id: &str,
        queries: &dyn QueryRepository,
        population: &dyn EntityRepository,
    ) -> Result<Explanation> {
        Ok(self
            .match_pair(entity_id, query_id, queries, population)?
            .explanation)
    }

    /// Experience distribution and most common skills across a population
    pub fn summarize(&self, population: &dyn EntityRepository) -> Result<PopulationSummary> {
        let records = population.get_entities(&EntitySelector::All)?;
        let features: Vec<EntityFeatures> = records
            .par_iter()
            .map(|record| self.features.extract_or_empty(record))
            .collect();
        Ok(PopulationSummary::from_features(&features))
    }

    /// Run every configured scorer and aggregate
    pub fn score_features(
        &self,
        features: EntityFeatures,
        requirements: &RequirementSet,
    ) -> ScoredCandidate {
        let components: Vec<ComponentScore> = self
            .weights
            .iter()
            .map(|(scorer, weight)| ComponentScore {
                scorer,
                label: scorer.label().to_string(),
                score: scorer.score(&features, requirements),
                weight,
            })
            .collect();

        let pairs: Vec<(f32, f32)> = components.iter().map(|c| (c.score, c.weight)).collect();
        let overall_score = aggregate(&pairs);

        ScoredCandidate {
            features,
            components,
            overall_score,
        }
    }

    fn build_result(&self, candidate: ScoredCandidate, requirements: &RequirementSet) -> MatchResult {
        let explanation =
            self.explainer
                .explain(&candidate.features, requirements, candidate.overall_score);

        MatchResult {
            experience: candidate.features.experience_profile(),
            entity_id: candidate.features.id,
            query_id: requirements.id.clone(),
            overall_score: candidate.overall_score,
            components: candidate.components,
            explanation,
        }
    }

    fn resolve_options(&self, options: &MatchOptions) -> Result<(f32, usize)> {
        let threshold = options.threshold.unwrap_or(self.min_score_threshold);
        validate_threshold(threshold).map_err(MatchEngineError::InvalidInput)?;

        let limit = options.limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(MatchEngineError::InvalidInput(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok((threshold, limit))
    }
}

fn validate_threshold(threshold: f32) -> std::result::Result<(), String> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(format!("threshold must be within [0, 1], got {}", threshold))
    }
}
