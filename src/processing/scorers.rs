//! Component scorers. Each one is a pure function of a candidate's features and
//! a requirement set, returning a normalized score in [0,1].

use crate::processing::features::EntityFeatures;
use crate::processing::requirements::RequirementSet;
use serde::{Deserialize, Serialize};

/// Score used when a dimension has nothing to compare against
pub const NEUTRAL_SCORE: f32 = 0.5;
/// Categorical credit when both sides carry categorical metadata
pub const CATEGORICAL_BASE_CREDIT: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Experience,
    Skills,
    QualitativeFit,
    Categorical,
}

impl ScorerKind {
    /// Canonical evaluation order
    pub const ALL: [ScorerKind; 4] = [
        ScorerKind::Experience,
        ScorerKind::Skills,
        ScorerKind::QualitativeFit,
        ScorerKind::Categorical,
    ];

    /// Configuration key
    pub fn name(&self) -> &'static str {
        match self {
            ScorerKind::Experience => "experience",
            ScorerKind::Skills => "skills",
            ScorerKind::QualitativeFit => "qualitative_fit",
            ScorerKind::Categorical => "categorical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScorerKind::Experience => "Experience fit",
            ScorerKind::Skills => "Skill overlap",
            ScorerKind::QualitativeFit => "Cultural fit",
            ScorerKind::Categorical => "Education match",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn score(&self, entity: &EntityFeatures, requirements: &RequirementSet) -> f32 {
        let raw = match self {
            ScorerKind::Experience => {
                experience_score(entity.experience_years(), requirements.experience.min_years)
            }
            ScorerKind::Skills => {
                let required: Vec<&str> = requirements
                    .requirements
                    .iter()
                    .map(|r| r.token.as_str())
                    .collect();
                skill_overlap_score(&required, &entity.flattened_tokens())
            }
            ScorerKind::QualitativeFit => qualitative_fit_score(entity.qualitative_fit),
            ScorerKind::Categorical => categorical_score(entity, requirements),
        };
        raw.clamp(0.0, 1.0)
    }
}

impl std::fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Meeting the minimum earns value / (minimum + 2), capped at 1.0, so moderate
/// excess is rewarded. Below the minimum the linear ratio is halved.
pub fn experience_score(value: f32, minimum: f32) -> f32 {
    if minimum <= 0.0 {
        return if value >= 0.0 { 1.0 } else { 0.0 };
    }
    if value >= minimum {
        (value / (minimum + 2.0)).min(1.0)
    } else {
        (value.max(0.0) / minimum) * 0.5
    }
}

/// Case-insensitive substring containment in either direction
pub fn tokens_match(required: &str, candidate: &str) -> bool {
    if required.is_empty() || candidate.is_empty() {
        return false;
    }
    let required = required.to_lowercase();
    let candidate = candidate.to_lowercase();
    candidate.contains(&required) || required.contains(&candidate)
}

/// First candidate token satisfying `required`, if any
pub fn find_match<'a>(required: &str, candidate_tokens: &[&'a str]) -> Option<&'a str> {
    candidate_tokens
        .iter()
        .copied()
        .find(|candidate| tokens_match(required, candidate))
}

/// Fraction of required tokens found among the candidate's tokens. No
/// requirements is vacuously satisfied.
pub fn skill_overlap_score(required: &[&str], candidate_tokens: &[&str]) -> f32 {
    if required.is_empty() {
        return 1.0;
    }
    let candidates: Vec<String> = candidate_tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let matched = required
        .iter()
        .map(|r| r.to_lowercase())
        .filter(|r| !r.is_empty())
        .filter(|r| {
            candidates
                .iter()
                .any(|c| c.contains(r.as_str()) || r.contains(c.as_str()))
        })
        .count();

    (matched as f32 / required.len() as f32).min(1.0)
}

pub fn qualitative_fit_score(fit: Option<f32>) -> f32 {
    fit.unwrap_or(NEUTRAL_SCORE)
}

/// Lenient categorical credit: neutral unless both sides carry categorical
/// metadata, in which case only base credit is given.
pub fn categorical_score(entity: &EntityFeatures, requirements: &RequirementSet) -> f32 {
    if !requirements.has_categorical() {
        return NEUTRAL_SCORE;
    }
    if entity.has_categorical_metadata() {
        CATEGORICAL_BASE_CREDIT
    } else {
        NEUTRAL_SCORE
    }
}
