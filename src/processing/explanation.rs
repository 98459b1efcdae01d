//! Explanation generation: strengths, gaps and recommendations for one
//! candidate/query pair. Presentation only; never feeds back into scores.

use crate::processing::features::{EntityFeatures, CATEGORY_LEADERSHIP};
use crate::processing::requirements::RequirementSet;
use crate::processing::scorers::find_match;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

pub const HIGH_SCORE: f32 = 0.8;
pub const GOOD_SCORE: f32 = 0.6;
pub const EXCELLENT_FIT: f32 = 0.8;
const NEAR_MISS_SIMILARITY: f64 = 0.85;

/// A gap whose requirement closely resembles one of the candidate's tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearMiss {
    pub requirement: String,
    pub closest: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub additional_qualifications: Vec<String>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub near_misses: Vec<NearMiss>,
    /// Wall-clock time of generation; the only non-deterministic field
    pub generated_at: DateTime<Utc>,
}

impl Explanation {
    /// Equality over every field except `generated_at`
    pub fn same_content(&self, other: &Explanation) -> bool {
        self.strengths == other.strengths
            && self.gaps == other.gaps
            && self.additional_qualifications == other.additional_qualifications
            && self.risk_factors == other.risk_factors
            && self.recommendations == other.recommendations
            && self.near_misses == other.near_misses
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn explain(
        &self,
        entity: &EntityFeatures,
        requirements: &RequirementSet,
        overall_score: f32,
    ) -> Explanation {
        let tokens = entity.flattened_tokens();
        let mut strengths = Vec::new();
        let mut gaps = Vec::new();
        let mut near_misses = Vec::new();
        let mut missing_mandatory = Vec::new();

        for requirement in &requirements.requirements {
            if find_match(&requirement.token, &tokens).is_some() {
                strengths.push(format!("Strong in {}", requirement.token));
            } else {
                gaps.push(format!("Missing {}", requirement.token));
                if requirement.mandatory {
                    missing_mandatory.push(requirement.token.as_str());
                }
                if let Some(near) = closest_token(&requirement.token, &tokens) {
                    near_misses.push(near);
                }
            }
        }

        let fit = entity.qualitative_fit.unwrap_or(0.0);
        if fit > EXCELLENT_FIT {
            strengths.push("Excellent cultural fit".to_string());
        }

        let mut additional_qualifications = Vec::new();
        if overall_score > HIGH_SCORE {
            additional_qualifications.push("Above-average overall qualifications".to_string());
        }

        let mut risk_factors = Vec::new();
        let years = entity.experience_years();
        if years < requirements.experience.min_years {
            risk_factors.push("Below required experience level".to_string());
        }
        if requirements.experience.exceeds_max(years) {
            risk_factors.push("Exceeds experience range".to_string());
        }

        let mut recommendations = vec![overall_recommendation(overall_score).to_string()];
        if !entity.category(CATEGORY_LEADERSHIP).is_empty()
            || tokens.iter().any(|t| t.to_lowercase().contains("leadership"))
        {
            recommendations.push("Consider for leadership track".to_string());
        }
        if fit > EXCELLENT_FIT {
            recommendations.push("Strong cultural fit - fast-track process".to_string());
        }
        if !missing_mandatory.is_empty() {
            recommendations.push(format!(
                "Verify mandatory requirements: {}",
                missing_mandatory.join(", ")
            ));
        }

        Explanation {
            strengths,
            gaps,
            additional_qualifications,
            risk_factors,
            recommendations,
            near_misses,
            generated_at: Utc::now(),
        }
    }
}

pub fn overall_recommendation(overall_score: f32) -> &'static str {
    if overall_score >= HIGH_SCORE {
        "Highly recommended - strong candidate"
    } else if overall_score >= GOOD_SCORE {
        "Good candidate - worth evaluating"
    } else {
        "Consider for alternative positions"
    }
}

fn closest_token(requirement: &str, tokens: &[&str]) -> Option<NearMiss> {
    let required = requirement.to_lowercase();
    let mut best: Option<(f64, &str)> = None;

    for token in tokens.iter().copied() {
        let similarity = jaro_winkler(&required, &token.to_lowercase());
        if similarity >= NEAR_MISS_SIMILARITY && best.map(|(s, _)| similarity > s).unwrap_or(true) {
            best = Some((similarity, token));
        }
    }

    best.map(|(similarity, token)| NearMiss {
        requirement: requirement.to_string(),
        closest: token.to_string(),
        similarity: similarity as f32,
    })
}
