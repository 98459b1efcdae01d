//! Requirement extraction: raw job/query records into structured requirement sets

use crate::error::{MatchEngineError, Result};
use crate::input::record::RawRecord;
use crate::processing::features::{CATEGORY_SOFT, CATEGORY_TECHNICAL};
use crate::processing::tokens::{same_token, TokenParser};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CATEGORY_GENERAL: &str = "general";

const TECHNICAL_WEIGHT_HINT: f32 = 1.0;
const SOFT_WEIGHT_HINT: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub token: String,
    pub category: String,
    pub mandatory: bool,
    pub weight: f32,
}

/// Experience range in years; `max_years: None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRange {
    pub min_years: f32,
    pub max_years: Option<f32>,
}

impl Default for ExperienceRange {
    fn default() -> Self {
        Self {
            min_years: 0.0,
            max_years: None,
        }
    }
}

impl ExperienceRange {
    pub fn exceeds_max(&self, years: f32) -> bool {
        self.max_years.map(|max| years > max).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub id: String,
    pub requirements: Vec<Requirement>,
    pub experience: ExperienceRange,
    /// Categorical (education) requirements
    pub categorical: Vec<String>,
}

impl RequirementSet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            requirements: Vec::new(),
            experience: ExperienceRange::default(),
            categorical: Vec::new(),
        }
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.mandatory)
    }

    pub fn has_categorical(&self) -> bool {
        !self.categorical.is_empty()
    }

    /// Adds a requirement unless the same token (case-insensitive) is present.
    /// Returns whether it was added.
    pub fn push(&mut self, requirement: Requirement) -> bool {
        if self
            .requirements
            .iter()
            .any(|r| same_token(&r.token, &requirement.token))
        {
            return false;
        }
        self.requirements.push(requirement);
        true
    }
}

pub struct RequirementExtractor {
    tokens: TokenParser,
}

impl RequirementExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tokens: TokenParser::new()?,
        })
    }

    pub fn extract(&self, record: &RawRecord) -> Result<RequirementSet> {
        let mut set = RequirementSet::new(record.id.clone());

        if let Some(value) = record.get("technical_requirements") {
            for token in self.tokens.parse(value) {
                set.push(Requirement {
                    token,
                    category: CATEGORY_TECHNICAL.to_string(),
                    mandatory: true,
                    weight: TECHNICAL_WEIGHT_HINT,
                });
            }
        }

        if let Some(value) = record.get("soft_requirements") {
            for token in self.tokens.parse(value) {
                set.push(Requirement {
                    token,
                    category: CATEGORY_SOFT.to_string(),
                    mandatory: false,
                    weight: SOFT_WEIGHT_HINT,
                });
            }
        }

        match record.get("requirements") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    set.push(self.parse_requirement(&record.id, item)?);
                }
            }
            Some(_) => {
                return Err(MatchEngineError::extraction(
                    &record.id,
                    "`requirements` must be an array",
                ));
            }
        }

        set.experience = self.parse_experience(record)?;

        if let Some(value) = record.get("education_requirements") {
            set.categorical = self.tokens.parse(value);
        }

        Ok(set)
    }

    fn parse_requirement(&self, record_id: &str, item: &Value) -> Result<Requirement> {
        match item {
            Value::String(token) if !token.trim().is_empty() => Ok(Requirement {
                token: token.trim().to_string(),
                category: CATEGORY_GENERAL.to_string(),
                mandatory: true,
                weight: 1.0,
            }),
            Value::Object(map) => {
                let token = map
                    .get("skill")
                    .or_else(|| map.get("token"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        MatchEngineError::extraction(record_id, "requirement without a `skill`")
                    })?;

                Ok(Requirement {
                    token: token.to_string(),
                    category: map
                        .get("category")
                        .and_then(|v| v.as_str())
                        .unwrap_or(CATEGORY_GENERAL)
                        .to_string(),
                    mandatory: map.get("mandatory").and_then(|v| v.as_bool()).unwrap_or(true),
                    weight: map
                        .get("weight")
                        .and_then(|v| v.as_f64())
                        .map(|w| (w as f32).max(0.0))
                        .unwrap_or(1.0),
                })
            }
            _ => Err(MatchEngineError::extraction(
                record_id,
                "requirement entries must be strings or objects",
            )),
        }
    }

    fn parse_experience(&self, record: &RawRecord) -> Result<ExperienceRange> {
        let min_years = optional_years(record, "min_experience_years")?.unwrap_or(0.0);
        let max_years = optional_years(record, "max_experience_years")?;

        if let Some(max) = max_years {
            if max < min_years {
                return Err(MatchEngineError::extraction(
                    &record.id,
                    format!("max_experience_years ({}) is below min_experience_years ({})", max, min_years),
                ));
            }
        }

        Ok(ExperienceRange {
            min_years,
            max_years,
        })
    }
}

fn optional_years(record: &RawRecord, key: &str) -> Result<Option<f32>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| Some(n as f32))
            .ok_or_else(|| {
                MatchEngineError::extraction(
                    &record.id,
                    format!("`{}` must be a non-negative number", key),
                )
            }),
    }
}
