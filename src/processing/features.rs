//! Feature extraction: raw candidate records into normalized feature sets

use crate::error::{MatchEngineError, Result};
use crate::input::record::RawRecord;
use aho_corasick::AhoCorasick;
use crate::processing::tokens::{same_token, TokenParser};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CATEGORY_TECHNICAL: &str = "technical";
pub const CATEGORY_SOFT: &str = "soft";
pub const CATEGORY_LEADERSHIP: &str = "leadership";
pub const CATEGORY_DOMAIN: &str = "domain_specific";

pub const EXPERIENCE_YEARS: &str = "experience_years";

const QUALITATIVE_FIT_KEYS: [&str; 2] = ["cultural_fit_score", "qualitative_fit"];

/// Indicator groups for uncategorized `skills`, checked in order
const SKILL_INDICATORS: [(&str, &[&str]); 5] = [
    (
        CATEGORY_TECHNICAL,
        &["programming", "development", "technical", "software", "coding"],
    ),
    (
        "communication",
        &["communication", "presentation", "writing", "speaking"],
    ),
    ("analytical", &["analysis", "data", "research", "problem"]),
    ("creative", &["design", "creative", "innovation", "art"]),
    (
        CATEGORY_LEADERSHIP,
        &["leadership", "management", "team", "mentoring"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Expert,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Expert,
    ];

    pub fn from_years(years: f32) -> Self {
        if years < 2.0 {
            ExperienceLevel::Entry
        } else if years < 5.0 {
            ExperienceLevel::Mid
        } else if years < 10.0 {
            ExperienceLevel::Senior
        } else {
            ExperienceLevel::Expert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Expert => "expert",
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experience summary reported with every match result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceProfile {
    pub years: f32,
    pub level: ExperienceLevel,
    pub previous_roles: usize,
    /// Roles per year of experience, capped at 2.0
    pub progression_rate: f32,
}

/// Normalized, comparable view of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFeatures {
    pub id: String,
    /// Category name to ordered tokens
    pub features: BTreeMap<String, Vec<String>>,
    pub numeric: BTreeMap<String, f32>,
    /// Upstream qualitative (cultural) fit in [0,1]
    pub qualitative_fit: Option<f32>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub previous_roles: usize,
}

impl EntityFeatures {
    /// Feature set used when a record cannot be interpreted
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            features: BTreeMap::new(),
            numeric: BTreeMap::new(),
            qualitative_fit: None,
            education: Vec::new(),
            certifications: Vec::new(),
            previous_roles: 0,
        }
    }

    pub fn experience_years(&self) -> f32 {
        self.numeric.get(EXPERIENCE_YEARS).copied().unwrap_or(0.0)
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_years(self.experience_years())
    }

    pub fn experience_profile(&self) -> ExperienceProfile {
        let years = self.experience_years();
        ExperienceProfile {
            years,
            level: self.experience_level(),
            previous_roles: self.previous_roles,
            progression_rate: (self.previous_roles as f32 / years.max(1.0)).min(2.0),
        }
    }

    pub fn category(&self, name: &str) -> &[String] {
        self.features.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All tokens, category by category in name order
    pub fn flattened_tokens(&self) -> Vec<&str> {
        self.features
            .values()
            .flat_map(|tokens| tokens.iter().map(|t| t.as_str()))
            .collect()
    }

    pub fn has_categorical_metadata(&self) -> bool {
        !self.education.is_empty() || !self.certifications.is_empty()
    }

    fn push_tokens(&mut self, category: &str, tokens: Vec<String>) {
        let entry = self.features.entry(category.to_string()).or_default();
        for token in tokens {
            if !entry.iter().any(|t| same_token(t, &token)) {
                entry.push(token);
            }
        }
    }
}

/// Turns raw candidate records into `EntityFeatures`.
///
/// Missing optional fields yield empty values and unknown value types are
/// skipped. Only structurally broken known fields are reported as errors.
pub struct FeatureExtractor {
    indicator_matcher: AhoCorasick,
    indicator_groups: Vec<&'static str>,
    tokens: TokenParser,
}

impl FeatureExtractor {
    pub fn new() -> Result<Self> {
        let mut patterns = Vec::new();
        let mut indicator_groups = Vec::new();
        for (group, indicators) in SKILL_INDICATORS.iter() {
            for indicator in indicators.iter() {
                patterns.push(*indicator);
                indicator_groups.push(*group);
            }
        }

        let indicator_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| {
                MatchEngineError::Configuration(format!("Failed to build skill categorizer: {}", e))
            })?;

        Ok(Self {
            indicator_matcher,
            indicator_groups,
            tokens: TokenParser::new()?,
        })
    }

    pub fn extract(&self, record: &RawRecord) -> Result<EntityFeatures> {
        let mut features = EntityFeatures::empty(record.id.clone());

        for (field, category) in [
            ("technical_skills", CATEGORY_TECHNICAL),
            ("soft_skills", CATEGORY_SOFT),
            ("leadership_skills", CATEGORY_LEADERSHIP),
        ] {
            if let Some(value) = record.get(field) {
                features.push_tokens(category, self.tokens.parse(value));
            }
        }

        if let Some(value) = record.get("skills") {
            for skill in self.tokens.parse(value) {
                let category = self.categorize_skill(&skill);
                features.push_tokens(category, vec![skill]);
            }
        }

        match record.get("features") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (category, value) in map {
                    features.push_tokens(category, self.tokens.parse(value));
                }
            }
            Some(_) => {
                return Err(MatchEngineError::extraction(
                    &record.id,
                    "`features` must be an object of category lists",
                ));
            }
        }

        for (key, value) in &record.fields {
            if key == EXPERIENCE_YEARS || QUALITATIVE_FIT_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(number) = value.as_f64().filter(|n| n.is_finite()) {
                features.numeric.insert(key.clone(), number as f32);
            }
        }

        let experience = match record.get(EXPERIENCE_YEARS) {
            None | Some(Value::Null) => 0.0,
            Some(value) => parse_number(value).ok_or_else(|| {
                MatchEngineError::extraction(&record.id, "`experience_years` is not a number")
            })?,
        };
        if experience < 0.0 {
            return Err(MatchEngineError::extraction(
                &record.id,
                "`experience_years` is negative",
            ));
        }
        features.numeric.insert(EXPERIENCE_YEARS.to_string(), experience);

        features.qualitative_fit = QUALITATIVE_FIT_KEYS
            .iter()
            .find_map(|key| record.get(key).and_then(parse_number))
            .map(|fit| fit.clamp(0.0, 1.0));

        if let Some(value) = record.get("education") {
            features.education = self.tokens.parse(value);
        }
        if let Some(value) = record.get("certifications") {
            features.certifications = self.tokens.parse(value);
        }
        if let Some(Value::Array(roles)) = record.get("previous_roles") {
            features.previous_roles = roles.len();
        }

        Ok(features)
    }

    /// Extract, falling back to an empty feature set so one malformed record
    /// cannot fail a population-wide match.
    pub fn extract_or_empty(&self, record: &RawRecord) -> EntityFeatures {
        match self.extract(record) {
            Ok(features) => features,
            Err(e) => {
                warn!("Treating entity '{}' as featureless: {}", record.id, e);
                EntityFeatures::empty(record.id.clone())
            }
        }
    }

    /// Category for an uncategorized skill, by first matching indicator group
    pub fn categorize_skill(&self, skill: &str) -> &'static str {
        self.indicator_matcher
            .find_overlapping_iter(skill)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|idx| self.indicator_groups[idx])
            .unwrap_or(CATEGORY_DOMAIN)
    }
}

fn parse_number(value: &Value) -> Option<f32> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number as f32)
}
