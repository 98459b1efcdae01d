//! Weight resolution and weighted score aggregation

use crate::error::{MatchEngineError, Result};
use crate::processing::scorers::ScorerKind;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for "weights sum to 1.0"
pub const WEIGHT_EPSILON: f32 = 1e-5;

/// Validated, normalized weights in canonical scorer order.
/// Scorers missing from the configuration are not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    entries: Vec<(ScorerKind, f32)>,
}

impl ScoringWeights {
    /// Resolve a `{scorer_name: weight}` table.
    ///
    /// Unknown names, negative or non-finite weights and an all-zero table are
    /// configuration errors. Otherwise weights are divided by their sum.
    pub fn from_config(table: &BTreeMap<String, f32>) -> Result<Self> {
        let mut raw = Vec::with_capacity(table.len());

        for (name, weight) in table {
            let kind = ScorerKind::from_name(name).ok_or_else(|| {
                MatchEngineError::Configuration(format!(
                    "Unknown scorer '{}' (expected one of: {})",
                    name,
                    ScorerKind::ALL.map(|k| k.name()).join(", ")
                ))
            })?;
            if !weight.is_finite() || *weight < 0.0 {
                return Err(MatchEngineError::Configuration(format!(
                    "Weight for '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
            raw.push((kind, *weight));
        }

        let sum: f32 = raw.iter().map(|(_, w)| w).sum();
        if sum <= 0.0 {
            return Err(MatchEngineError::Configuration(
                "Scorer weights sum to 0; at least one scorer needs a positive weight".to_string(),
            ));
        }

        raw.sort_by_key(|(kind, _)| *kind);
        let entries: Vec<(ScorerKind, f32)> =
            raw.into_iter().map(|(kind, w)| (kind, w / sum)).collect();

        let normalized: f32 = entries.iter().map(|(_, w)| w).sum();
        if (normalized - 1.0).abs() > WEIGHT_EPSILON {
            return Err(MatchEngineError::Configuration(format!(
                "Scorer weights do not sum to 1.0 after normalization ({})",
                normalized
            )));
        }

        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            debug!("Normalized scorer weights from sum {:.4}", sum);
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScorerKind, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn weight(&self, kind: ScorerKind) -> Option<f32> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, w)| *w)
    }

    pub fn sum(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Σ(score × weight) / Σ(weight), clamped to [0,1].
///
/// Every pair's weight counts toward the denominator, including pairs that
/// scored 0. An empty or zero-weight input yields 0.0.
pub fn aggregate(pairs: &[(f32, f32)]) -> f32 {
    let mut score = 0.0_f32;
    let mut max_score = 0.0_f32;

    for (component, weight) in pairs {
        score += component * weight;
        max_score += weight;
    }

    if max_score > 0.0 {
        (score / max_score).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
