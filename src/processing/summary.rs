//! Population overview shown alongside a ranking

use crate::processing::features::{EntityFeatures, ExperienceLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const TOP_SKILLS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub total: usize,
    /// Every level is present, including those with no candidates
    pub experience_distribution: BTreeMap<ExperienceLevel, usize>,
    pub average_progression_rate: f32,
    /// Most common skills, count descending then name ascending
    pub top_skills: Vec<SkillCount>,
}

impl PopulationSummary {
    pub fn from_features(population: &[EntityFeatures]) -> Self {
        let mut experience_distribution: BTreeMap<ExperienceLevel, usize> =
            ExperienceLevel::ALL.into_iter().map(|level| (level, 0)).collect();
        let mut progression_total = 0.0_f32;

        // lowercased token -> (first spelling seen, count)
        let mut skills: HashMap<String, (String, usize)> = HashMap::new();

        for entity in population {
            let profile = entity.experience_profile();
            *experience_distribution.entry(profile.level).or_insert(0) += 1;
            progression_total += profile.progression_rate;

            // a skill listed under two categories counts once per candidate
            let mut seen = Vec::new();
            for token in entity.flattened_tokens() {
                let key = token.to_lowercase();
                if seen.contains(&key) {
                    continue;
                }
                skills
                    .entry(key.clone())
                    .or_insert_with(|| (token.to_string(), 0))
                    .1 += 1;
                seen.push(key);
            }
        }

        let mut top_skills: Vec<SkillCount> = skills
            .into_values()
            .map(|(skill, count)| SkillCount { skill, count })
            .collect();
        top_skills.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.skill.to_lowercase().cmp(&b.skill.to_lowercase()))
        });
        top_skills.truncate(TOP_SKILLS_LIMIT);

        let average_progression_rate = if population.is_empty() {
            0.0
        } else {
            progression_total / population.len() as f32
        };

        Self {
            total: population.len(),
            experience_distribution,
            average_progression_rate,
            top_skills,
        }
    }

    pub fn level_count(&self, level: ExperienceLevel) -> usize {
        self.experience_distribution.get(&level).copied().unwrap_or(0)
    }
}
