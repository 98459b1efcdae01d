//! Integration tests for the candidate ranker

use candidate_ranker::config::ScoringConfig;
use candidate_ranker::input::loader::RecordLoader;
use candidate_ranker::processing::features::ExperienceLevel;
use candidate_ranker::processing::scorers::ScorerKind;
use candidate_ranker::{
    InMemoryRepository, MatchEngine, MatchEngineError, MatchOptions, MatchResult, RawRecord,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

fn default_engine() -> MatchEngine {
    MatchEngine::new(&ScoringConfig::default()).unwrap()
}

fn engine_with(weights: &[(&str, f32)]) -> MatchEngine {
    let config = ScoringConfig {
        weights: weights.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ..ScoringConfig::default()
    };
    MatchEngine::new(&config).unwrap()
}

async fn fixtures() -> (InMemoryRepository, InMemoryRepository) {
    let mut loader = RecordLoader::new();
    let queries = loader
        .load_repository(Path::new("tests/fixtures/jobs.json"))
        .await
        .unwrap();
    let candidates = loader
        .load_repository(Path::new("tests/fixtures/candidates.json"))
        .await
        .unwrap();
    (queries, candidates)
}

fn backend_job() -> InMemoryRepository {
    InMemoryRepository::from_records(vec![RawRecord::new("job-1")
        .with_field("technical_requirements", json!(["python", "aws"]))
        .with_field("min_experience_years", 5)])
}

fn ids(results: &[MatchResult]) -> Vec<&str> {
    results.iter().map(|r| r.entity_id.as_str()).collect()
}

#[test]
fn test_strong_candidate_ranks_first() {
    let population = InMemoryRepository::from_records(vec![
        RawRecord::new("strong")
            .with_field("technical_skills", json!(["python", "java", "aws"]))
            .with_field("experience_years", 8),
        RawRecord::new("partial")
            .with_field("technical_skills", json!(["python"]))
            .with_field("experience_years", 5),
    ]);

    let results = default_engine()
        .match_candidates("job-1", &backend_job(), &population, &MatchOptions::default())
        .unwrap();

    let top = &results[0];
    assert_eq!(top.entity_id, "strong");
    assert_eq!(top.component(ScorerKind::Skills).unwrap().score, 1.0);
    assert_eq!(top.component(ScorerKind::Experience).unwrap().score, 1.0);
    assert!(top.overall_score > 0.8);
    assert_eq!(top.explanation.strengths, vec!["Strong in python", "Strong in aws"]);
    assert!(top.explanation.gaps.is_empty());

    // with only the dimensions the candidate fully satisfies, the score is 1.0
    let focused = engine_with(&[("experience", 0.3), ("skills", 0.4)]);
    let results = focused
        .match_candidates("job-1", &backend_job(), &population, &MatchOptions::default())
        .unwrap();
    assert!((results[0].overall_score - 1.0).abs() < 1e-6);
}

#[test]
fn test_weak_candidate_is_filtered_at_default_threshold() {
    let population = InMemoryRepository::from_records(vec![RawRecord::new("weak")
        .with_field("technical_skills", json!(["php", "perl"]))
        .with_field("experience_years", 1)]);
    let engine = default_engine();

    let results = engine
        .match_candidates("job-1", &backend_job(), &population, &MatchOptions::default())
        .unwrap();
    assert!(results.is_empty());

    let unfiltered = engine
        .match_pair("weak", "job-1", &backend_job(), &population)
        .unwrap();
    assert_eq!(unfiltered.component(ScorerKind::Skills).unwrap().score, 0.0);
    assert!((unfiltered.component(ScorerKind::Experience).unwrap().score - 0.1).abs() < 1e-6);
    assert!(unfiltered.overall_score < 0.3);
    assert_eq!(
        unfiltered.explanation.risk_factors,
        vec!["Below required experience level"]
    );
}

#[test]
fn test_ties_are_ordered_by_entity_id() {
    let population = InMemoryRepository::from_records(vec![
        RawRecord::new("zed").with_field("cultural_fit_score", 0.55),
        RawRecord::new("amy").with_field("cultural_fit_score", 0.55),
        RawRecord::new("max").with_field("cultural_fit_score", 0.2),
    ]);
    let engine = engine_with(&[("qualitative_fit", 1.0)]);

    let results = engine
        .match_candidates("job-1", &backend_job(), &population, &MatchOptions::default())
        .unwrap();

    assert_eq!(ids(&results), vec!["amy", "zed"]);
    assert_eq!(results[0].overall_score, 0.55);
    assert_eq!(results[0].overall_score, results[1].overall_score);
}

#[test]
fn test_zero_weights_fail_construction() {
    let mut weights = BTreeMap::new();
    weights.insert("experience".to_string(), 0.0);
    weights.insert("skills".to_string(), 0.0);
    let config = ScoringConfig {
        weights,
        ..ScoringConfig::default()
    };

    match MatchEngine::new(&config) {
        Err(MatchEngineError::Configuration(_)) => {}
        Err(other) => panic!("expected configuration error, got {}", other),
        Ok(_) => panic!("engine built with zero weights"),
    }
}

#[test]
fn test_empty_population_returns_empty() {
    let results = default_engine()
        .match_candidates(
            "job-1",
            &backend_job(),
            &InMemoryRepository::new(),
            &MatchOptions::default(),
        )
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_scores_exactly_at_threshold_are_included() {
    let population = InMemoryRepository::from_records(
        ["a", "b", "c"].map(|id| RawRecord::new(id).with_field("cultural_fit_score", 0.5)),
    );
    let engine = engine_with(&[("qualitative_fit", 1.0)]);

    let results = engine
        .match_candidates(
            "job-1",
            &backend_job(),
            &population,
            &MatchOptions::default().with_threshold(0.5),
        )
        .unwrap();
    assert_eq!(ids(&results), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_fixture_ranking() {
    let (queries, candidates) = fixtures().await;
    let results = default_engine()
        .match_candidates("job-backend", &queries, &candidates, &MatchOptions::default())
        .unwrap();

    // bob is too weak, dave's record is malformed and scores as featureless
    assert_eq!(ids(&results), vec!["alice", "carol"]);

    let alice = &results[0];
    assert!((alice.overall_score - 0.91).abs() < 1e-5);
    assert_eq!(alice.component(ScorerKind::Categorical).unwrap().score, 0.3);
    assert!(alice
        .explanation
        .strengths
        .contains(&"Excellent cultural fit".to_string()));

    let carol = &results[1];
    assert!((carol.component(ScorerKind::Skills).unwrap().score - 1.0 / 3.0).abs() < 1e-6);
    assert!(carol.explanation.gaps.contains(&"Missing aws".to_string()));
    assert!(carol
        .explanation
        .recommendations
        .contains(&"Consider for leadership track".to_string()));
}

#[tokio::test]
async fn test_open_query_ties_and_malformed_entities() {
    let (queries, candidates) = fixtures().await;
    let results = default_engine()
        .match_candidates("job-open", &queries, &candidates, &MatchOptions::default())
        .unwrap();

    // bob and dave tie at 0.85 and fall back to id order
    assert_eq!(ids(&results), vec!["alice", "carol", "bob", "dave"]);
    assert_eq!(results[2].overall_score, results[3].overall_score);
}

#[tokio::test]
async fn test_results_respect_threshold_and_order() {
    let (queries, candidates) = fixtures().await;
    let engine = default_engine();

    for query in ["job-backend", "job-open"] {
        for threshold in [0.0, 0.2, 0.3, 0.5, 0.86, 0.95, 1.0] {
            let options = MatchOptions::default().with_threshold(threshold);
            let results = engine
                .match_candidates(query, &queries, &candidates, &options)
                .unwrap();

            assert!(results.iter().all(|r| r.overall_score >= threshold));
            assert!(results
                .windows(2)
                .all(|pair| pair[0].overall_score >= pair[1].overall_score));
            for result in &results {
                assert!((0.0..=1.0).contains(&result.overall_score));
                assert!(result
                    .components
                    .iter()
                    .all(|c| (0.0..=1.0).contains(&c.score)));
            }
        }
    }
}

#[tokio::test]
async fn test_repeated_matches_are_identical() {
    let (queries, candidates) = fixtures().await;
    let engine = default_engine();
    let options = MatchOptions::default().with_threshold(0.0);

    let first = engine
        .match_candidates("job-backend", &queries, &candidates, &options)
        .unwrap();
    let second = engine
        .match_candidates("job-backend", &queries, &candidates, &options)
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert!(a.same_outcome(b));
    }
}

#[tokio::test]
async fn test_limit_truncates() {
    let (queries, candidates) = fixtures().await;
    let results = default_engine()
        .match_candidates(
            "job-open",
            &queries,
            &candidates,
            &MatchOptions::default().with_limit(2),
        )
        .unwrap();
    assert_eq!(ids(&results), vec!["alice", "carol"]);
}

#[tokio::test]
async fn test_explain_single_pair() {
    let (queries, candidates) = fixtures().await;
    let explanation = default_engine()
        .explain("bob", "job-backend", &queries, &candidates)
        .unwrap();

    assert_eq!(
        explanation.gaps,
        vec!["Missing python", "Missing aws", "Missing communication"]
    );
    assert_eq!(explanation.recommendations[0], "Consider for alternative positions");
    assert_eq!(
        explanation.recommendations.last().unwrap(),
        "Verify mandatory requirements: python, aws"
    );
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (queries, candidates) = fixtures().await;
    let engine = default_engine();

    assert!(matches!(
        engine.match_candidates("job-missing", &queries, &candidates, &MatchOptions::default()),
        Err(MatchEngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.explain("nobody", "job-backend", &queries, &candidates),
        Err(MatchEngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_json_lines_fixture() {
    let mut loader = RecordLoader::new();
    let path = Path::new("tests/fixtures/candidates.jsonl");

    let records = loader.load(path).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(loader.cache_size(), 1);

    // second load is served from the cache
    let again = loader.load(path).await.unwrap();
    assert_eq!(records, again);
    assert_eq!(loader.cache_size(), 1);
}

#[tokio::test]
async fn test_bad_records_do_not_block_ranking() {
    let mut loader = RecordLoader::new();
    let queries = loader
        .load_repository(Path::new("tests/fixtures/jobs.json"))
        .await
        .unwrap();
    let candidates = loader
        .load_repository(Path::new("tests/fixtures/candidates_mixed.json"))
        .await
        .unwrap();

    // the numeric-id and id-less records are dropped at load time
    assert_eq!(candidates.ids().collect::<Vec<_>>(), vec!["grace", "heidi"]);

    let results = default_engine()
        .match_candidates(
            "job-backend",
            &queries,
            &candidates,
            &MatchOptions::default().with_threshold(0.0),
        )
        .unwrap();
    assert_eq!(ids(&results), vec!["grace", "heidi"]);
}

#[tokio::test]
async fn test_population_summary_from_fixtures() {
    let (_, candidates) = fixtures().await;
    let summary = default_engine().summarize(&candidates).unwrap();

    assert_eq!(summary.total, 4);
    // bob has 1 year, dave is unreadable and counts as 0
    assert_eq!(summary.level_count(ExperienceLevel::Entry), 2);
    assert_eq!(summary.level_count(ExperienceLevel::Senior), 2);
    // no two candidates share an exact skill token, so ties fall back to name order
    assert_eq!(summary.top_skills.len(), 10);
    assert!(summary.top_skills.iter().all(|s| s.count == 1));
    assert_eq!(summary.top_skills[0].skill, "AWS");
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut loader = RecordLoader::new();
    let result = loader.load(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(MatchEngineError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut loader = RecordLoader::new();
    let result = loader.load(Path::new("tests/fixtures/nonexistent.json")).await;
    assert!(result.is_err());
}
