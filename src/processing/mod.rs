//! Matching pipeline: extraction, scoring, aggregation, ranking, explanation

pub mod aggregator;
pub mod engine;
pub mod explanation;
pub mod features;
pub mod ranker;
pub mod requirements;
pub mod scorers;
pub mod summary;
pub mod tokens;
