//! Candidate ranker library
//!
//! Ranks a population of candidate records against one query record using
//! weighted component scores, and explains each ranked result.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{MatchEngineError, Result};
pub use input::record::RawRecord;
pub use input::repository::{EntityRepository, EntitySelector, InMemoryRepository, QueryRepository};
pub use processing::engine::{MatchEngine, MatchOptions, MatchResult};
pub use processing::explanation::Explanation;
