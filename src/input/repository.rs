//! Repository capabilities the engine consumes, plus an in-memory implementation

use crate::error::{MatchEngineError, Result};
use crate::input::record::RawRecord;
use std::collections::BTreeMap;

/// Which entities to fetch from a repository
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySelector {
    All,
    Ids(Vec<String>),
}

pub trait EntityRepository: Send + Sync {
    /// Fetch raw entity records. Unknown ids in `EntitySelector::Ids` are a
    /// `NotFound` error.
    fn get_entities(&self, selector: &EntitySelector) -> Result<Vec<RawRecord>>;
}

pub trait QueryRepository: Send + Sync {
    fn get_query(&self, id: &str) -> Result<RawRecord>;
}

/// Records keyed by id. Serves as either an entity or a query repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: BTreeMap<String, RawRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut repo = Self::new();
        for record in records {
            repo.insert(record);
        }
        repo
    }

    /// Insert a record, replacing any existing record with the same id
    pub fn insert(&mut self, record: RawRecord) -> Option<RawRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&RawRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }
}

impl EntityRepository for InMemoryRepository {
    fn get_entities(&self, selector: &EntitySelector) -> Result<Vec<RawRecord>> {
        match selector {
            EntitySelector::All => Ok(self.records.values().cloned().collect()),
            EntitySelector::Ids(ids) => ids
                .iter()
                .map(|id| {
                    self.records
                        .get(id)
                        .cloned()
                        .ok_or_else(|| MatchEngineError::not_found("entity", id))
                })
                .collect(),
        }
    }
}

impl QueryRepository for InMemoryRepository {
    fn get_query(&self, id: &str) -> Result<RawRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| MatchEngineError::not_found("query", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::from_records(vec![
            RawRecord::new("b"),
            RawRecord::new("a"),
            RawRecord::new("c"),
        ])
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let records = repo().get_entities(&EntitySelector::All).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_by_ids_keeps_requested_order() {
        let selector = EntitySelector::Ids(vec!["c".into(), "a".into()]);
        let records = repo().get_entities(&selector).unwrap();
        assert_eq!(records[0].id, "c");
        assert_eq!(records[1].id, "a");
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let selector = EntitySelector::Ids(vec!["zz".into()]);
        let err = repo().get_entities(&selector).unwrap_err();
        assert!(matches!(err, MatchEngineError::NotFound(_)));

        let err = repo().get_query("missing").unwrap_err();
        assert!(matches!(err, MatchEngineError::NotFound(_)));
    }

    #[test]
    fn test_insert_replaces() {
        let mut repo = repo();
        let previous = repo.insert(RawRecord::new("a").with_field("x", 1));
        assert!(previous.is_some());
        assert_eq!(repo.len(), 3);
        assert!(repo.get("a").unwrap().get("x").is_some());
    }
}
