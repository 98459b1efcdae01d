//! Raw entity and query records as supplied by collaborators

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A loosely-typed record: an identifier plus arbitrary top-level fields.
///
/// Both candidates and job openings arrive in this shape; the feature and
/// requirement extractors decide which fields they understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly for tests and demos
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
