//! Raw per-title records as fetched from the metadata provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One fetched title: an object of field name to JSON value.
///
/// Failed fetches never become a `RawRecord`; they travel through the
/// merger and flattener as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, JsonValue>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    #[serde(alias = "Source")]
    pub source: String,
    #[serde(alias = "Value")]
    pub value: String,
}

impl RawRecord {
    /// Converts one shard entry into a record. `null`, empty objects and
    /// anything that is not an object count as a failed fetch.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(fields) if !fields.is_empty() => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rating entries in record order. Entries that are not `{source, value}`
    /// objects are ignored.
    pub fn ratings(&self, field: &str) -> Vec<RatingEntry> {
        match self.0.get(field) {
            Some(JsonValue::Array(entries)) => entries
                .iter()
                .filter_map(|entry| RatingEntry::deserialize(entry).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}
