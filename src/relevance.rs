//! Relevance filtering by release market and title type.

use log::{debug, info};

use crate::{
    config::{FieldNames, RelevanceConfig},
    dataset::describe_record,
    flatten::{FieldValue, FlatRecord, FlatSchema},
};

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    id_index: Option<usize>,
    country_index: Option<usize>,
    kind_index: Option<usize>,
    market_token: String,
    excluded_types: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(schema: &FlatSchema, fields: &FieldNames, config: &RelevanceConfig) -> Self {
        Self {
            id_index: schema.column_index(&fields.id),
            country_index: schema.column_index(&fields.country),
            kind_index: schema.column_index(&fields.kind),
            market_token: config.market_token.clone(),
            excluded_types: config.excluded_types.clone(),
        }
    }

    /// Kept iff the country contains the market token and the type is not
    /// excluded. A null or absent country never passes.
    pub fn keep(&self, record: &FlatRecord) -> bool {
        let in_market = self
            .country_index
            .and_then(|idx| record.get(idx))
            .and_then(FieldValue::as_text)
            .is_some_and(|country| country.contains(self.market_token.as_str()));
        if !in_market {
            return false;
        }
        let kind = self
            .kind_index
            .and_then(|idx| record.get(idx))
            .and_then(FieldValue::as_text);
        !kind.is_some_and(|kind| self.excluded_types.iter().any(|excluded| excluded == kind))
    }

    pub fn apply(&self, records: Vec<FlatRecord>) -> Vec<FlatRecord> {
        let before = records.len();
        let kept = records
            .into_iter()
            .enumerate()
            .filter_map(|(position, record)| {
                if self.keep(&record) {
                    return Some(record);
                }
                let id = self
                    .id_index
                    .and_then(|idx| record.get(idx))
                    .and_then(FieldValue::as_text);
                debug!(
                    "Dropping {}: not a '{}' release or an excluded type",
                    describe_record(position, id),
                    self.market_token
                );
                None
            })
            .collect::<Vec<_>>();
        info!(
            "Relevance filter kept {} of {} record(s) (market '{}')",
            kept.len(),
            before,
            self.market_token
        );
        kept
    }
}
