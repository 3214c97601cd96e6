//! Identifier deduplication: the first record seen for an identifier wins.

use std::collections::HashSet;

use log::{debug, info};

use crate::flatten::{FlatRecord, FlatSchema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupSummary {
    pub kept: usize,
    pub absent: usize,
    pub missing_id: usize,
    pub duplicates: usize,
}

/// Drops failed fetches, records without an identifier, and every later
/// record whose identifier has already been kept.
///
/// A missing `id_column` in the schema means no record can be identified, so
/// every present record is dropped as unidentified.
pub fn dedupe_by_id(
    records: Vec<Option<FlatRecord>>,
    schema: &FlatSchema,
    id_column: &str,
) -> (Vec<FlatRecord>, DedupSummary) {
    let id_index = schema.column_index(id_column);
    let mut seen: HashSet<String> = HashSet::new();
    let mut summary = DedupSummary::default();
    let mut kept = Vec::with_capacity(records.len());

    for (position, entry) in records.into_iter().enumerate() {
        let Some(record) = entry else {
            summary.absent += 1;
            continue;
        };
        let Some(id) = id_index
            .and_then(|idx| record.get(idx))
            .and_then(|value| value.as_text())
            .filter(|id| !id.is_empty())
        else {
            debug!("Skipping record at position {position}: no '{id_column}' value");
            summary.missing_id += 1;
            continue;
        };
        if !seen.insert(id.to_string()) {
            debug!("Skipping duplicate '{id}' at position {position}");
            summary.duplicates += 1;
            continue;
        }
        kept.push(record);
    }

    summary.kept = kept.len();
    info!(
        "Deduplicated to {} record(s) ({} duplicate(s), {} failed fetch(es), {} without '{}')",
        summary.kept, summary.duplicates, summary.absent, summary.missing_id, id_column
    );
    (kept, summary)
}
