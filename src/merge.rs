//! Shard merging: concatenates independently fetched record batches.
//!
//! Shards are read in the order given and their entries are appended in file
//! order. Duplicate identifiers across shards are left for the deduplicator.
//! A shard that cannot be read or parsed aborts the merge, since a partial
//! shard set cannot be cleaned safely.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::{error::PipelineError, record::RawRecord};

/// A batch of fetched records. `index` is the 1-based shard position used in
/// diagnostics.
pub trait ShardSource {
    fn location(&self) -> String;
    fn read_records(&self, index: usize) -> Result<Vec<Option<RawRecord>>, PipelineError>;
}

/// A shard stored as a JSON array of record objects (`null` for failed fetches).
#[derive(Debug, Clone)]
pub struct JsonShardFile {
    path: PathBuf,
}

impl JsonShardFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ShardSource for JsonShardFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_records(&self, index: usize) -> Result<Vec<Option<RawRecord>>, PipelineError> {
        let file = File::open(&self.path).map_err(|source| PipelineError::MissingShard {
            index,
            location: self.location(),
            source,
        })?;
        let entries: Vec<JsonValue> = serde_json::from_reader(BufReader::new(file)).map_err(
            |source| PipelineError::MalformedShard {
                index,
                location: self.location(),
                source,
            },
        )?;
        Ok(entries.into_iter().map(RawRecord::from_json).collect())
    }
}

/// A shard already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShard {
    label: String,
    entries: Vec<Option<RawRecord>>,
}

impl InMemoryShard {
    pub fn new(label: &str, entries: Vec<Option<RawRecord>>) -> Self {
        Self {
            label: label.to_string(),
            entries,
        }
    }
}

impl ShardSource for InMemoryShard {
    fn location(&self) -> String {
        self.label.clone()
    }

    fn read_records(&self, _index: usize) -> Result<Vec<Option<RawRecord>>, PipelineError> {
        Ok(self.entries.clone())
    }
}

/// Paths `<dir>/<prefix>1.json` through `<dir>/<prefix><count>.json`.
pub fn numbered_shard_paths(dir: &Path, prefix: &str, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|n| dir.join(format!("{prefix}{n}.json")))
        .collect()
}

pub fn merge_shards<S: ShardSource>(
    sources: &[S],
) -> Result<Vec<Option<RawRecord>>, PipelineError> {
    if sources.is_empty() {
        return Err(PipelineError::NoShards);
    }
    let mut merged = Vec::new();
    for (idx, source) in sources.iter().enumerate() {
        let records = source.read_records(idx + 1)?;
        debug!(
            "Shard {} ({}) contributed {} entr(ies)",
            idx + 1,
            source.location(),
            records.len()
        );
        merged.extend(records);
    }
    info!(
        "Merged {} entr(ies) from {} shard(s)",
        merged.len(),
        sources.len()
    );
    Ok(merged)
}

/// Writes the merged sequence as a single JSON array, failed fetches as `null`.
pub fn write_merged(path: &Path, records: &[Option<RawRecord>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating merged file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records)
        .with_context(|| format!("Serializing merged records to {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Flushing merged file {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str) -> Option<RawRecord> {
        RawRecord::from_json(json!({ "imdb_id": id }))
    }

    fn ids(records: &[Option<RawRecord>]) -> Vec<Option<String>> {
        records
            .iter()
            .map(|r| {
                r.as_ref()
                    .and_then(|r| r.get("imdb_id"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .collect()
    }

    #[test]
    fn merge_preserves_shard_then_record_order() {
        let shards = vec![
            InMemoryShard::new("a", vec![record("a1"), record("a2")]),
            InMemoryShard::new("b", vec![record("b1")]),
        ];
        let merged = merge_shards(&shards).unwrap();
        assert_eq!(
            ids(&merged),
            vec![
                Some("a1".to_string()),
                Some("a2".to_string()),
                Some("b1".to_string())
            ]
        );
    }

    #[test]
    fn merge_keeps_failed_fetches_and_cross_shard_duplicates() {
        let shards = vec![
            InMemoryShard::new("a", vec![record("x"), None]),
            InMemoryShard::new("b", vec![]),
            InMemoryShard::new("c", vec![record("x")]),
        ];
        let merged = merge_shards(&shards).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(merged[1].is_none());
    }

    #[test]
    fn merge_without_shards_is_fatal() {
        let shards: Vec<InMemoryShard> = Vec::new();
        assert!(matches!(
            merge_shards(&shards),
            Err(PipelineError::NoShards)
        ));
    }

    #[test]
    fn numbered_paths_start_at_one() {
        let paths = numbered_shard_paths(Path::new("out"), "data_d", 2);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("out").join("data_d1.json"),
                PathBuf::from("out").join("data_d2.json")
            ]
        );
    }
}
