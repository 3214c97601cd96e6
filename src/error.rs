//! Fatal input failures that abort a pipeline run.
//!
//! Everything else (skipped records, fields that fail to coerce, title
//! collisions past the configured bound) is absorbed by the stage that meets
//! it and surfaces only through logging and the [`PipelineReport`].
//!
//! [`PipelineReport`]: crate::pipeline::PipelineReport

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No shard sources were provided")]
    NoShards,
    #[error("Shard {index} ({location}) could not be read")]
    MissingShard {
        index: usize,
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Shard {index} ({location}) is not a JSON array of records")]
    MalformedShard {
        index: usize,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("No non-empty record found to derive the column schema from")]
    MissingSchemaRecord,
}
