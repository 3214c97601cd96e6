//! Stage orchestration.
//!
//! Stages run strictly one after another, each materializing its full output:
//! merge, flatten, deduplicate, relevance filter, prune and coerce
//! (checkpoint), completeness filter, title collisions, and the optional
//! box-office join.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::{
    box_office::BoxOfficeLookup,
    coerce::{Coercer, CoercionSummary},
    collision::{CollisionSummary, resolve_titles},
    completeness::drop_incomplete,
    config::PipelineConfig,
    dataset::CleanTable,
    dedup::{DedupSummary, dedupe_by_id},
    error::PipelineError,
    flatten::{FlatSchema, flatten_records},
    merge::{ShardSource, merge_shards},
    record::RawRecord,
    relevance::RelevanceFilter,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub merged: usize,
    pub dedup: DedupSummary,
    pub irrelevant: usize,
    pub coercion: CoercionSummary,
    pub checkpoint_rows: usize,
    pub incomplete: usize,
    pub collisions: CollisionSummary,
    pub box_office_matches: Option<usize>,
    pub final_rows: usize,
}

/// Records after pruning and coercion, before the late-stage filters.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub schema: FlatSchema,
    pub table: CleanTable,
    pub report: PipelineReport,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub schema: FlatSchema,
    pub checkpoint: CleanTable,
    pub table: CleanTable,
    pub report: PipelineReport,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub checkpoint: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    box_office: Option<BoxOfficeLookup>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            box_office: None,
        }
    }

    pub fn with_box_office(mut self, lookup: BoxOfficeLookup) -> Self {
        self.box_office = Some(lookup);
        self
    }

    /// Flattens, deduplicates, filters by relevance, prunes and coerces.
    pub fn prepare(&self, records: Vec<Option<RawRecord>>) -> Result<Checkpoint, PipelineError> {
        let config = &self.config;
        let mut report = PipelineReport {
            merged: records.len(),
            ..PipelineReport::default()
        };

        let schema = FlatSchema::derive(&records, config)?;
        let flattened = flatten_records(&records, &schema, config);
        drop(records);

        let (unique, dedup) = dedupe_by_id(flattened, &schema, &config.fields.id);
        report.dedup = dedup;

        let filter = RelevanceFilter::new(&schema, &config.fields, &config.relevance);
        let relevant = filter.apply(unique);
        report.irrelevant = report.dedup.kept - relevant.len();

        let coercer = Coercer::new(&schema, config);
        let (table, coercion) = coercer.apply(&relevant);
        report.coercion = coercion;
        report.checkpoint_rows = table.len();

        Ok(Checkpoint {
            schema,
            table,
            report,
        })
    }

    /// Completeness filter, title collisions and optional enrichment.
    pub fn finish(&self, checkpoint: Checkpoint) -> PipelineOutput {
        let config = &self.config;
        let Checkpoint {
            schema,
            table: checkpoint_table,
            mut report,
        } = checkpoint;

        let mut table = checkpoint_table.clone();
        report.incomplete =
            drop_incomplete(&mut table, &config.required_fields, &config.fields.id);
        report.collisions = resolve_titles(
            &mut table,
            &config.fields.title,
            &config.fields.id,
            config.collision.max_suffix,
        );
        if let Some(lookup) = &self.box_office {
            report.box_office_matches = Some(lookup.enrich(&mut table, &config.fields.title));
        }
        report.final_rows = table.len();

        PipelineOutput {
            schema,
            checkpoint: checkpoint_table,
            table,
            report,
        }
    }

    /// Runs every stage in memory over already merged records.
    pub fn clean(&self, records: Vec<Option<RawRecord>>) -> Result<PipelineOutput, PipelineError> {
        let checkpoint = self.prepare(records)?;
        Ok(self.finish(checkpoint))
    }

    /// Merges `sources`, writes the checkpoint once coercion completes, then
    /// writes the final table. A fatal input error writes nothing.
    pub fn run<S: ShardSource>(
        &self,
        sources: &[S],
        paths: &OutputPaths,
    ) -> Result<PipelineReport> {
        let records = merge_shards(sources).context("Merging shards")?;
        let checkpoint = self.prepare(records).context("Preparing records")?;
        write_table(&checkpoint.table, &paths.checkpoint, "checkpoint")?;

        let output = self.finish(checkpoint);
        write_table(&output.table, &paths.output, "output")?;
        info!(
            "Cleaned {} merged entr(ies) into {} row(s)",
            output.report.merged, output.report.final_rows
        );
        Ok(output.report)
    }
}

fn write_table(table: &CleanTable, path: &Path, label: &str) -> Result<()> {
    table
        .write_csv(path)
        .with_context(|| format!("Writing {label} to {path:?}"))
}
