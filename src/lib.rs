pub mod box_office;
pub mod cli;
pub mod coerce;
pub mod collision;
pub mod completeness;
pub mod config;
pub mod data;
pub mod dataset;
pub mod dedup;
pub mod error;
pub mod flatten;
pub mod io_utils;
pub mod merge;
pub mod pipeline;
pub mod preview;
pub mod record;
pub mod relevance;
pub mod table;
pub mod yaml_provider;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    box_office::BoxOfficeLookup,
    cli::{Cli, Commands},
    config::PipelineConfig,
    merge::JsonShardFile,
    pipeline::{OutputPaths, Pipeline},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("movie_curate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => handle_merge(&args),
        Commands::Clean(args) => handle_clean(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Config(args) => handle_config(&args),
    }
}

fn shard_sources(args: &cli::ShardArgs) -> Result<Vec<JsonShardFile>> {
    let paths = if !args.shards.is_empty() {
        if args.count.is_some() {
            debug!("--count ignored because explicit --shard files were given");
        }
        args.shards.clone()
    } else if let Some(count) = args.count {
        merge::numbered_shard_paths(&args.dir, &args.prefix, count)
    } else {
        bail!("Provide either --shard files or --count numbered shards");
    };
    Ok(paths.into_iter().map(JsonShardFile::new).collect())
}

fn handle_merge(args: &cli::MergeArgs) -> Result<()> {
    let sources = shard_sources(&args.shards)?;
    let merged = merge::merge_shards(&sources).context("Merging shards")?;
    merge::write_merged(&args.output, &merged)?;
    info!(
        "Merged {} entr(ies) from {} shard(s) into {:?}",
        merged.len(),
        sources.len(),
        args.output
    );
    Ok(())
}

fn handle_clean(args: &cli::CleanArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading config from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(market) = &args.market {
        config.relevance.market_token = market.clone();
    }
    if let Some(max_suffix) = args.max_suffix {
        config.collision.max_suffix = Some(max_suffix);
    }
    if let Some(mode) = args.schema_mode {
        config.schema_mode = mode;
    }
    config.validate()?;

    let mut pipeline = Pipeline::new(config);
    if let Some(path) = &args.box_office {
        let lookup = BoxOfficeLookup::load(path)
            .with_context(|| format!("Loading box-office figures from {path:?}"))?;
        pipeline = pipeline.with_box_office(lookup);
    }

    let sources = shard_sources(&args.shards)?;
    let paths = OutputPaths {
        checkpoint: args.checkpoint.clone(),
        output: args.output.clone(),
    };
    let report = pipeline.run(&sources, &paths)?;
    if !report.collisions.overflows.is_empty() {
        warn!(
            "{} row(s) kept a duplicate title after exhausting suffixes",
            report.collisions.overflows.len()
        );
    }
    info!(
        "Checkpoint {:?} holds {} row(s); output {:?} holds {} row(s)",
        paths.checkpoint, report.checkpoint_rows, paths.output, report.final_rows
    );
    Ok(())
}

fn handle_config(args: &cli::ConfigArgs) -> Result<()> {
    let config = PipelineConfig::default();
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            config.save(path)?;
            info!("Default configuration written to {path:?}");
        }
        _ => print!("{}", config.to_yaml()?),
    }
    Ok(())
}
