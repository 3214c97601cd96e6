use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_SHARD_PREFIX, SchemaMode};

#[derive(Debug, Parser)]
#[command(author, version, about = "Merge and clean sharded OMDb title records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Concatenate numbered shard files into a single JSON array
    Merge(MergeArgs),
    /// Run the full cleaning pipeline and write checkpoint and final CSV files
    Clean(CleanArgs),
    /// Preview the first few rows of a CSV file in a formatted table
    Preview(PreviewArgs),
    /// Write the default pipeline configuration as YAML
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ShardArgs {
    /// Explicit shard files, merged in the order given
    #[arg(short = 's', long = "shard", action = clap::ArgAction::Append)]
    pub shards: Vec<PathBuf>,
    /// Directory holding numbered shard files
    #[arg(long = "dir", default_value = ".")]
    pub dir: PathBuf,
    /// File name prefix of numbered shards (`<prefix>1.json`, `<prefix>2.json`, ...)
    #[arg(long = "prefix", default_value = DEFAULT_SHARD_PREFIX)]
    pub prefix: String,
    /// Number of numbered shards to merge
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub shards: ShardArgs,
    /// Destination JSON file for the merged records
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub shards: ShardArgs,
    /// Checkpoint CSV written after type coercion
    #[arg(long = "checkpoint")]
    pub checkpoint: PathBuf,
    /// Final CSV output (`-` for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// YAML pipeline configuration (defaults apply when omitted)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Override the release-market token required in the country field
    #[arg(long = "market")]
    pub market: Option<String>,
    /// Highest title suffix to try before reporting an overflow (unbounded when omitted)
    #[arg(long = "max-suffix")]
    pub max_suffix: Option<u32>,
    /// Override how rating columns are derived
    #[arg(long = "schema-mode", value_enum)]
    pub schema_mode: Option<SchemaMode>,
    /// CSV with `Title`, `Production budget` and `Worldwide Gross` columns to join on title
    #[arg(long = "box-office")]
    pub box_office: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Only show these columns, in this order (e.g. `imdb_id,title,year`)
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Truncate cells wider than this many characters (0 disables truncation)
    #[arg(long = "max-width", default_value_t = 40)]
    pub max_width: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
