//! Pipeline configuration: field names, filter vocabularies, pruning and
//! coercion rules, and collision policy.
//!
//! [`PipelineConfig::default()`] reproduces the cleaning behaviour for OMDb
//! records. A configuration can be saved to and loaded from YAML so a run can
//! be tuned without recompiling.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::yaml_provider;

pub const DEFAULT_SHARD_PREFIX: &str = "data_d";
pub const DEFAULT_MARKET_TOKEN: &str = "USA";

const DEFAULT_PRUNED_COLUMNS: &[&str] = &[
    "plot",
    "language",
    "country",
    "poster",
    "type",
    "tomato_meter",
    "tomato_image",
    "tomato_rating",
    "tomato_reviews",
    "tomato_fresh",
    "tomato_rotten",
    "tomato_consensus",
    "tomato_user_meter",
    "tomato_user_rating",
    "tomato_user_reviews",
    "tomato_url",
    "dvd",
    "website",
    "response",
    "imdb_votes",
    "box_office",
];

const DEFAULT_UNRATED: &[&str] = &["Not Rated", "Unrated", "NR"];

/// Names of the record fields the pipeline gives meaning to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub id: String,
    pub title: String,
    pub country: String,
    pub kind: String,
    pub ratings: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "imdb_id".to_string(),
            title: "title".to_string(),
            country: "country".to_string(),
            kind: "type".to_string(),
            ratings: "ratings".to_string(),
        }
    }
}

/// How rating columns are derived from the merged records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum SchemaMode {
    /// Rating columns come from the first non-empty record only.
    #[default]
    FirstRecord,
    /// Rating columns are every rating source seen across all records.
    Union,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelevanceConfig {
    pub market_token: String,
    pub excluded_types: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            market_token: DEFAULT_MARKET_TOKEN.to_string(),
            excluded_types: vec!["episode".to_string(), "series".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coercion {
    Integer,
    Float,
    Date,
    /// Integer minutes once the unit suffix is stripped.
    Runtime { suffix: String },
    /// Pass-through text, except unrated synonyms which become null.
    Rated { unrated: Vec<String> },
    /// Float once every occurrence of `marker` is removed.
    Marker { marker: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoercionRule {
    pub column: String,
    pub coercion: Coercion,
}

impl CoercionRule {
    pub fn new(column: &str, coercion: Coercion) -> Self {
        Self {
            column: column.to_string(),
            coercion,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CollisionConfig {
    /// Highest numeric suffix to try before reporting an overflow.
    /// `None` keeps counting until a free title is found.
    pub max_suffix: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub fields: FieldNames,
    /// Scalar spellings treated as a missing value when records are flattened.
    pub missing_tokens: Vec<String>,
    pub schema_mode: SchemaMode,
    pub relevance: RelevanceConfig,
    pub pruned_columns: Vec<String>,
    pub coercions: Vec<CoercionRule>,
    pub required_fields: Vec<String>,
    pub collision: CollisionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            missing_tokens: vec!["N/A".to_string()],
            schema_mode: SchemaMode::default(),
            relevance: RelevanceConfig::default(),
            pruned_columns: DEFAULT_PRUNED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            coercions: default_coercions(),
            required_fields: vec![
                "writer".to_string(),
                "actors".to_string(),
                "director".to_string(),
            ],
            collision: CollisionConfig::default(),
        }
    }
}

fn default_coercions() -> Vec<CoercionRule> {
    vec![
        CoercionRule::new("year", Coercion::Integer),
        CoercionRule::new(
            "rated",
            Coercion::Rated {
                unrated: DEFAULT_UNRATED.iter().map(|s| s.to_string()).collect(),
            },
        ),
        CoercionRule::new("released", Coercion::Date),
        CoercionRule::new(
            "runtime",
            Coercion::Runtime {
                suffix: " min".to_string(),
            },
        ),
        CoercionRule::new("metascore", Coercion::Integer),
        CoercionRule::new("imdb_rating", Coercion::Float),
        CoercionRule::new(
            "Internet Movie Database",
            Coercion::Marker {
                marker: "/10".to_string(),
            },
        ),
        CoercionRule::new(
            "Rotten Tomatoes",
            Coercion::Marker {
                marker: "%".to_string(),
            },
        ),
        CoercionRule::new(
            "Metacritic",
            Coercion::Marker {
                marker: "/100".to_string(),
            },
        ),
    ]
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: PipelineConfig = yaml_provider::load_from_path(path)
            .with_context(|| format!("Loading config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        yaml_provider::save_to_path(path, self)
            .with_context(|| format!("Saving config to {path:?}"))
    }

    pub fn to_yaml(&self) -> Result<String> {
        yaml_provider::to_string(self)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.fields.id.is_empty(), "Identifier field name cannot be empty");
        ensure!(!self.fields.title.is_empty(), "Title field name cannot be empty");
        ensure!(
            !self.relevance.market_token.is_empty(),
            "Market token cannot be empty"
        );
        if let Some(max) = self.collision.max_suffix {
            ensure!(max >= 2, "collision.max_suffix must be at least 2 (got {max})");
        }
        Ok(())
    }

    pub fn is_missing_token(&self, value: &str) -> bool {
        self.missing_tokens.iter().any(|token| token == value)
    }
}
