//! Record flattening: one fixed column schema for every merged record.
//!
//! The [`FlatSchema`] is computed once from the merged records and handed to
//! every later stage. Scalar columns come from the first non-empty record;
//! rating columns come from that same record's rating list, or from every
//! record's ratings in [`SchemaMode::Union`].

use std::collections::BTreeSet;

use itertools::Itertools;
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::{
    config::{PipelineConfig, SchemaMode},
    error::PipelineError,
    record::RawRecord,
};

/// A flattened cell before type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    /// The record carries no rating from this column's source.
    NotAvailable,
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatSchema {
    scalar_columns: Vec<String>,
    rating_columns: Vec<String>,
}

impl FlatSchema {
    pub fn new(scalar_columns: Vec<String>, rating_columns: Vec<String>) -> Self {
        Self {
            scalar_columns,
            rating_columns,
        }
    }

    pub fn derive(
        records: &[Option<RawRecord>],
        config: &PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let ratings_field = config.fields.ratings.as_str();
        let first = records
            .iter()
            .flatten()
            .find(|record| !record.is_empty())
            .ok_or(PipelineError::MissingSchemaRecord)?;

        let scalar_columns = first
            .fields()
            .map(|(name, _)| name)
            .filter(|name| name.as_str() != ratings_field)
            .cloned()
            .collect::<Vec<_>>();

        let rating_columns = match config.schema_mode {
            SchemaMode::FirstRecord => first
                .ratings(ratings_field)
                .into_iter()
                .map(|entry| entry.source)
                .unique()
                .collect::<Vec<_>>(),
            SchemaMode::Union => records
                .iter()
                .flatten()
                .flat_map(|record| record.ratings(ratings_field))
                .map(|entry| entry.source)
                .unique()
                .collect::<Vec<_>>(),
        };

        info!(
            "Derived schema with {} scalar and {} rating column(s) ({:?} mode)",
            scalar_columns.len(),
            rating_columns.len(),
            config.schema_mode
        );
        Ok(Self::new(scalar_columns, rating_columns))
    }

    pub fn scalar_columns(&self) -> &[String] {
        &self.scalar_columns
    }

    pub fn rating_columns(&self) -> &[String] {
        &self.rating_columns
    }

    /// Scalar columns followed by rating columns.
    pub fn headers(&self) -> Vec<String> {
        self.scalar_columns
            .iter()
            .chain(self.rating_columns.iter())
            .cloned()
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.scalar_columns
            .iter()
            .chain(self.rating_columns.iter())
            .position(|column| column == name)
    }

    pub fn len(&self) -> usize {
        self.scalar_columns.len() + self.rating_columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One record projected onto a [`FlatSchema`], one value per header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    values: Vec<FieldValue>,
}

impl FlatRecord {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }
}

pub fn flatten_record(
    record: &RawRecord,
    schema: &FlatSchema,
    config: &PipelineConfig,
) -> FlatRecord {
    let mut values = Vec::with_capacity(schema.len());
    for column in schema.scalar_columns() {
        values.push(scalar_value(record.get(column), config));
    }
    let ratings = record.ratings(&config.fields.ratings);
    for column in schema.rating_columns() {
        let value = match ratings.iter().find(|entry| &entry.source == column) {
            Some(entry) if config.is_missing_token(&entry.value) => FieldValue::Null,
            Some(entry) => FieldValue::Text(entry.value.clone()),
            None => FieldValue::NotAvailable,
        };
        values.push(value);
    }
    FlatRecord::new(values)
}

/// Projects every entry onto `schema`. Failed fetches stay `None`, so the
/// output always has as many entries as the input.
pub fn flatten_records(
    records: &[Option<RawRecord>],
    schema: &FlatSchema,
    config: &PipelineConfig,
) -> Vec<Option<FlatRecord>> {
    let mut dropped_sources = BTreeSet::new();
    let flattened = records
        .iter()
        .map(|entry| {
            entry.as_ref().map(|record| {
                for rating in record.ratings(&config.fields.ratings) {
                    if !schema.rating_columns().contains(&rating.source) {
                        dropped_sources.insert(rating.source);
                    }
                }
                flatten_record(record, schema, config)
            })
        })
        .collect::<Vec<_>>();
    if !dropped_sources.is_empty() {
        info!(
            "Ignored ratings from {} source(s) not present in the schema: {}",
            dropped_sources.len(),
            dropped_sources.iter().join(", ")
        );
    }
    debug!("Flattened {} entr(ies)", flattened.len());
    flattened
}

fn scalar_value(value: Option<&JsonValue>, config: &PipelineConfig) -> FieldValue {
    match value {
        None | Some(JsonValue::Null) => FieldValue::Null,
        Some(JsonValue::String(text)) if config.is_missing_token(text) => FieldValue::Null,
        Some(JsonValue::String(text)) => FieldValue::Text(text.clone()),
        Some(other) => FieldValue::Text(other.to_string()),
    }
}
