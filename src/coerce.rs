//! Column pruning and type coercion.
//!
//! Every configured column is coerced on its own: a value that fails to parse
//! becomes null for that column only and is counted, never raised.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    config::{Coercion, PipelineConfig},
    data::{Value, parse_float, parse_integer, parse_naive_date},
    dataset::{CleanRecord, CleanTable, describe_record},
    flatten::{FieldValue, FlatRecord, FlatSchema},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionSummary {
    /// Per column, how many present values failed to parse.
    pub failures: BTreeMap<String, usize>,
}

impl CoercionSummary {
    pub fn total(&self) -> usize {
        self.failures.values().sum()
    }
}

#[derive(Debug, Clone)]
struct ColumnPlan {
    name: String,
    source_index: usize,
    coercion: Option<Coercion>,
}

/// Pruned output layout for one [`FlatSchema`], with the coercion for each
/// surviving column.
#[derive(Debug, Clone)]
pub struct Coercer {
    plans: Vec<ColumnPlan>,
    id_index: Option<usize>,
}

impl Coercer {
    pub fn new(schema: &FlatSchema, config: &PipelineConfig) -> Self {
        for pruned in &config.pruned_columns {
            if schema.column_index(pruned).is_none() {
                debug!("Pruned column '{pruned}' is not part of the schema");
            }
        }
        let plans = schema
            .headers()
            .into_iter()
            .enumerate()
            .filter(|(_, name)| !config.pruned_columns.contains(name))
            .map(|(source_index, name)| {
                let coercion = config
                    .coercions
                    .iter()
                    .find(|rule| rule.column == name)
                    .map(|rule| rule.coercion.clone());
                ColumnPlan {
                    name,
                    source_index,
                    coercion,
                }
            })
            .collect();
        Self {
            plans,
            id_index: schema.column_index(&config.fields.id),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        self.plans.iter().map(|plan| plan.name.clone()).collect()
    }

    pub fn coerce_record(
        &self,
        position: usize,
        record: &FlatRecord,
        summary: &mut CoercionSummary,
    ) -> CleanRecord {
        self.plans
            .iter()
            .map(|plan| {
                let coerced = match record.get(plan.source_index) {
                    Some(value) => coerce_field(value, plan.coercion.as_ref()),
                    None => Ok(None),
                };
                match coerced {
                    Ok(coerced) => coerced,
                    Err(err) => {
                        let id = self
                            .id_index
                            .and_then(|idx| record.get(idx))
                            .and_then(FieldValue::as_text);
                        debug!(
                            "Nulling '{}' in {}: {err:#}",
                            plan.name,
                            describe_record(position, id)
                        );
                        *summary.failures.entry(plan.name.clone()).or_insert(0) += 1;
                        None
                    }
                }
            })
            .collect()
    }

    pub fn apply(&self, records: &[FlatRecord]) -> (CleanTable, CoercionSummary) {
        let mut summary = CoercionSummary::default();
        let rows = records
            .iter()
            .enumerate()
            .map(|(position, record)| self.coerce_record(position, record, &mut summary))
            .collect::<Vec<_>>();
        for (column, count) in &summary.failures {
            debug!("{count} value(s) in '{column}' could not be coerced");
        }
        info!(
            "Coerced {} record(s) into {} column(s); {} value(s) nulled on parse failure",
            rows.len(),
            self.plans.len(),
            summary.total()
        );
        (CleanTable::new(self.headers(), rows), summary)
    }
}

/// Coerces one flattened cell. `Ok(None)` is a legitimate missing value
/// (null input, missing rating, unrated marker); `Err` is a parse failure
/// that the caller turns into null.
pub fn coerce_field(value: &FieldValue, coercion: Option<&Coercion>) -> Result<Option<Value>> {
    let text = match value {
        FieldValue::Null | FieldValue::NotAvailable => return Ok(None),
        FieldValue::Text(text) => text.as_str(),
    };
    let Some(coercion) = coercion else {
        return Ok(Some(Value::String(text.to_string())));
    };
    let coerced = match coercion {
        Coercion::Integer => Value::Integer(
            parse_integer(text).ok_or_else(|| anyhow!("'{text}' is not an integer"))?,
        ),
        Coercion::Float => {
            Value::Float(parse_float(text).ok_or_else(|| anyhow!("'{text}' is not a number"))?)
        }
        Coercion::Date => Value::Date(parse_naive_date(text)?),
        Coercion::Runtime { suffix } => {
            let trimmed = text.trim();
            let minutes = trimmed.strip_suffix(suffix.as_str()).unwrap_or(trimmed);
            Value::Integer(
                parse_integer(minutes)
                    .ok_or_else(|| anyhow!("'{text}' is not a runtime in minutes"))?,
            )
        }
        Coercion::Rated { unrated } => {
            let trimmed = text.trim();
            if unrated
                .iter()
                .any(|synonym| synonym.eq_ignore_ascii_case(trimmed))
            {
                return Ok(None);
            }
            Value::String(text.to_string())
        }
        Coercion::Marker { marker } => {
            let stripped = text.replace(marker.as_str(), "");
            Value::Float(
                parse_float(&stripped)
                    .with_context(|| format!("'{text}' is not a score after removing '{marker}'"))?,
            )
        }
    };
    Ok(Some(coerced))
}
