//! Optional box-office enrichment: a left join on title against a CSV of
//! production budgets and worldwide grosses.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    data::{Value, parse_integer},
    dataset::CleanTable,
    io_utils,
};

pub const TITLE_COLUMN: &str = "Title";
pub const BUDGET_COLUMN: &str = "Production budget";
pub const GROSS_COLUMN: &str = "Worldwide Gross";
pub const BUDGET_OUTPUT: &str = "prod_bud";
pub const GROSS_OUTPUT: &str = "world_gross";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxOfficeFigures {
    pub budget: Option<i64>,
    pub gross: Option<i64>,
}

/// Box-office figures keyed by title; only the first row for a title counts.
#[derive(Debug, Clone, Default)]
pub struct BoxOfficeLookup {
    entries: HashMap<String, BoxOfficeFigures>,
}

impl BoxOfficeLookup {
    pub fn load(path: &Path) -> Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, None);
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
        let headers = io_utils::reader_headers(&mut reader)?;
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| anyhow!("Column '{name}' not found in {path:?}"))
        };
        let title_idx = position(TITLE_COLUMN)?;
        let budget_idx = position(BUDGET_COLUMN)?;
        let gross_idx = position(GROSS_COLUMN)?;

        let mut lookup = Self::default();
        for (row_idx, record) in reader.records().enumerate() {
            let record =
                record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
            let Some(title) = record.get(title_idx).filter(|t| !t.is_empty()) else {
                continue;
            };
            lookup.insert(
                title,
                BoxOfficeFigures {
                    budget: record.get(budget_idx).and_then(parse_money),
                    gross: record.get(gross_idx).and_then(parse_money),
                },
            );
        }
        info!(
            "Loaded box-office figures for {} title(s) from {:?}",
            lookup.len(),
            path
        );
        Ok(lookup)
    }

    /// Keeps the existing entry when `title` was already inserted.
    pub fn insert(&mut self, title: &str, figures: BoxOfficeFigures) {
        self.entries.entry(title.to_string()).or_insert(figures);
    }

    pub fn get(&self, title: &str) -> Option<&BoxOfficeFigures> {
        self.entries.get(title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends budget and gross columns; rows without a match get nulls.
    pub fn enrich(&self, table: &mut CleanTable, title_column: &str) -> usize {
        let title_idx = table.column_index(title_column);
        let matches = table
            .rows()
            .iter()
            .map(|row| {
                title_idx
                    .and_then(|idx| row.get(idx))
                    .and_then(Option::as_ref)
                    .and_then(|title| self.get(&title.as_display()))
            })
            .collect::<Vec<_>>();
        let matched = matches.iter().filter(|m| m.is_some()).count();
        let budgets = matches
            .iter()
            .map(|m| m.and_then(|f| f.budget).map(Value::Integer))
            .collect();
        let grosses = matches
            .iter()
            .map(|m| m.and_then(|f| f.gross).map(Value::Integer))
            .collect();
        table.push_column(BUDGET_OUTPUT, budgets);
        table.push_column(GROSS_OUTPUT, grosses);
        info!(
            "Matched box-office figures for {matched} of {} row(s)",
            table.len()
        );
        matched
    }
}

/// Parses amounts such as `$10,000,000`.
pub fn parse_money(value: &str) -> Option<i64> {
    let cleaned = value
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect::<String>();
    parse_integer(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_money_strips_currency_noise() {
        assert_eq!(parse_money("$10,000,000"), Some(10_000_000));
        assert_eq!(parse_money("325000"), Some(325_000));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("unknown"), None);
    }

    #[test]
    fn enrich_uses_first_figures_per_title() {
        let mut lookup = BoxOfficeLookup::default();
        lookup.insert(
            "Halloween",
            BoxOfficeFigures {
                budget: Some(325_000),
                gross: Some(70_000_000),
            },
        );
        lookup.insert(
            "Halloween",
            BoxOfficeFigures {
                budget: Some(10_000_000),
                gross: None,
            },
        );
        let mut table = CleanTable::new(
            vec!["title".to_string()],
            vec![
                vec![Some(Value::String("Halloween".to_string()))],
                vec![Some(Value::String("Heat".to_string()))],
            ],
        );
        assert_eq!(lookup.enrich(&mut table, "title"), 1);
        assert_eq!(table.cell(0, BUDGET_OUTPUT), Some(&Value::Integer(325_000)));
        assert_eq!(table.cell(1, GROSS_OUTPUT), None);
    }
}
