//! The cleaned, typed table produced by coercion and refined by the later
//! stages, plus its CSV persistence.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    data::{Value, display_cell},
    io_utils,
};

pub type CleanRecord = Vec<Option<Value>>;

/// Names a record in per-record diagnostics by its stage-input position and,
/// when known, its identifier.
pub fn describe_record(position: usize, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("record {position} ('{id}')"),
        None => format!("record {position} (no id)"),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    headers: Vec<String>,
    rows: Vec<CleanRecord>,
}

impl CleanTable {
    pub fn new(headers: Vec<String>, rows: Vec<CleanRecord>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[CleanRecord] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [CleanRecord] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&CleanRecord) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Appends a column; `values` must hold one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<Value>>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Writes the header row and every record; `-` writes to stdout.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(Some(path), io_utils::DEFAULT_CSV_DELIMITER)?;
        writer
            .write_record(&self.headers)
            .with_context(|| format!("Writing headers to {path:?}"))?;
        for (idx, row) in self.rows.iter().enumerate() {
            writer
                .write_record(row.iter().map(|cell| display_cell(cell.as_ref())))
                .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
        }
        writer
            .flush()
            .with_context(|| format!("Flushing {path:?}"))?;
        info!("Wrote {} row(s) to {:?}", self.rows.len(), path);
        Ok(())
    }
}
