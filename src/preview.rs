//! Terminal preview of checkpoint and output CSV files.

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cli::PreviewArgs, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader)?;
    let selection = select_columns(&headers, &args.columns)?;
    let mut rows = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        if idx >= args.rows {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(
            selection
                .iter()
                .map(|col| record.get(*col).unwrap_or_default().to_string())
                .collect::<Vec<_>>(),
        );
    }

    let shown_headers = selection
        .iter()
        .map(|col| headers[*col].clone())
        .collect::<Vec<_>>();
    table::print_table(&shown_headers, &rows, args.max_width);
    info!("Displayed {} row(s) from {:?}", rows.len(), args.input);
    Ok(())
}

/// Resolves requested column names to header positions. No request means
/// every column in file order.
fn select_columns(headers: &[String], requested: &[String]) -> Result<Vec<usize>> {
    if requested.is_empty() {
        return Ok((0..headers.len()).collect());
    }
    requested
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|header| header == name.trim())
                .ok_or_else(|| anyhow!("Column '{name}' not found in preview input"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["imdb_id", "title", "year"].map(String::from).to_vec()
    }

    #[test]
    fn selection_follows_requested_order() {
        let requested = ["year", " title"].map(String::from);
        assert_eq!(select_columns(&headers(), &requested).unwrap(), vec![2, 1]);
        assert_eq!(select_columns(&headers(), &[]).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let err = select_columns(&headers(), &["budget".to_string()]).unwrap_err();
        assert!(err.to_string().contains("budget"));
    }
}
