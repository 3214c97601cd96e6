//! Completeness filtering: credited personnel must all be present.

use log::{debug, info};

use crate::{
    data::Value,
    dataset::{CleanTable, describe_record},
};

/// Drops every row with a null in any of `required` and returns the number of
/// rows dropped. Required columns absent from the table are reported and
/// ignored. `id_column` only labels the dropped rows in debug output.
pub fn drop_incomplete(table: &mut CleanTable, required: &[String], id_column: &str) -> usize {
    let columns = required
        .iter()
        .filter_map(|column| {
            let idx = table.column_index(column);
            if idx.is_none() {
                debug!("Required column '{column}' is not part of the table");
            }
            idx.map(|idx| (column.as_str(), idx))
        })
        .collect::<Vec<_>>();
    let id_index = table.column_index(id_column);
    let before = table.len();
    let mut position = 0;
    table.retain_rows(|row| {
        let missing = columns
            .iter()
            .filter(|(_, idx)| !row.get(*idx).is_some_and(Option::is_some))
            .map(|(column, _)| *column)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            let id = id_index
                .and_then(|idx| row.get(idx))
                .and_then(Option::as_ref)
                .map(Value::as_display);
            debug!(
                "Dropping {}: missing {}",
                describe_record(position, id.as_deref()),
                missing.join(", ")
            );
        }
        position += 1;
        missing.is_empty()
    });
    let dropped = before - table.len();
    info!(
        "Completeness filter dropped {dropped} of {before} row(s) missing one of: {}",
        required.join(", ")
    );
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<Value> {
        Some(Value::String(value.to_string()))
    }

    #[test]
    fn any_missing_credit_drops_the_row() {
        let mut table = CleanTable::new(
            vec![
                "title".to_string(),
                "writer".to_string(),
                "actors".to_string(),
                "director".to_string(),
            ],
            vec![
                vec![text("Heat"), text("Michael Mann"), text("Al Pacino"), text("Michael Mann")],
                vec![text("Untitled"), None, text("Someone"), text("Someone Else")],
                vec![text("Silent"), text("W"), text("A"), None],
            ],
        );
        let required = ["writer", "actors", "director"].map(String::from);
        assert_eq!(drop_incomplete(&mut table, &required, "imdb_id"), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "title"), Some(&Value::String("Heat".to_string())));
    }

    #[test]
    fn rows_are_labelled_by_id_column_when_present() {
        let mut table = CleanTable::new(
            vec!["imdb_id".to_string(), "writer".to_string()],
            vec![
                vec![text("tt0113277"), text("Michael Mann")],
                vec![text("tt0000001"), None],
                vec![None, None],
            ],
        );
        let required = vec!["writer".to_string(), "composer".to_string()];
        assert_eq!(drop_incomplete(&mut table, &required, "imdb_id"), 2);
        assert_eq!(table.cell(0, "imdb_id"), Some(&Value::String("tt0113277".to_string())));
    }
}
