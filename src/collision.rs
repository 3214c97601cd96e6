//! Title collision resolution.
//!
//! Later rows whose title is already taken get the first free numeric suffix
//! (`Halloween2`, `Halloween3`, ...). With a suffix bound, a row that finds
//! every suffix taken keeps its title and is reported as an overflow.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    data::Value,
    dataset::{CleanTable, describe_record},
};

const FIRST_SUFFIX: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionOverflow {
    pub title: String,
    /// 0-based row position in the table being resolved.
    pub position: usize,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionSummary {
    pub renamed: usize,
    pub overflows: Vec<CollisionOverflow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unique,
    Renamed(String),
    Overflow,
}

#[derive(Debug, Clone, Default)]
pub struct TitleResolver {
    max_suffix: Option<u32>,
    assigned: HashSet<String>,
    next_suffix: HashMap<String, u32>,
}

impl TitleResolver {
    pub fn new(max_suffix: Option<u32>) -> Self {
        Self {
            max_suffix,
            ..Self::default()
        }
    }

    pub fn resolve(&mut self, title: &str) -> Resolution {
        if self.assigned.insert(title.to_string()) {
            return Resolution::Unique;
        }
        let mut suffix = self
            .next_suffix
            .get(title)
            .copied()
            .unwrap_or(FIRST_SUFFIX);
        loop {
            if self.max_suffix.is_some_and(|max| suffix > max) {
                return Resolution::Overflow;
            }
            let candidate = format!("{title}{suffix}");
            if self.assigned.insert(candidate.clone()) {
                self.next_suffix.insert(title.to_string(), suffix + 1);
                return Resolution::Renamed(candidate);
            }
            suffix += 1;
        }
    }
}

/// Rewrites duplicate titles in place. Rows without a title are left alone.
pub fn resolve_titles(
    table: &mut CleanTable,
    title_column: &str,
    id_column: &str,
    max_suffix: Option<u32>,
) -> CollisionSummary {
    let mut summary = CollisionSummary::default();
    let Some(title_idx) = table.column_index(title_column) else {
        warn!("Title column '{title_column}' is not part of the table; skipping collision resolution");
        return summary;
    };
    let id_idx = table.column_index(id_column);
    let mut resolver = TitleResolver::new(max_suffix);

    for (position, row) in table.rows_mut().iter_mut().enumerate() {
        let Some(title) = row.get(title_idx).and_then(Option::as_ref).map(Value::as_display)
        else {
            debug!("Row {position} has no title");
            continue;
        };
        match resolver.resolve(&title) {
            Resolution::Unique => {}
            Resolution::Renamed(renamed) => {
                debug!("Renamed duplicate '{title}' at row {position} to '{renamed}'");
                row[title_idx] = Some(Value::String(renamed));
                summary.renamed += 1;
            }
            Resolution::Overflow => {
                let id = id_idx
                    .and_then(|idx| row.get(idx))
                    .and_then(Option::as_ref)
                    .map(Value::as_display);
                warn!(
                    "More than {} titles named '{title}'; {} left unresolved",
                    max_suffix.unwrap_or_default(),
                    describe_record(position, id.as_deref())
                );
                summary.overflows.push(CollisionOverflow {
                    title,
                    position,
                    id,
                });
            }
        }
    }

    info!(
        "Resolved title collisions: {} renamed, {} overflow(s)",
        summary.renamed,
        summary.overflows.len()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(titles: &[&str]) -> CleanTable {
        CleanTable::new(
            vec!["imdb_id".to_string(), "title".to_string()],
            titles
                .iter()
                .enumerate()
                .map(|(idx, title)| {
                    vec![
                        Some(Value::String(format!("tt{idx}"))),
                        Some(Value::String(title.to_string())),
                    ]
                })
                .collect(),
        )
    }

    fn titles(table: &CleanTable) -> Vec<String> {
        (0..table.len())
            .map(|row| table.cell(row, "title").map(Value::as_display).unwrap_or_default())
            .collect()
    }

    #[test]
    fn duplicates_get_increasing_suffixes() {
        let mut table = table(&["Halloween", "Halloween", "Heat", "Halloween"]);
        let summary = resolve_titles(&mut table, "title", "imdb_id", None);
        assert_eq!(titles(&table), ["Halloween", "Halloween2", "Heat", "Halloween3"]);
        assert_eq!(summary.renamed, 2);
        assert!(summary.overflows.is_empty());
    }

    #[test]
    fn bounded_mode_reports_overflow_and_keeps_title() {
        let mut table = table(&["Halloween"; 5]);
        let summary = resolve_titles(&mut table, "title", "imdb_id", Some(4));
        assert_eq!(
            titles(&table),
            ["Halloween", "Halloween2", "Halloween3", "Halloween4", "Halloween"]
        );
        assert_eq!(
            summary.overflows,
            vec![CollisionOverflow {
                title: "Halloween".to_string(),
                position: 4,
                id: Some("tt4".to_string()),
            }]
        );
    }

    #[test]
    fn unbounded_mode_never_overflows() {
        let mut table = table(&["Alien"; 7]);
        let summary = resolve_titles(&mut table, "title", "imdb_id", None);
        assert_eq!(titles(&table)[6], "Alien7");
        assert!(summary.overflows.is_empty());
    }

    #[test]
    fn suffix_skips_titles_already_taken() {
        let mut resolver = TitleResolver::new(Some(4));
        assert_eq!(resolver.resolve("Heat2"), Resolution::Unique);
        assert_eq!(resolver.resolve("Heat"), Resolution::Unique);
        assert_eq!(
            resolver.resolve("Heat"),
            Resolution::Renamed("Heat3".to_string())
        );
        assert_eq!(
            resolver.resolve("Heat"),
            Resolution::Renamed("Heat4".to_string())
        );
        assert_eq!(resolver.resolve("Heat"), Resolution::Overflow);
    }
}
