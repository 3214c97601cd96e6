use std::borrow::Cow;
use std::fmt::Write as _;

const ELLIPSIS: char = '…';

/// Renders rows as aligned columns. Cells wider than `max_width` characters
/// are cut and end in an ellipsis; `0` keeps every cell whole.
pub fn render_table(headers: &[String], rows: &[Vec<String>], max_width: usize) -> String {
    let column_count = headers.len();
    let prepare = |value: &str| truncate_cell(&sanitize_cell(value), max_width);
    let headers = headers.iter().map(|h| prepare(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().take(column_count).map(|c| prepare(c)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>], max_width: usize) {
    print!("{}", render_table(headers, rows, max_width));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let padding = width.saturating_sub(value.chars().count());
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn truncate_cell(value: &str, max_width: usize) -> String {
    if max_width == 0 || value.chars().count() <= max_width {
        return value.to_string();
    }
    let mut truncated = value
        .chars()
        .take(max_width.saturating_sub(1))
        .collect::<String>();
    truncated.push(ELLIPSIS);
    truncated
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_table_aligns_columns() {
        let headers = vec!["title".to_string(), "year".to_string()];
        let rows = vec![
            vec!["Heat".to_string(), "1995".to_string()],
            vec!["Halloween".to_string(), "1978".to_string()],
        ];
        let rendered = render_table(&headers, &rows, 0);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "title      year",
                "---------  ----",
                "Heat       1995",
                "Halloween  1978"
            ]
        );
    }

    #[test]
    fn render_table_truncates_long_cells() {
        let headers = vec!["plot".to_string()];
        let rows = vec![vec!["A masked killer\nreturns home".to_string()]];
        let rendered = render_table(&headers, &rows, 10);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "A masked …");
    }
}
