//! Result grid
//!
//! Renders a `QueryResult` as a boxed text table followed by a row count.
//! Widths are measured in terminal cells so CJK text and emoji line up.

use crate::db::types::QueryResult;
use std::borrow::Cow;
use unicode_truncate::UnicodeTruncateStr;
use unicode_width::UnicodeWidthStr;

/// Widest a single column may grow before cells are cut
pub const MAX_CELL_WIDTH: usize = 40;

const ELLIPSIS: char = '…';

/// Render with the default cell width limit
pub fn render_table(result: &QueryResult) -> String {
    render_table_with_width(result, MAX_CELL_WIDTH)
}

pub fn render_table_with_width(result: &QueryResult, max_width: usize) -> String {
    let max_width = max_width.max(2);

    let header: Vec<Cow<'_, str>> = result
        .columns
        .iter()
        .map(|c| fit(c, max_width))
        .collect();
    let body: Vec<Vec<Cow<'_, str>>> = result
        .rows
        .iter()
        .map(|row| {
            result
                .row_values(row)
                .map(|cell| fit(cell.as_text(), max_width))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let border = border_line(&widths);
    let mut out = String::new();
    out.push_str(&border);
    out.push_str(&grid_line(&header, &widths));
    out.push_str(&border);
    for row in &body {
        out.push_str(&grid_line(row, &widths));
    }
    if !body.is_empty() {
        out.push_str(&border);
    }
    out.push_str(&row_count(result.row_count()));
    out
}

/// "1 row" / "N rows"
pub fn row_count(n: usize) -> String {
    if n == 1 {
        "1 row".to_string()
    } else {
        format!("{} rows", n)
    }
}

/// Flatten control characters and cut to `max` display cells
fn fit(text: &str, max: usize) -> Cow<'_, str> {
    let text: Cow<'_, str> = if text.contains(['\n', '\r', '\t']) {
        Cow::Owned(text.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(text)
    };
    if text.width() <= max {
        return text;
    }
    let (cut, _) = text.unicode_truncate(max - 1);
    Cow::Owned(format!("{}{}", cut, ELLIPSIS))
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn grid_line(cells: &[Cow<'_, str>], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(w - cell.width()));
        line.push_str(" |");
    }
    line.push('\n');
    line
}
