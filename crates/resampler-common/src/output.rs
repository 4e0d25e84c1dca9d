//! Table rendering for terminal output.

use std::fmt;

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A rendered-on-demand terminal table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    align: Vec<Align>,
}

impl Table {
    /// Header cells.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Body rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(c))
                    .chain(self.headers.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
        let mut line = String::new();
        line.push(left);
        for (i, w) in widths.iter().enumerate() {
            line.push_str(&"─".repeat(w + 2));
            line.push(if i + 1 == widths.len() { right } else { mid });
        }
        line.push('\n');
        line
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let mut line = String::from("│");
        for (c, w) in widths.iter().enumerate() {
            let cell = cells.get(c).map(String::as_str).unwrap_or("");
            let pad = w.saturating_sub(cell.chars().count());
            match self.align.get(c).copied().unwrap_or(Align::Left) {
                Align::Left => line.push_str(&format!(" {cell}{} │", " ".repeat(pad))),
                Align::Right => line.push_str(&format!(" {}{cell} │", " ".repeat(pad))),
            }
        }
        line.push('\n');
        line
    }

    /// Render the table with box-drawing characters.
    pub fn render(&self) -> String {
        let widths = self.widths();
        if widths.is_empty() {
            return String::new();
        }

        let mut out = Self::rule(&widths, '┌', '┬', '┐');
        if !self.headers.is_empty() {
            out.push_str(&self.line(&self.headers, &widths));
            out.push_str(&Self::rule(&widths, '├', '┼', '┤'));
        }
        for row in &self.rows {
            out.push_str(&self.line(row, &widths));
        }
        out.push_str(&Self::rule(&widths, '└', '┴', '┘'));
        out
    }

    /// Render as a GitHub-flavored markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = format!("| {} |\n", self.headers.join(" | "));
        md.push('|');
        for c in 0..self.headers.len() {
            match self.align.get(c).copied().unwrap_or(Align::Left) {
                Align::Left => md.push_str("---|"),
                Align::Right => md.push_str("---:|"),
            }
        }
        md.push('\n');
        for row in &self.rows {
            md.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        md
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Fluent builder for [`Table`].
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    /// Start an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set header cells.
    pub fn headers(mut self, headers: Vec<&str>) -> Self {
        self.table.headers = headers.into_iter().map(str::to_string).collect();
        self
    }

    /// Append a body row.
    pub fn row(mut self, cells: Vec<&str>) -> Self {
        self.table.rows.push(cells.into_iter().map(str::to_string).collect());
        self
    }

    /// Set per-column alignment; missing columns align left.
    pub fn align(mut self, align: Vec<Align>) -> Self {
        self.table.align = align;
        self
    }

    /// Finish the table.
    pub fn build(self) -> Table {
        self.table
    }
}

/// Format a float with fixed precision, rendering non-finite values as `NA`.
pub fn format_metric(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "NA".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_columns() {
        let table = TableBuilder::new()
            .headers(vec!["Model", "RMSE"])
            .row(vec!["knn", "2.1"])
            .row(vec!["forest", "1.95"])
            .align(vec![Align::Left, Align::Right])
            .build();

        let out = table.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
        assert!(out.contains("│ knn    │  2.1 │"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert_eq!(Table::default().render(), "");
    }

    #[test]
    fn test_markdown_alignment_row() {
        let md = TableBuilder::new()
            .headers(vec!["a", "b"])
            .row(vec!["1", "2"])
            .align(vec![Align::Left, Align::Right])
            .build()
            .to_markdown();
        assert!(md.contains("|---|---:|"));
        assert!(md.contains("| 1 | 2 |"));
    }

    #[test]
    fn test_format_metric_na() {
        assert_eq!(format_metric(f64::NAN, 3), "NA");
        assert_eq!(format_metric(1.23456, 2), "1.23");
    }
}
