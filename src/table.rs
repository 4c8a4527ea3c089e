//! In-memory table produced by the loaders and consumed by the reports.

use std::fmt;

/// A single cell value as it came out of the spreadsheet or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Classify a raw text value: blank is empty, numeric text is a number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        // Phone numbers and codes keep their leading zeros
        if has_leading_zero(trimmed) {
            return Cell::Text(trimmed.to_string());
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Cell::Empty => None,
        }
    }

    /// Text content with surrounding whitespace removed.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// Compare against a label, treating numbers by their rendered form.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Cell::Text(s) => s.trim() == label,
            Cell::Number(_) => self.to_string() == label,
            Cell::Empty => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Text(s) => f.write_str(s),
        }
    }
}

fn has_leading_zero(value: &str) -> bool {
    let mut chars = value.chars();
    matches!((chars.next(), chars.next()), (Some('0'), Some(c)) if c.is_ascii_digit())
}

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Replace one cell, padding a short row with empties.
    pub fn set(&mut self, row: usize, col: usize, value: Cell) {
        let Some(cells) = self.rows.get_mut(row) else {
            return;
        };
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = value;
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col); positions past the end of a short row read as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Iterate one column top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        (0..self.rows.len()).map(move |row| self.get(row, col))
    }

    /// New table holding the given column positions of the rows `keep` accepts.
    pub fn select_rows<F>(&self, columns: &[usize], mut keep: F) -> Table
    where
        F: FnMut(usize) -> bool,
    {
        let headers = columns.iter().map(|&c| self.headers[c].clone()).collect();
        let mut out = Table::new(headers);
        for row in 0..self.rows.len() {
            if keep(row) {
                out.push_row(columns.iter().map(|&c| self.get(row, c).clone()).collect());
            }
        }
        out
    }
}

#[cfg(test)]
pub(crate) fn table_from(headers: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(|v| Cell::parse(v)).collect());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse("42"), Cell::Number(42.0));
        assert_eq!(Cell::parse(" Upfront "), Cell::Text("Upfront".to_string()));
        assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".to_string()));
        assert_eq!(Cell::parse("0412345678"), Cell::Text("0412345678".to_string()));
        assert_eq!(Cell::parse("0.5"), Cell::Number(0.5));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = table_from(&["Club", "Activity"], &[&["Burwood"]]);
        assert_eq!(table.get(0, 1), &Cell::Empty);
        assert_eq!(table.get(5, 0), &Cell::Empty);
    }

    #[test]
    fn test_select_rows_projects_and_filters() {
        let table = table_from(
            &["Name", "Club", "Email"],
            &[&["Ann", "Burwood", "a@x"], &["Bob", "Waterfront", "b@x"]],
        );
        let out = table.select_rows(&[2, 0], |row| row == 1);
        assert_eq!(out.headers(), &["Email".to_string(), "Name".to_string()]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0, 1), &Cell::Text("Bob".to_string()));
        assert_eq!(table.len(), 2);
    }
}
