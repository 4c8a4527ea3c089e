//! Date normalization for loosely formatted export columns.
//!
//! Every date-like cell becomes a [`DateValue`]; anything that cannot be read
//! is `Unknown` rather than an error unless [`DatePolicy::Strict`] is asked for.

use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Date-only text forms, day-first for slashed dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y", "%Y/%m/%d"];

/// Date-time text forms; the time-of-day is dropped after parsing.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Earliest year accepted from text; `%Y` also takes two-digit years.
const MIN_TEXT_YEAR: i32 = 1000;

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Known(NaiveDate),
    Unknown,
}

impl DateValue {
    /// Open-ended or strictly after `reference`. Unknown counts as open-ended.
    pub fn is_open_or_after(&self, reference: NaiveDate) -> bool {
        match self {
            DateValue::Known(d) => *d > reference,
            DateValue::Unknown => true,
        }
    }

    /// Same calendar day. Unknown never matches.
    pub fn is_on(&self, reference: NaiveDate) -> bool {
        matches!(self, DateValue::Known(d) if *d == reference)
    }

    /// Inclusive on both ends. Unknown never matches.
    pub fn is_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        matches!(self, DateValue::Known(d) if *d >= start && *d <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
    /// Unreadable values become `Unknown`.
    Lenient,
    /// Unreadable values fail the whole column. Blank cells are still `Unknown`.
    Strict,
}

/// Parse a caller-supplied reference date. Only `YYYY-MM-DD` is accepted.
pub fn parse_reference_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::UnparseableReferenceDate(value.to_string()))
}

/// Read a single cell as a date, or `None` if it holds nothing recognisable.
pub fn parse_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => from_excel_serial(*n),
        Cell::Text(s) => parse_text(s),
    }
}

fn parse_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let plausible = |d: &NaiveDate| d.year() >= MIN_TEXT_YEAR;
    for fmt in DATE_FORMATS {
        if let Some(d) = NaiveDate::parse_from_str(value, fmt).ok().filter(plausible) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Some(d) = NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .map(|dt| dt.date())
            .filter(plausible)
        {
            return Some(d);
        }
    }
    // Serial numbers that arrived as text
    value.parse::<f64>().ok().and_then(from_excel_serial)
}

/// Excel serial day number (1900 date system) to a date.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Normalize one column of `table` into a date per row.
pub fn normalize_column(table: &Table, col: usize, policy: DatePolicy) -> Result<Vec<DateValue>> {
    let mut values = Vec::with_capacity(table.len());
    let mut degraded = 0usize;

    for (row, cell) in table.column(col).enumerate() {
        let value = match parse_cell(cell) {
            Some(d) => DateValue::Known(d),
            None if cell.is_empty() => DateValue::Unknown,
            None => match policy {
                DatePolicy::Lenient => {
                    degraded += 1;
                    DateValue::Unknown
                }
                DatePolicy::Strict => {
                    return Err(Error::UnparseableDate {
                        column: table.headers()[col].clone(),
                        row: row + 1,
                        value: cell.to_string(),
                    })
                }
            },
        };
        values.push(value);
    }

    if degraded > 0 {
        debug!(
            column = %table.headers()[col],
            degraded,
            "Unparseable dates treated as unknown"
        );
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table_from;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_text_formats() {
        assert_eq!(parse_cell(&Cell::text("2025-04-30")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("30/04/2025")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("2025-04-30 17:45:00")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("2025-04-30T08:00:00.123")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("30/04/2025 23:59")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("30-Apr-2025")), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::text("not a date")), None);
        // Two-digit years are not read as the first century
        assert_eq!(parse_cell(&Cell::text("04-05-25")), None);
        assert_eq!(parse_cell(&Cell::text("04-30-25")), None);
        assert_eq!(parse_cell(&Cell::Empty), None);
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(parse_cell(&Cell::Number(45777.0)), Some(date(2025, 4, 30)));
        // Time-of-day fraction is dropped
        assert_eq!(parse_cell(&Cell::Number(45777.75)), Some(date(2025, 4, 30)));
        assert_eq!(parse_cell(&Cell::Number(-3.0)), None);
        assert_eq!(parse_cell(&Cell::Number(1e9)), None);
    }

    #[test]
    fn test_reference_date_is_strict() {
        assert_eq!(parse_reference_date("2025-04-30").unwrap(), date(2025, 4, 30));
        assert!(matches!(
            parse_reference_date("30/04/2025"),
            Err(Error::UnparseableReferenceDate(_))
        ));
        assert!(parse_reference_date("2025-02-30").is_err());
    }

    #[test]
    fn test_tri_state_predicates() {
        let reference = date(2025, 4, 30);
        assert!(DateValue::Unknown.is_open_or_after(reference));
        assert!(!DateValue::Unknown.is_on(reference));
        assert!(!DateValue::Unknown.is_within(date(2025, 4, 1), reference));

        assert!(!DateValue::Known(reference).is_open_or_after(reference));
        assert!(DateValue::Known(date(2025, 5, 1)).is_open_or_after(reference));
        assert!(DateValue::Known(reference).is_on(reference));
        assert!(DateValue::Known(date(2025, 4, 1)).is_within(date(2025, 4, 1), reference));
    }

    #[test]
    fn test_normalize_column_policies() {
        let table = table_from(&["End date"], &[&["2025-04-30"], &[""], &["soon"]]);

        let lenient = normalize_column(&table, 0, DatePolicy::Lenient).unwrap();
        assert_eq!(
            lenient,
            vec![DateValue::Known(date(2025, 4, 30)), DateValue::Unknown, DateValue::Unknown]
        );

        let err = normalize_column(&table, 0, DatePolicy::Strict).unwrap_err();
        match err {
            Error::UnparseableDate { column, row, value } => {
                assert_eq!(column, "End date");
                assert_eq!(row, 3);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
