use crate::dates::{self, DatePolicy};
use crate::error::Result;
use crate::schema;
use crate::table::{Cell, Table};
use chrono::NaiveDate;
use tracing::debug;

const END_DATE: &str = "End date";

/// Columns kept in the ending members export, in output order.
pub const ENDING_MEMBER_COLUMNS: &[&str] = &[
    "Name",
    "Last name",
    "Club",
    "Payment Plan Name",
    END_DATE,
    "Email",
    "Mobile number",
];

/// Members whose contract ends on `reference`.
///
/// Rows with a missing or unreadable end date never match. The end date
/// column is rewritten as `YYYY-MM-DD`; other columns pass through.
pub fn generate_ending_members_report(
    table: &Table,
    reference: NaiveDate,
    policy: DatePolicy,
) -> Result<Table> {
    let cols = schema::require(table, "ending members", ENDING_MEMBER_COLUMNS)?;
    let end_pos = ENDING_MEMBER_COLUMNS
        .iter()
        .position(|c| *c == END_DATE)
        .unwrap_or_default();
    let end_dates = dates::normalize_column(table, cols[end_pos], policy)?;

    let mut out = table.select_rows(&cols, |row| end_dates[row].is_on(reference));
    let formatted = Cell::text(reference.format("%Y-%m-%d").to_string());
    for row in 0..out.len() {
        out.set(row, end_pos, formatted.clone());
    }

    debug!(%reference, matched = out.len(), "Selected ending members");
    Ok(out)
}
