use crate::error::{Error, Result};
use crate::table::Table;

/// Resolve every required column up front so reports never index a missing one.
///
/// Returns the column positions in the order requested. All absent names are
/// reported together.
pub fn require(table: &Table, report: &str, columns: &[&str]) -> Result<Vec<usize>> {
    let mut found = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();

    for name in columns {
        match table.column_index(name) {
            Some(idx) => found.push(idx),
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(Error::MissingColumns {
            report: report.to_string(),
            missing,
        })
    }
}
