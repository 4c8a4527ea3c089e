use crate::config::ClubName;
use crate::error::Result;
use crate::schema;
use crate::table::{Cell, Table};
use tracing::debug;

use super::ReportOutput;

const CLUB: &str = "Club";
const USER_ACTIVE: &str = "UserActive";

/// Every class row appears twice in the group fitness export.
// NOTE: assumed from the export, not derived. An odd row count floors.
const DUPLICATION_FACTOR: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ClubAttendance {
    pub club: String,
    pub classes: usize,
    pub attendees: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupFitnessSummary {
    pub clubs: Vec<ClubAttendance>,
}

impl GroupFitnessSummary {
    pub fn get(&self, club: &str) -> Option<&ClubAttendance> {
        self.clubs.iter().find(|c| c.club == club)
    }
}

impl ReportOutput for GroupFitnessSummary {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            "Club".to_string(),
            "Classes".to_string(),
            "Attendees".to_string(),
        ]);
        for c in &self.clubs {
            table.push_row(vec![
                Cell::text(c.club.as_str()),
                Cell::Number(c.classes as f64),
                Cell::Number(c.attendees),
            ]);
        }
        table
    }
}

/// Attendance flag as a count. Boolean exports read TRUE/FALSE; anything
/// else non-numeric is zero.
fn flag_value(cell: &Cell) -> f64 {
    if let Some(n) = cell.as_number() {
        return n;
    }
    match cell.as_str() {
        Some(s) if s.eq_ignore_ascii_case("true") => 1.0,
        _ => 0.0,
    }
}

/// Classes run and attendance per club, halved for the duplicated rows.
///
/// Only the clubs in `clubs` are reported, in that order. Non-numeric
/// attendance flags count as zero.
pub fn group_fitness(table: &Table, clubs: &[ClubName]) -> Result<GroupFitnessSummary> {
    let cols = schema::require(table, "group fitness", &[CLUB, USER_ACTIVE])?;
    let (club_col, active_col) = (cols[0], cols[1]);

    let mut totals = vec![(0usize, 0.0f64); clubs.len()];
    for row in 0..table.len() {
        let club = table.get(row, club_col);
        let Some(idx) = clubs.iter().position(|c| club.matches(&c.name)) else {
            continue;
        };
        totals[idx].0 += 1;
        totals[idx].1 += flag_value(table.get(row, active_col));
    }

    let clubs = clubs
        .iter()
        .zip(totals)
        .map(|(club, (rows, active))| {
            if rows % DUPLICATION_FACTOR != 0 {
                debug!(club = %club.name, rows, "Odd row count in duplicated export");
            }
            ClubAttendance {
                club: club.label.clone(),
                classes: rows / DUPLICATION_FACTOR,
                attendees: active / DUPLICATION_FACTOR as f64,
            }
        })
        .collect();

    Ok(GroupFitnessSummary { clubs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::error::Error;
    use crate::table::table_from;

    #[test]
    fn test_duplicate_rows_are_halved() {
        let table = table_from(
            &["Club", "UserActive"],
            &[
                &["DeakinACTIVE Burwood", "1"],
                &["DeakinACTIVE Burwood", "1"],
                &["DeakinACTIVE Burwood", "1"],
                &["DeakinACTIVE Burwood", "1"],
            ],
        );
        let summary = group_fitness(&table, &ReportConfig::default().clubs).unwrap();
        let burwood = summary.get("Burwood").unwrap();
        assert_eq!(burwood.classes, 2);
        assert_eq!(burwood.attendees, 2.0);
    }

    #[test]
    fn test_boolean_flags_count_as_attendees() {
        let table = table_from(
            &["Club", "UserActive"],
            &[
                &["DeakinACTIVE Waurn Ponds", "TRUE"],
                &["DeakinACTIVE Waurn Ponds", "True"],
                &["DeakinACTIVE Waurn Ponds", "FALSE"],
                &["DeakinACTIVE Waurn Ponds", "true"],
            ],
        );
        let summary = group_fitness(&table, &ReportConfig::default().clubs).unwrap();
        let wp = summary.get("Waurn Ponds").unwrap();
        assert_eq!(wp.classes, 2);
        assert_eq!(wp.attendees, 1.5);
    }

    #[test]
    fn test_fixed_clubs_in_order_and_others_ignored() {
        let table = table_from(
            &["Club", "UserActive"],
            &[
                &["DeakinACTIVE Warrnambool", "3"],
                &["DeakinACTIVE Warrnambool", "3"],
                &["Elsewhere Gym", "10"],
                &["Elsewhere Gym", "10"],
                &["DeakinACTIVE Waterfront", "n/a"],
                &["DeakinACTIVE Waterfront", "5"],
            ],
        );
        let summary = group_fitness(&table, &ReportConfig::default().clubs).unwrap();
        let labels: Vec<&str> = summary.clubs.iter().map(|c| c.club.as_str()).collect();
        assert_eq!(labels, vec!["Burwood", "Waterfront", "Waurn Ponds", "Warrnambool"]);

        assert_eq!(summary.get("Burwood").unwrap().classes, 0);
        assert_eq!(summary.get("Warrnambool").unwrap().attendees, 3.0);
        let waterfront = summary.get("Waterfront").unwrap();
        assert_eq!(waterfront.classes, 1);
        assert_eq!(waterfront.attendees, 2.5);
    }

    #[test]
    fn test_missing_columns() {
        let table = table_from(&["Location"], &[]);
        match group_fitness(&table, &ReportConfig::default().clubs) {
            Err(Error::MissingColumns { missing, .. }) => {
                assert_eq!(missing, vec!["Club", "UserActive"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
