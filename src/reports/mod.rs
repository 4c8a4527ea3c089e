//! Report functions over a loaded [`Table`].
//!
//! Each report resolves its columns through [`crate::schema::require`] before
//! touching any cell, never mutates its input, and returns a typed result
//! that converts to a table for export.

mod activity;
mod attendance;
mod bookings;
mod ending;
mod membership;

pub use activity::technogym_reporting;
pub use attendance::group_fitness;
pub use bookings::booking_zones;
pub use ending::generate_ending_members_report;
pub use membership::{current_members, new_members};

use crate::config::ReportConfig;
use crate::dates::DatePolicy;
use crate::error::Result;
use crate::table::Table;
use chrono::NaiveDate;
use clap::ValueEnum;

/// Render a report result as rows for display or export.
pub trait ReportOutput {
    fn to_table(&self) -> Table;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    CurrentMembers,
    NewMembers,
    Technogym,
    GroupFitness,
    BookingZones,
    EndingMembers,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::CurrentMembers => "Current Members",
            ReportKind::NewMembers => "New Members",
            ReportKind::Technogym => "Technogym Reporting (Consults/PT)",
            ReportKind::GroupFitness => "Group Fitness Summary",
            ReportKind::BookingZones => "Booking Zones Analysis",
            ReportKind::EndingMembers => "Ending Members",
        }
    }

    /// Rows above the header in this report's usual export.
    pub fn default_skip_rows(&self) -> usize {
        match self {
            // Group fitness exports carry a title line
            ReportKind::GroupFitness => 1,
            _ => 0,
        }
    }
}

/// Caller-supplied parameters shared by the club/date reports.
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub club: String,
    pub reference: NaiveDate,
    /// How unreadable member dates are treated.
    pub date_policy: DatePolicy,
}

/// Run one report and flatten its result to a table.
pub fn run(
    kind: ReportKind,
    table: &Table,
    params: &ReportParams,
    config: &ReportConfig,
) -> Result<Table> {
    let (club, reference, policy) = (params.club.as_str(), params.reference, params.date_policy);
    let out = match kind {
        ReportKind::CurrentMembers => {
            current_members(table, club, reference, &config.plans, policy)?.to_table()
        }
        ReportKind::NewMembers => {
            new_members(table, club, reference, &config.plans, policy)?.to_table()
        }
        ReportKind::Technogym => technogym_reporting(table, &config.activities)?.to_table(),
        ReportKind::GroupFitness => group_fitness(table, &config.clubs)?.to_table(),
        ReportKind::BookingZones => booking_zones(table, &config.zone_weights)?.to_table(),
        ReportKind::EndingMembers => generate_ending_members_report(table, reference, policy)?,
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::{table_from, Cell};

    fn params() -> ReportParams {
        ReportParams {
            club: "DeakinACTIVE Burwood".to_string(),
            reference: NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
            date_policy: DatePolicy::Lenient,
        }
    }

    #[test]
    fn test_every_report_rejects_a_table_without_its_columns() {
        let table = table_from(&["Unrelated"], &[&["x"]]);
        let config = ReportConfig::default();
        for kind in ReportKind::value_variants() {
            match run(*kind, &table, &params(), &config) {
                Err(Error::MissingColumns { missing, .. }) => assert!(!missing.is_empty()),
                other => panic!("{}: unexpected result {other:?}", kind.title()),
            }
        }
    }

    #[test]
    fn test_run_is_repeatable() {
        let table = table_from(
            &["Club", "UserActive"],
            &[&["DeakinACTIVE Burwood", "1"], &["DeakinACTIVE Burwood", "0"]],
        );
        let config = ReportConfig::default();
        let first = run(ReportKind::GroupFitness, &table, &params(), &config).unwrap();
        let second = run(ReportKind::GroupFitness, &table, &params(), &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get(0, 0), &Cell::Text("Burwood".to_string()));
        assert_eq!(first.get(0, 1), &Cell::Number(1.0));
        assert_eq!(first.get(0, 2), &Cell::Number(0.5));
    }

    #[test]
    fn test_member_counts_table() {
        let table = table_from(
            &["Club", "Payment plan type", "End date"],
            &[&["DeakinACTIVE Burwood", "Upfront", ""]],
        );
        let out = run(ReportKind::CurrentMembers, &table, &params(), &ReportConfig::default())
            .unwrap();
        assert_eq!(out.headers(), &["Fortnightly Fixed", "Total"]);
        assert_eq!(out.rows(), &[vec![Cell::Number(0.0), Cell::Number(1.0)]]);
    }
}
