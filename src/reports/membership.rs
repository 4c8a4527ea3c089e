use crate::config::PlanCategories;
use crate::dates::{self, DatePolicy, DateValue};
use crate::error::Result;
use crate::schema;
use crate::table::{Cell, Table};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::ReportOutput;

const CLUB: &str = "Club";
const PLAN: &str = "Payment plan type";
const END_DATE: &str = "End date";
const JOIN_DATE: &str = "Join date";

/// Member counts for the two committed plan groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberCounts {
    /// Members on the fortnightly fixed plan alone.
    pub fortnightly_fixed: usize,
    /// Members on either the fortnightly fixed or upfront plan.
    pub total: usize,
}

impl MemberCounts {
    fn add(&mut self, plan: &Cell, plans: &PlanCategories) {
        if plan.matches(&plans.fortnightly_fixed) {
            self.fortnightly_fixed += 1;
            self.total += 1;
        } else if plan.matches(&plans.upfront) {
            self.total += 1;
        }
    }
}

impl ReportOutput for MemberCounts {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec!["Fortnightly Fixed".to_string(), "Total".to_string()]);
        table.push_row(vec![
            Cell::Number(self.fortnightly_fixed as f64),
            Cell::Number(self.total as f64),
        ]);
        table
    }
}

/// Members of `club` whose contract is open-ended or ends after `reference`.
pub fn current_members(
    table: &Table,
    club: &str,
    reference: NaiveDate,
    plans: &PlanCategories,
    policy: DatePolicy,
) -> Result<MemberCounts> {
    let cols = schema::require(table, "current members", &[CLUB, PLAN, END_DATE])?;
    let (club_col, plan_col, end_col) = (cols[0], cols[1], cols[2]);
    let end_dates = dates::normalize_column(table, end_col, policy)?;

    let mut counts = MemberCounts::default();
    for (row, end) in end_dates.iter().enumerate() {
        if table.get(row, club_col).matches(club) && end.is_open_or_after(reference) {
            counts.add(table.get(row, plan_col), plans);
        }
    }

    debug!(club, %reference, ?counts, "Counted current members");
    Ok(counts)
}

/// Current members of `club` who joined between the first of the reference
/// month and `reference`, both inclusive.
pub fn new_members(
    table: &Table,
    club: &str,
    reference: NaiveDate,
    plans: &PlanCategories,
    policy: DatePolicy,
) -> Result<MemberCounts> {
    let cols = schema::require(table, "new members", &[CLUB, PLAN, END_DATE, JOIN_DATE])?;
    let (club_col, plan_col, end_col, join_col) = (cols[0], cols[1], cols[2], cols[3]);
    let end_dates = dates::normalize_column(table, end_col, policy)?;
    let join_dates = dates::normalize_column(table, join_col, policy)?;
    let month_start = reference.with_day(1).unwrap_or(reference);

    let mut counts = MemberCounts::default();
    for (row, (end, join)) in end_dates.iter().zip(&join_dates).enumerate() {
        if table.get(row, club_col).matches(club)
            && end.is_open_or_after(reference)
            && join.is_within(month_start, reference)
        {
            counts.add(table.get(row, plan_col), plans);
        }
    }

    let unknown_joins = join_dates.iter().filter(|d| **d == DateValue::Unknown).count();
    debug!(club, %reference, ?counts, unknown_joins, "Counted new members");
    Ok(counts)
}
