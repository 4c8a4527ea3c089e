use crate::config::ActivityTaxonomy;
use crate::error::Result;
use crate::schema;
use crate::table::{Cell, Table};
use tracing::debug;

use super::ReportOutput;

const ACTIVITY: &str = "Activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounts {
    pub consults: usize,
    pub personal_training: usize,
}

impl ReportOutput for SessionCounts {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            "Health Consults".to_string(),
            "Personal Training".to_string(),
        ]);
        table.push_row(vec![
            Cell::Number(self.consults as f64),
            Cell::Number(self.personal_training as f64),
        ]);
        table
    }
}

/// Count health consult and personal training sessions.
///
/// Rows whose activity is in neither list are ignored.
pub fn technogym_reporting(table: &Table, taxonomy: &ActivityTaxonomy) -> Result<SessionCounts> {
    let cols = schema::require(table, "technogym", &[ACTIVITY])?;

    let mut counts = SessionCounts::default();
    let mut unmatched = 0usize;
    for cell in table.column(cols[0]) {
        let is = |list: &[String]| list.iter().any(|label| cell.matches(label));
        if is(taxonomy.consults.as_slice()) {
            counts.consults += 1;
        } else if is(taxonomy.personal_training.as_slice()) {
            counts.personal_training += 1;
        } else {
            unmatched += 1;
        }
    }

    debug!(?counts, unmatched, "Classified sessions");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::table_from;

    #[test]
    fn test_counts_each_taxonomy() {
        let table = table_from(
            &["Activity", "Club"],
            &[
                &["Body Scan", "x"],
                &["Initial Health Consultation", "x"],
                &["Personal Training 45 Minutes", "x"],
                &["Group Training", "x"],
                &["Group Training", "x"],
                &["Yoga", "x"],
                &["", "x"],
            ],
        );
        let counts = technogym_reporting(&table, &ActivityTaxonomy::default()).unwrap();
        assert_eq!(
            counts,
            SessionCounts {
                consults: 2,
                personal_training: 3
            }
        );
    }

    #[test]
    fn test_substitute_taxonomy() {
        let taxonomy = ActivityTaxonomy {
            consults: vec!["Yoga".to_string()],
            personal_training: vec![],
        };
        let table = table_from(&["Activity"], &[&["Yoga"], &["Body Scan"]]);
        let counts = technogym_reporting(&table, &taxonomy).unwrap();
        assert_eq!(counts.consults, 1);
        assert_eq!(counts.personal_training, 0);
    }

    #[test]
    fn test_missing_activity_column() {
        let table = table_from(&["Club"], &[]);
        assert!(matches!(
            technogym_reporting(&table, &ActivityTaxonomy::default()),
            Err(Error::MissingColumns { missing, .. }) if missing == vec!["Activity"]
        ));
    }
}
