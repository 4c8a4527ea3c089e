//! Facility booking time per club and zone type.

use crate::config::ZoneWeights;
use crate::error::Result;
use crate::schema;
use crate::table::{Cell, Table};
use std::collections::BTreeMap;
use tracing::debug;

use super::ReportOutput;

const CLUB: &str = "Club";
const ZONE: &str = "Club Zone Type Name";
const LENGTH: &str = "Length of Booking";
const DEFINITION: &str = "Facility Booking Definition";

const UNAVAILABLE: &str = "unavailable";
const UNIVERSITY_CLASS: &str = "university class";

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneUsage {
    pub club: String,
    pub zone: String,
    /// Booked time summed over the group.
    pub hours: f64,
    /// `hours` scaled by the zone weight.
    pub adjusted_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingZoneReport {
    pub zones: Vec<ZoneUsage>,
}

impl BookingZoneReport {
    pub fn get(&self, club: &str, zone: &str) -> Option<&ZoneUsage> {
        self.zones.iter().find(|z| z.club == club && z.zone == zone)
    }
}

impl ReportOutput for BookingZoneReport {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            CLUB.to_string(),
            ZONE.to_string(),
            LENGTH.to_string(),
            "Adjusted Time".to_string(),
        ]);
        for z in &self.zones {
            table.push_row(vec![
                Cell::text(z.club.as_str()),
                Cell::text(z.zone.as_str()),
                Cell::Number(z.hours),
                Cell::Number(z.adjusted_hours),
            ]);
        }
        table
    }
}

/// Booking definitions that do not represent bookable use.
fn is_excluded(definition: &Cell) -> bool {
    let Some(text) = definition.as_str() else {
        return false;
    };
    let text = text.to_lowercase();
    text.contains(UNAVAILABLE) || text.contains(UNIVERSITY_CLASS)
}

/// Booking length in seconds. Numbers are minutes.
pub fn parse_duration(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(minutes) if *minutes >= 0.0 => Some(minutes * 60.0),
        Cell::Number(_) => None,
        Cell::Text(s) => parse_duration_text(s),
    }
}

fn parse_duration_text(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(iso) = value.strip_prefix("PT") {
        return parse_iso_time(iso);
    }
    if let Ok(minutes) = value.parse::<f64>() {
        return (minutes.is_finite() && minutes >= 0.0).then_some(minutes * 60.0);
    }

    // "1 day, 2:00:00", "2 days 01:30:00", "3 days"
    let (days, clock) = match value.find("day") {
        Some(pos) => {
            let days: f64 = value[..pos].trim().parse().ok()?;
            let rest = value[pos..]
                .trim_start_matches("days")
                .trim_start_matches("day")
                .trim_start_matches(',')
                .trim();
            (days, rest)
        }
        None => (0.0, value),
    };
    if days < 0.0 {
        return None;
    }
    let clock_seconds = if clock.is_empty() {
        0.0
    } else {
        parse_clock(clock)?
    };
    Some(days * 86_400.0 + clock_seconds)
}

/// `H:MM` or `H:MM:SS[.fff]`, hours unbounded.
fn parse_clock(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    let hours: u64 = h.trim().parse().ok()?;
    let minutes: u64 = m.trim().parse().ok()?;
    let seconds: f64 = s.trim().parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    Some(whole as f64 + seconds)
}

/// ISO-8601 time part such as `1H30M` or `45M10S`.
fn parse_iso_time(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    let mut total = 0.0;
    let mut number = String::new();
    for c in value.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' | 'S' => {
                let n: f64 = number.parse().ok()?;
                number.clear();
                total += match c {
                    'H' => n * 3600.0,
                    'M' => n * 60.0,
                    _ => n,
                };
            }
            _ => return None,
        }
    }
    number.is_empty().then_some(total)
}

/// Sum booked time per (club, zone type), excluding unavailable periods and
/// university classes, and weight each sum by its zone.
///
/// Rows whose length cannot be read contribute nothing but still place their
/// group in the output.
pub fn booking_zones(table: &Table, weights: &ZoneWeights) -> Result<BookingZoneReport> {
    let cols = schema::require(table, "booking zones", &[CLUB, ZONE, LENGTH, DEFINITION])?;
    let (club_col, zone_col, length_col, def_col) = (cols[0], cols[1], cols[2], cols[3]);

    let mut groups: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut excluded = 0usize;
    let mut unreadable = 0usize;
    let mut unkeyed = 0usize;

    for row in 0..table.len() {
        if is_excluded(table.get(row, def_col)) {
            excluded += 1;
            continue;
        }
        let (club, zone) = (table.get(row, club_col), table.get(row, zone_col));
        if club.is_empty() || zone.is_empty() {
            unkeyed += 1;
            continue;
        }
        let key = (club.to_string(), zone.to_string());
        let seconds = parse_duration(table.get(row, length_col)).unwrap_or_else(|| {
            unreadable += 1;
            0.0
        });
        *groups.entry(key).or_insert(0.0) += seconds;
    }

    debug!(
        groups = groups.len(),
        excluded, unreadable, unkeyed, "Aggregated booking zones"
    );

    let zones = groups
        .into_iter()
        .map(|((club, zone), seconds)| {
            let hours = seconds / SECONDS_PER_HOUR;
            let adjusted_hours = seconds * weights.weight(&zone) / SECONDS_PER_HOUR;
            ZoneUsage {
                club,
                zone,
                hours,
                adjusted_hours,
            }
        })
        .collect();

    Ok(BookingZoneReport { zones })
}
