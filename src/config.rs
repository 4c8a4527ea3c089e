//! Fixed report vocabularies: clubs, payment plans, activity taxonomies and
//! booking zone weights.
//!
//! The built-in values match the club's exports. A JSON file can override
//! any subset of them; fields it leaves out keep their defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub clubs: Vec<ClubName>,
    pub plans: PlanCategories,
    pub activities: ActivityTaxonomy,
    pub zone_weights: ZoneWeights,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            clubs: default_clubs(),
            plans: PlanCategories::default(),
            activities: ActivityTaxonomy::default(),
            zone_weights: ZoneWeights::default(),
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }
}

/// A club as it appears in exports, and the short label used in summaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClubName {
    pub name: String,
    pub label: String,
}

impl ClubName {
    fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

fn default_clubs() -> Vec<ClubName> {
    vec![
        ClubName::new("DeakinACTIVE Burwood", "Burwood"),
        ClubName::new("DeakinACTIVE Waterfront", "Waterfront"),
        ClubName::new("DeakinACTIVE Waurn Ponds", "Waurn Ponds"),
        ClubName::new("DeakinACTIVE Warrnambool", "Warrnambool"),
    ]
}

/// The two plan types that count toward committed membership.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanCategories {
    pub fortnightly_fixed: String,
    pub upfront: String,
}

impl Default for PlanCategories {
    fn default() -> Self {
        Self {
            fortnightly_fixed: "Fortnightly Fixed".to_string(),
            upfront: "Upfront".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActivityTaxonomy {
    pub consults: Vec<String>,
    pub personal_training: Vec<String>,
}

impl Default for ActivityTaxonomy {
    fn default() -> Self {
        Self {
            consults: owned(&[
                "Body Scan",
                "Exercise Program Check-in",
                "Follow-Up Health Consultation",
                "Follow-Up Health Consultation and Program Update",
                "Initial Health Consultation",
                "Initial Program Introduction",
            ]),
            personal_training: owned(&[
                "Group Training",
                "Personal Training 30 Minutes",
                "Personal Training 45 Minutes",
                "Personal Training 60 Minutes",
            ]),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Share of a whole facility that one booking of a zone type occupies.
///
/// Zone names are compared ignoring case and whitespace. Zones not listed
/// weigh [`ZoneWeights::DEFAULT_WEIGHT`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ZoneWeights(Vec<(String, f64)>);

impl ZoneWeights {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn weight(&self, zone: &str) -> f64 {
        let key = zone_key(zone);
        self.0
            .iter()
            .find(|(name, _)| zone_key(name) == key)
            .map(|(_, w)| *w)
            .unwrap_or(Self::DEFAULT_WEIGHT)
    }
}

impl Default for ZoneWeights {
    fn default() -> Self {
        Self(vec![
            ("BUR - Badminton Court".to_string(), 1.0 / 6.0),
            ("WP - Badminton Court".to_string(), 1.0 / 6.0),
            ("BUR - Court".to_string(), 0.5),
            ("WP - Court".to_string(), 0.5),
            ("WP - Athletic Track Lane".to_string(), 0.25),
        ])
    }
}

fn zone_key(zone: &str) -> String {
    zone.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
