//! The local hours record: per-day, per-category desired hours.
//!
//! Stored as pretty-printed JSON, `date → category → hours`, with ordered
//! maps so saved files diff cleanly. The record is input to a submission
//! pass; the remote timesheet is never read into it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use timeclerk::{DateKey, HourEntry};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoursRecord {
    days: BTreeMap<DateKey, BTreeMap<String, f64>>,
}

impl HoursRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading hours record {}", path.display()))?;
        let record: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing hours record {}", path.display()))?;
        record.validate()?;
        Ok(record)
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serializing hours record")?;
        fs::write(path, raw)
            .with_context(|| format!("writing hours record {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        for (date, categories) in &self.days {
            for (category, &hours) in categories {
                if !hours.is_finite() || hours < 0.0 {
                    bail!("invalid hours {hours} for '{category}' on {date}");
                }
            }
        }
        Ok(())
    }

    pub fn set(&mut self, date: DateKey, category: &str, hours: f64) -> Result<()> {
        if !hours.is_finite() || hours < 0.0 {
            bail!("invalid hours {hours}: hours must be a non-negative number");
        }
        if category.trim().is_empty() {
            bail!("category must not be empty");
        }
        self.days
            .entry(date)
            .or_default()
            .insert(category.to_string(), hours);
        Ok(())
    }

    /// Entries for one date, in category order.
    pub fn entries_for(&self, date: DateKey) -> Vec<HourEntry> {
        self.days
            .get(&date)
            .map(|categories| {
                categories
                    .iter()
                    .map(|(category, &hours)| HourEntry::new(category.as_str(), date, hours))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All entries, ordered by date then category.
    pub fn all_entries(&self) -> Vec<HourEntry> {
        self.days
            .iter()
            .flat_map(|(&date, categories)| {
                categories
                    .iter()
                    .map(move |(category, &hours)| HourEntry::new(category.as_str(), date, hours))
            })
            .collect()
    }
}
