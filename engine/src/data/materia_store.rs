// Holds the loaded records and answers filtered slices of them.
use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared::{Field, Materia};

use super::csv_parser::MateriaCsvParser;
use super::json_loader::JsonMateriaLoader;
use crate::config::DashboardSettings;
use crate::error::EngineError;

/// Date range plus per-field multi-selects. Dates are inclusive; an empty
/// selection list does not restrict its field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MateriaFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub selections: IndexMap<Field, Vec<String>>,
}

impl MateriaFilter {
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        MateriaFilter {
            from,
            to,
            ..Default::default()
        }
    }

    pub fn select(mut self, field: Field, value: impl Into<String>) -> Self {
        self.selections.entry(field).or_default().push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.selections.values().all(Vec::is_empty)
    }

    pub fn matches(&self, record: &Materia) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = record.date() else {
                return false;
            };
            let before = self.from.map_or(false, |start| date < start);
            let after = self.to.map_or(false, |end| date > end);
            if before || after {
                return false;
            }
        }
        self.selections.iter().all(|(field, wanted)| {
            wanted.is_empty() || {
                let key = record.group_key(*field);
                wanted.iter().any(|w| w.trim() == key)
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MateriaStore {
    records: Vec<Materia>,
}

impl MateriaStore {
    pub fn new(records: Vec<Materia>) -> Self {
        MateriaStore { records }
    }

    /// Loads `.csv` files with the configured delimiter and anything else as JSON.
    pub fn load(path: &Path, settings: &DashboardSettings) -> Result<Self, EngineError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        let records = if is_csv {
            MateriaCsvParser::load_from_file(path, settings.csv_delimiter()?)?
        } else {
            JsonMateriaLoader::load_from_file(path)?
        };
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Materia] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter(&self, filter: &MateriaFilter) -> Vec<Materia> {
        if filter.is_empty() {
            return self.records.clone();
        }
        let selected: Vec<Materia> =
            self.records.iter().filter(|m| filter.matches(m)).cloned().collect();
        tracing::debug!(
            total = self.records.len(),
            selected = selected.len(),
            "Applied record filter"
        );
        selected
    }

    /// Filter options for `field`: distinct grouping keys, sorted.
    pub fn distinct_values(&self, field: Field) -> Vec<String> {
        self.records
            .iter()
            .map(|m| m.group_key(field))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest parseable dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(Materia::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
