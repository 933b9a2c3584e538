use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::columns::{default_weights, ColumnMapping, Criterion, NamingConvention};
use crate::filter::{FilterSet, Predicate};

pub const DEFAULT_DATA_PATH: &str = "saw_results.csv";
pub const DEFAULT_TOP: usize = 10;

/// Settings read from an optional TOML file. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub data: DataSettings,
    /// Overrides for the default criterion weights.
    pub weights: BTreeMap<Criterion, f64>,
    pub filters: FilterSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSettings {
    pub path: PathBuf,
    pub naming: NamingConvention,
    pub name_column: Option<String>,
    pub columns: BTreeMap<Criterion, String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            naming: NamingConvention::default(),
            name_column: None,
            columns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    pub min_subscribers: Option<f64>,
    pub min_engagement: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub top: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { top: DEFAULT_TOP }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn mapping(&self) -> ColumnMapping {
        let mut mapping = ColumnMapping::for_convention(self.data.naming);
        if let Some(name_column) = &self.data.name_column {
            mapping = mapping.with_name_column(name_column.clone());
        }
        for (criterion, column) in &self.data.columns {
            mapping = mapping.with_column(*criterion, column.clone());
        }
        mapping
    }

    /// Default weights with the configured overrides applied.
    pub fn weights(&self) -> BTreeMap<Criterion, f64> {
        let mut weights = default_weights();
        weights.extend(self.weights.iter().map(|(c, w)| (*c, *w)));
        weights
    }

    pub fn filters(&self, mapping: &ColumnMapping) -> FilterSet {
        let mut filters = FilterSet::new();
        if let Some(min) = self.filters.min_subscribers {
            filters.push(Predicate::at_least(
                mapping.column(Criterion::SubscriberCount),
                min,
            ));
        }
        if let Some(min) = self.filters.min_engagement {
            filters.push(Predicate::at_least(
                mapping.column(Criterion::EngagementRate),
                min,
            ));
        }
        filters
    }
}
