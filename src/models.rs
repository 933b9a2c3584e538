use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::ScoreError;

/// Suffix appended to a criterion column when its normalized value is exposed.
pub const NORMALIZED_SUFFIX: &str = "_norm";

pub fn normalized_column(column: &str) -> String {
    format!("{column}{NORMALIZED_SUFFIX}")
}

/// One channel row: its name plus raw numeric metrics keyed by column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecord {
    pub name: String,
    pub metrics: BTreeMap<String, f64>,
}

impl ChannelRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, column: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(column.into(), value);
        self
    }

    pub fn metric(&self, column: &str) -> Option<f64> {
        self.metrics.get(column).copied()
    }
}

/// The raw input table. Every record carries a finite value for every numeric
/// column and channel names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTable {
    name_column: String,
    columns: Vec<String>,
    records: Vec<ChannelRecord>,
}

impl ChannelTable {
    pub fn new(
        name_column: impl Into<String>,
        columns: Vec<String>,
        records: Vec<ChannelRecord>,
    ) -> Result<Self, ScoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(ScoreError::invalid_input(format!(
                    "duplicate channel name `{}`",
                    record.name
                )));
            }

            for column in &columns {
                let value = record.metric(column).ok_or_else(|| {
                    ScoreError::invalid_input(format!(
                        "channel `{}` has no value for `{column}`",
                        record.name
                    ))
                })?;
                if !value.is_finite() {
                    return Err(ScoreError::invalid_input(format!(
                        "channel `{}` has invalid value {value} for `{column}`",
                        record.name
                    )));
                }
            }
        }

        Ok(Self {
            name_column: name_column.into(),
            columns,
            records,
        })
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derived copy holding a subset of this table's rows.
    pub(crate) fn with_records(&self, records: Vec<ChannelRecord>) -> Self {
        Self {
            name_column: self.name_column.clone(),
            columns: self.columns.clone(),
            records,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: ChannelRecord,
    /// Aligned with [`NormalizedTable::criteria`].
    pub normalized: Vec<f64>,
}

/// A channel table with one added normalized value per criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub name_column: String,
    /// Raw numeric columns carried by every record.
    pub columns: Vec<String>,
    pub criteria: Vec<String>,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn criterion_index(&self, column: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c == column)
    }

    pub fn normalized_value(&self, row: usize, column: &str) -> Option<f64> {
        let index = self.criterion_index(column)?;
        self.records.get(row).map(|r| r.normalized[index])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub name: String,
    pub metrics: BTreeMap<String, f64>,
    /// Aligned with [`RankedTable::criteria`].
    pub normalized: Vec<f64>,
    pub score: f64,
    pub rank: usize,
}

/// Scored channels sorted by descending score with 1-based ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTable {
    pub name_column: String,
    pub columns: Vec<String>,
    pub criteria: Vec<String>,
    pub records: Vec<ScoredRecord>,
}

impl RankedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` rows, ranks untouched.
    pub fn top(&self, n: usize) -> Self {
        Self {
            name_column: self.name_column.clone(),
            columns: self.columns.clone(),
            criteria: self.criteria.clone(),
            records: self.records.iter().take(n).cloned().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScoredRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub(crate) fn with_records(&self, records: Vec<ScoredRecord>) -> Self {
        Self {
            name_column: self.name_column.clone(),
            columns: self.columns.clone(),
            criteria: self.criteria.clone(),
            records,
        }
    }
}
