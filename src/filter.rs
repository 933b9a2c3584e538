use tracing::warn;

use crate::error::ScoreError;
use crate::models::{ChannelRecord, ChannelTable, RankedTable, ScoredRecord};

/// A row that exposes a channel name and numeric metrics by column.
pub trait MetricRow {
    fn name(&self) -> &str;
    fn metric(&self, column: &str) -> Option<f64>;
}

impl MetricRow for ChannelRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self, column: &str) -> Option<f64> {
        ChannelRecord::metric(self, column)
    }
}

impl MetricRow for ScoredRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self, column: &str) -> Option<f64> {
        self.metrics.get(column).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Keeps rows whose metric is at least `threshold`.
    AtLeast { column: String, threshold: f64 },
    /// Case-insensitive substring match on the channel name.
    NameContains(String),
}

impl Predicate {
    pub fn at_least(column: impl Into<String>, threshold: f64) -> Self {
        Self::AtLeast {
            column: column.into(),
            threshold,
        }
    }

    pub fn name_contains(needle: impl Into<String>) -> Self {
        Self::NameContains(needle.into())
    }

    pub fn matches<R: MetricRow>(&self, row: &R) -> bool {
        match self {
            Self::AtLeast { column, threshold } => {
                row.metric(column).is_some_and(|value| value >= *threshold)
            }
            Self::NameContains(needle) => row
                .name()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// Predicates combined with logical AND. An empty set keeps every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches<R: MetricRow>(&self, row: &R) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(row))
    }

    /// Every metric predicate must name one of `columns`.
    pub fn validate(&self, columns: &[String]) -> Result<(), ScoreError> {
        for predicate in &self.predicates {
            if let Predicate::AtLeast { column, .. } = predicate {
                if !columns.iter().any(|c| c == column) {
                    return Err(ScoreError::missing_column(column.as_str()));
                }
            }
        }
        Ok(())
    }
}

/// Informational signal passed along with a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filtered<T> {
    pub table: T,
    pub notice: Option<Notice>,
}

impl<T> Filtered<T> {
    fn new(table: T, len: usize) -> Self {
        let notice = if len == 0 {
            warn!("filter matched no channels");
            Some(Notice::EmptyResult)
        } else {
            None
        };
        Self { table, notice }
    }

    pub fn is_empty_result(&self) -> bool {
        self.notice == Some(Notice::EmptyResult)
    }
}

/// Rows matching `predicate`, in their original order.
pub fn filter_rows<R, F>(rows: &[R], predicate: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R) -> bool,
{
    rows.iter().filter(|&row| predicate(row)).cloned().collect()
}

pub fn filter_channels_by<F>(table: &ChannelTable, predicate: F) -> Filtered<ChannelTable>
where
    F: Fn(&ChannelRecord) -> bool,
{
    let records = filter_rows(table.records(), predicate);
    let len = records.len();
    Filtered::new(table.with_records(records), len)
}

pub fn filter_channels(
    table: &ChannelTable,
    filters: &FilterSet,
) -> Result<Filtered<ChannelTable>, ScoreError> {
    filters.validate(table.columns())?;
    Ok(filter_channels_by(table, |row| filters.matches(row)))
}

/// Filters a ranked table; ranks and scores are kept as computed.
pub fn filter_ranked(
    table: &RankedTable,
    filters: &FilterSet,
) -> Result<Filtered<RankedTable>, ScoreError> {
    filters.validate(&table.columns)?;
    let records = filter_rows(&table.records, |row| filters.matches(row));
    let len = records.len();
    Ok(Filtered::new(table.with_records(records), len))
}
