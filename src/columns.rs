use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::ChannelTable;
use crate::weights::CriterionWeights;

/// The six benefit criteria the endorsement score is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    AvgViews,
    AvgLikes,
    AvgComments,
    EngagementRate,
    AvgWatchTime,
    SubscriberCount,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::AvgViews,
        Criterion::AvgLikes,
        Criterion::AvgComments,
        Criterion::EngagementRate,
        Criterion::AvgWatchTime,
        Criterion::SubscriberCount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Criterion::AvgViews => "avg_views",
            Criterion::AvgLikes => "avg_likes",
            Criterion::AvgComments => "avg_comments",
            Criterion::EngagementRate => "engagement_rate",
            Criterion::AvgWatchTime => "avg_watch_time",
            Criterion::SubscriberCount => "subscriber_count",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::AvgViews => "Average Views",
            Criterion::AvgLikes => "Average Likes",
            Criterion::AvgComments => "Average Comments",
            Criterion::EngagementRate => "Engagement Rate",
            Criterion::AvgWatchTime => "Average Watch Time",
            Criterion::SubscriberCount => "Subscriber Count",
        }
    }

    /// Default slider position on the dashboard.
    pub fn default_weight(self) -> f64 {
        match self {
            Criterion::AvgViews => 0.25,
            Criterion::AvgLikes => 0.20,
            Criterion::AvgComments => 0.15,
            Criterion::EngagementRate => 0.20,
            Criterion::AvgWatchTime => 0.10,
            Criterion::SubscriberCount => 0.10,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Criterion::ALL
            .into_iter()
            .find(|c| c.key() == normalized)
            .ok_or_else(|| format!("unknown criterion `{value}`"))
    }
}

/// Column naming conventions found in the published datasets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `avg_views`, `avg_watch_time_minutes`, ...
    #[default]
    Snake,
    /// `Average_Views`, `Channel_Name`, ...
    Title,
    /// `avg_view_count`, `avg_like_count`, ...
    Count,
}

/// Maps canonical criteria to the column names of a particular dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    name_column: String,
    columns: BTreeMap<Criterion, String>,
}

impl ColumnMapping {
    pub fn for_convention(convention: NamingConvention) -> Self {
        let (name_column, names): (&str, [&str; 6]) = match convention {
            NamingConvention::Snake => (
                "channel_name",
                [
                    "avg_views",
                    "avg_likes",
                    "avg_comments",
                    "engagement_rate",
                    "avg_watch_time_minutes",
                    "subscriber_count",
                ],
            ),
            NamingConvention::Title => (
                "Channel_Name",
                [
                    "Average_Views",
                    "Average_Likes",
                    "Average_Comments",
                    "Engagement_Rate",
                    "Average_Watch_Time",
                    "Subscriber_Count",
                ],
            ),
            NamingConvention::Count => (
                "channel_name",
                [
                    "avg_view_count",
                    "avg_like_count",
                    "avg_comment_count",
                    "engagement_rate",
                    "avg_watch_time",
                    "subscriber_count",
                ],
            ),
        };

        Self {
            name_column: name_column.to_string(),
            columns: Criterion::ALL
                .into_iter()
                .zip(names)
                .map(|(criterion, column)| (criterion, column.to_string()))
                .collect(),
        }
    }

    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = column.into();
        self
    }

    pub fn with_column(mut self, criterion: Criterion, column: impl Into<String>) -> Self {
        self.columns.insert(criterion, column.into());
        self
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    pub fn column(&self, criterion: Criterion) -> &str {
        self.columns
            .get(&criterion)
            .map_or_else(|| criterion.key(), String::as_str)
    }

    /// Column-keyed weights for the criteria present in `table`, in canonical
    /// criterion order. Criteria whose column is missing are skipped.
    pub fn weights_for(
        &self,
        table: &ChannelTable,
        weights: &BTreeMap<Criterion, f64>,
    ) -> CriterionWeights {
        let mut resolved = CriterionWeights::new();
        for criterion in Criterion::ALL {
            let Some(&weight) = weights.get(&criterion) else {
                continue;
            };
            let column = self.column(criterion);
            if table.has_column(column) {
                resolved.set(column, weight);
            } else {
                warn!(%criterion, column, "criterion column not in data, skipping");
            }
        }
        resolved
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::for_convention(NamingConvention::default())
    }
}

pub fn default_weights() -> BTreeMap<Criterion, f64> {
    Criterion::ALL
        .into_iter()
        .map(|criterion| (criterion, criterion.default_weight()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelRecord;
    use rstest::rstest;

    #[rstest]
    #[case(NamingConvention::Snake, "channel_name", "avg_views", "avg_watch_time_minutes")]
    #[case(NamingConvention::Title, "Channel_Name", "Average_Views", "Average_Watch_Time")]
    #[case(NamingConvention::Count, "channel_name", "avg_view_count", "avg_watch_time")]
    fn presets_name_their_columns(
        #[case] convention: NamingConvention,
        #[case] name: &str,
        #[case] views: &str,
        #[case] watch_time: &str,
    ) {
        let mapping = ColumnMapping::for_convention(convention);
        assert_eq!(mapping.name_column(), name);
        assert_eq!(mapping.column(Criterion::AvgViews), views);
        assert_eq!(mapping.column(Criterion::AvgWatchTime), watch_time);
    }

    #[test]
    fn default_weights_sum_to_one() {
        let total: f64 = default_weights().values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn criteria_parse_from_keys() {
        assert_eq!("engagement-rate".parse::<Criterion>(), Ok(Criterion::EngagementRate));
        assert_eq!(" AVG_VIEWS ".parse::<Criterion>(), Ok(Criterion::AvgViews));
        assert!("retention".parse::<Criterion>().is_err());
    }

    #[test]
    fn weights_skip_absent_columns() {
        let table = ChannelTable::new(
            "Channel_Name",
            vec!["Average_Views".to_string(), "Subscriber_Count".to_string()],
            vec![ChannelRecord::new("Ria Ricis")
                .with_metric("Average_Views", 1.0)
                .with_metric("Subscriber_Count", 2.0)],
        )
        .unwrap();
        let mapping = ColumnMapping::for_convention(NamingConvention::Title);
        let weights = mapping.weights_for(&table, &default_weights());

        let columns: Vec<&str> = weights.columns().collect();
        assert_eq!(columns, vec!["Average_Views", "Subscriber_Count"]);
        assert_eq!(weights.get("Average_Views"), Some(0.25));
    }

    #[test]
    fn overrides_replace_preset_columns() {
        let mapping = ColumnMapping::default()
            .with_name_column("channel")
            .with_column(Criterion::AvgViews, "views_30d");
        assert_eq!(mapping.name_column(), "channel");
        assert_eq!(mapping.column(Criterion::AvgViews), "views_30d");
        assert_eq!(mapping.column(Criterion::AvgLikes), "avg_likes");
    }
}
