//! Simple Additive Weighting over a channel table.
//!
//! Every criterion is treated as a benefit criterion: a higher raw value is
//! always better. Normalization is min-max over the rows currently in the
//! table, so filtering before scoring changes the bounds.

use tracing::debug;

use crate::error::ScoreError;
use crate::models::{ChannelTable, NormalizedRecord, NormalizedTable, RankedTable, ScoredRecord};
use crate::weights::CriterionWeights;

/// Adds a min-max normalized value per criterion. A criterion without spread
/// (max equal to min, including a single row) normalizes to `1.0`. Criterion
/// values must be non-negative; other columns are not checked.
pub fn normalize(table: &ChannelTable, criteria: &[String]) -> Result<NormalizedTable, ScoreError> {
    if let Some(missing) = criteria.iter().find(|c| !table.has_column(c)) {
        return Err(ScoreError::missing_column(missing.as_str()));
    }

    for record in table.records() {
        for criterion in criteria {
            if let Some(value) = record.metric(criterion).filter(|v| *v < 0.0) {
                return Err(ScoreError::invalid_input(format!(
                    "channel `{}` has negative value {value} for criterion `{criterion}`",
                    record.name
                )));
            }
        }
    }

    let bounds: Vec<(f64, f64)> = criteria
        .iter()
        .map(|criterion| column_bounds(table, criterion))
        .collect();

    let records = table
        .records()
        .iter()
        .map(|record| NormalizedRecord {
            record: record.clone(),
            normalized: criteria
                .iter()
                .zip(&bounds)
                .map(|(criterion, &(min, max))| {
                    min_max(record.metric(criterion).unwrap_or(min), min, max)
                })
                .collect(),
        })
        .collect();

    debug!(rows = table.len(), criteria = criteria.len(), "normalized channel table");

    Ok(NormalizedTable {
        name_column: table.name_column().to_string(),
        columns: table.columns().to_vec(),
        criteria: criteria.to_vec(),
        records,
    })
}

/// Normalizes the weighted criteria of `table`, then scores and ranks it.
pub fn score(table: &ChannelTable, weights: &CriterionWeights) -> Result<RankedTable, ScoreError> {
    let criteria: Vec<String> = weights.columns().map(String::from).collect();
    let normalized = normalize(table, &criteria)?;
    score_normalized(&normalized, weights)
}

/// Weighted sum over an already normalized table, sorted by descending score.
/// Ties keep their input order; ranks start at 1.
pub fn score_normalized(
    table: &NormalizedTable,
    weights: &CriterionWeights,
) -> Result<RankedTable, ScoreError> {
    let weights = weights.normalized()?;
    let mut aligned = Vec::with_capacity(weights.len());
    for (criterion, weight) in weights {
        let index = table
            .criterion_index(&criterion)
            .ok_or_else(|| ScoreError::missing_column(criterion))?;
        aligned.push((index, weight));
    }

    let mut records: Vec<ScoredRecord> = table
        .records
        .iter()
        .map(|row| {
            let score: f64 = aligned
                .iter()
                .map(|&(index, weight)| weight * row.normalized[index])
                .sum();
            ScoredRecord {
                name: row.record.name.clone(),
                metrics: row.record.metrics.clone(),
                normalized: row.normalized.clone(),
                score: score.clamp(0.0, 1.0),
                rank: 0,
            }
        })
        .collect();

    // `sort_by` is stable.
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (position, record) in records.iter_mut().enumerate() {
        record.rank = position + 1;
    }

    debug!(rows = records.len(), "ranked channels");

    Ok(RankedTable {
        name_column: table.name_column.clone(),
        columns: table.columns.clone(),
        criteria: table.criteria.clone(),
        records,
    })
}

fn column_bounds(table: &ChannelTable, column: &str) -> (f64, f64) {
    table
        .records()
        .iter()
        .filter_map(|record| record.metric(column))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        })
}

fn min_max(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        1.0
    } else {
        (value - min) / (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelRecord;
    use proptest::prelude::*;

    fn table(rows: &[(&str, f64, f64)]) -> ChannelTable {
        let records = rows
            .iter()
            .map(|&(name, views, likes)| {
                ChannelRecord::new(name)
                    .with_metric("views", views)
                    .with_metric("likes", likes)
            })
            .collect();
        ChannelTable::new(
            "name",
            vec!["views".to_string(), "likes".to_string()],
            records,
        )
        .unwrap()
    }

    fn criteria() -> Vec<String> {
        vec!["views".to_string(), "likes".to_string()]
    }

    fn weights(views: f64, likes: f64) -> CriterionWeights {
        CriterionWeights::new()
            .with_weight("views", views)
            .with_weight("likes", likes)
    }

    #[test]
    fn two_channel_scenario_ranks_b_first() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);

        let normalized = normalize(&table, &criteria()).unwrap();
        assert_eq!(normalized.normalized_value(0, "views"), Some(0.0));
        assert_eq!(normalized.normalized_value(1, "views"), Some(1.0));
        assert_eq!(normalized.normalized_value(0, "likes"), Some(1.0));
        assert_eq!(normalized.normalized_value(1, "likes"), Some(0.0));

        let ranked = score(&table, &weights(0.7, 0.3)).unwrap();
        assert_eq!(ranked.records[0].name, "B");
        assert_eq!(ranked.records[0].rank, 1);
        assert!((ranked.records[0].score - 0.7).abs() < 1e-9);
        assert_eq!(ranked.records[1].name, "A");
        assert_eq!(ranked.records[1].rank, 2);
        assert!((ranked.records[1].score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn identical_column_normalizes_to_one() {
        let table = table(&[("A", 50.0, 1.0), ("B", 50.0, 9.0), ("C", 50.0, 4.0)]);
        let normalized = normalize(&table, &criteria()).unwrap();
        for row in 0..3 {
            assert_eq!(normalized.normalized_value(row, "views"), Some(1.0));
        }
        assert_eq!(normalized.normalized_value(0, "likes"), Some(0.0));
        assert_eq!(normalized.normalized_value(1, "likes"), Some(1.0));
    }

    #[test]
    fn single_row_normalizes_to_one() {
        let table = table(&[("Solo", 12.0, 3.0)]);
        let ranked = score(&table, &weights(0.5, 0.5)).unwrap();
        assert_eq!(ranked.records[0].normalized, vec![1.0, 1.0]);
        assert_eq!(ranked.records[0].score, 1.0);
    }

    #[test]
    fn empty_table_stays_empty() {
        let table = table(&[]);
        assert!(normalize(&table, &criteria()).unwrap().records.is_empty());
        assert!(score(&table, &weights(1.0, 1.0)).unwrap().is_empty());
    }

    #[test]
    fn original_columns_are_preserved() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);
        let normalized = normalize(&table, &criteria()).unwrap();
        assert_eq!(normalized.records[0].record, table.records()[0]);
        assert_eq!(normalized.columns, table.columns());
    }

    #[test]
    fn missing_criterion_is_a_configuration_error() {
        let table = table(&[("A", 1.0, 2.0)]);
        let err = score(&table, &weights(0.5, 0.5).with_weight("comments", 0.1)).unwrap_err();
        assert!(matches!(err, ScoreError::MissingColumn { column } if column == "comments"));
    }

    #[test]
    fn negative_criterion_is_rejected_but_other_columns_are_not() {
        let records = vec![
            ChannelRecord::new("A")
                .with_metric("views", 100.0)
                .with_metric("likes", -1.0)
                .with_metric("growth_pct", -2.5),
            ChannelRecord::new("B")
                .with_metric("views", 200.0)
                .with_metric("likes", 5.0)
                .with_metric("growth_pct", 4.0),
        ];
        let table = ChannelTable::new(
            "name",
            vec!["views".to_string(), "likes".to_string(), "growth_pct".to_string()],
            records,
        )
        .unwrap();

        let ranked = score(&table, &CriterionWeights::new().with_weight("views", 1.0)).unwrap();
        assert_eq!(ranked.records[0].name, "B");

        let err = score(&table, &weights(0.5, 0.5)).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput { .. }));
    }

    #[test]
    fn huge_weights_rank_like_their_small_counterparts() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);
        let huge = score(&table, &weights(1.5e308, 0.7e308)).unwrap();
        let small = score(&table, &weights(1.5, 0.7)).unwrap();

        assert_eq!(huge.records[0].name, "B");
        for (a, b) in huge.records.iter().zip(&small.records) {
            assert_eq!(a.name, b.name);
            assert!((a.score - b.score).abs() < 1e-9);
        }
        assert!((huge.records[0].score - 1.5 / 2.2).abs() < 1e-9);
    }

    #[test]
    fn weight_for_unnormalized_criterion_is_missing_column() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);
        let normalized = normalize(&table, &["views".to_string()]).unwrap();
        let err = score_normalized(&normalized, &weights(0.5, 0.5)).unwrap_err();
        assert!(matches!(err, ScoreError::MissingColumn { column } if column == "likes"));
    }

    #[test]
    fn zero_weights_are_rejected() {
        let table = table(&[("A", 1.0, 2.0)]);
        assert!(matches!(
            score(&table, &weights(0.0, 0.0)),
            Err(ScoreError::ZeroWeightSum)
        ));
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);
        let scaled = score(&table, &weights(7.0, 3.0)).unwrap();
        let unit = score(&table, &weights(0.7, 0.3)).unwrap();
        for (a, b) in scaled.records.iter().zip(&unit.records) {
            assert_eq!(a.name, b.name);
            assert!((a.score - b.score).abs() < 1e-12);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let table = table(&[("First", 10.0, 1.0), ("Second", 10.0, 1.0), ("Top", 20.0, 2.0)]);
        let ranked = score(&table, &weights(0.5, 0.5)).unwrap();
        let names: Vec<&str> = ranked.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Top", "First", "Second"]);
        assert_eq!(ranked.records[1].score, ranked.records[2].score);
        assert_eq!(ranked.records[2].rank, 3);
    }

    #[test]
    fn unweighted_criterion_is_not_normalized() {
        let table = table(&[("A", 100.0, 10.0), ("B", 200.0, 5.0)]);
        let ranked = score(&table, &CriterionWeights::new().with_weight("likes", 1.0)).unwrap();
        assert_eq!(ranked.criteria, vec!["likes".to_string()]);
        assert_eq!(ranked.records[0].name, "A");
    }

    fn arb_rows() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((0.0..1_000_000.0f64, 0.0..100.0f64), 1..40)
    }

    fn table_from(rows: &[(f64, f64)]) -> ChannelTable {
        let names: Vec<String> = (0..rows.len()).map(|i| format!("channel-{i}")).collect();
        let rows: Vec<(&str, f64, f64)> = names
            .iter()
            .zip(rows)
            .map(|(name, &(views, likes))| (name.as_str(), views, likes))
            .collect();
        table(&rows)
    }

    proptest! {
        #[test]
        fn normalized_values_span_unit_interval(rows in arb_rows()) {
            let table = table_from(&rows);
            let normalized = normalize(&table, &criteria()).unwrap();
            let views: Vec<f64> = rows.iter().map(|r| r.0).collect();
            let min = views.iter().copied().fold(f64::INFINITY, f64::min);
            let max = views.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            for (row, &raw) in views.iter().enumerate() {
                let value = normalized.normalized_value(row, "views").unwrap();
                if max == min {
                    prop_assert_eq!(value, 1.0);
                } else {
                    prop_assert!((0.0..=1.0).contains(&value));
                    if raw == min {
                        prop_assert_eq!(value, 0.0);
                    }
                    if raw == max {
                        prop_assert_eq!(value, 1.0);
                    }
                }
            }
        }

        #[test]
        fn scores_stay_in_unit_interval_and_descend(
            rows in arb_rows(),
            w_views in 0.0..10.0f64,
            w_likes in 0.001..10.0f64,
        ) {
            let ranked = score(&table_from(&rows), &weights(w_views, w_likes)).unwrap();
            for pair in ranked.records.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for (position, record) in ranked.records.iter().enumerate() {
                prop_assert!((0.0..=1.0).contains(&record.score));
                prop_assert_eq!(record.rank, position + 1);
            }
        }

        #[test]
        fn ranking_ignores_weight_scale(
            rows in arb_rows(),
            w_views in 0.0..10.0f64,
            w_likes in 0.001..10.0f64,
            factor in 0.001..1000.0f64,
        ) {
            let table = table_from(&rows);
            let base = score(&table, &weights(w_views, w_likes)).unwrap();
            let scaled = score(&table, &weights(w_views * factor, w_likes * factor)).unwrap();

            let scaled_rank = |name: &str| scaled.get(name).map(|r| r.rank);
            for (i, higher) in base.records.iter().enumerate() {
                let same = scaled.get(&higher.name).map(|r| r.score);
                prop_assert!(same.is_some_and(|s| (s - higher.score).abs() < 1e-9));
                // Rows separated by more than rounding noise keep their order.
                for lower in &base.records[i + 1..] {
                    if higher.score - lower.score > 1e-9 {
                        prop_assert!(
                            scaled_rank(higher.name.as_str()) < scaled_rank(lower.name.as_str())
                        );
                    }
                }
            }
        }

        #[test]
        fn rescoring_is_idempotent(rows in arb_rows(), w_views in 0.001..1.0f64) {
            let table = table_from(&rows);
            let first = score(&table, &weights(w_views, 1.0 - w_views)).unwrap();
            let second = score(&table, &weights(w_views, 1.0 - w_views)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
