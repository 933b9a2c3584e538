use std::fmt::Write;
use std::io;

use chrono::NaiveDateTime;

use crate::columns::{ColumnMapping, Criterion};
use crate::error::ScoreError;
use crate::models::{normalized_column, RankedTable};
use crate::weights::CriterionWeights;

pub const FULL_EXPORT_PREFIX: &str = "youtuber_saw_analysis";

pub fn top_export_prefix(n: usize) -> String {
    format!("top_{n}_youtuber")
}

/// Writes the ranked table as CSV: name, one normalized column per criterion,
/// `score`, `rank`. Numbers are written with four decimals.
pub fn write_export<W: io::Write>(table: &RankedTable, writer: W) -> Result<(), ScoreError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![table.name_column.clone()];
    header.extend(table.criteria.iter().map(|c| normalized_column(c)));
    header.push("score".to_string());
    header.push("rank".to_string());
    writer.write_record(&header)?;

    for record in &table.records {
        let mut row = vec![record.name.clone()];
        row.extend(record.normalized.iter().map(|v| format!("{v:.4}")));
        row.push(format!("{:.4}", record.score));
        row.push(record.rank.to_string());
        writer.write_record(&row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_csv(table: &RankedTable) -> Result<String, ScoreError> {
    let mut buffer = Vec::new();
    write_export(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| ScoreError::invalid_input(err.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub name: String,
    pub score: f64,
    pub rank: usize,
}

/// Reads back the name, score and rank of an export.
pub fn read_export<R: io::Read>(source: R) -> Result<Vec<ExportRow>, ScoreError> {
    let mut reader = csv::Reader::from_reader(source);
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let len = record.len();
        if len < 3 {
            return Err(ScoreError::invalid_input(format!(
                "export row has {len} fields, expected at least 3"
            )));
        }

        let score = record[len - 2]
            .parse::<f64>()
            .map_err(|err| ScoreError::invalid_input(format!("bad score: {err}")))?;
        let rank = record[len - 1]
            .parse::<usize>()
            .map_err(|err| ScoreError::invalid_input(format!("bad rank: {err}")))?;
        rows.push(ExportRow {
            name: record[0].to_string(),
            score,
            rank,
        });
    }

    Ok(rows)
}

pub fn export_file_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{prefix}_{}.csv", timestamp.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub channels: usize,
    pub mean_score: Option<f64>,
    pub mean_subscribers: Option<f64>,
    pub mean_engagement: Option<f64>,
}

pub fn overview(table: &RankedTable, mapping: &ColumnMapping) -> Overview {
    let scores: Vec<f64> = table.records.iter().map(|r| r.score).collect();
    let column_mean = |criterion: Criterion| {
        let column = mapping.column(criterion);
        if !table.columns.iter().any(|c| c == column) {
            return None;
        }
        let values: Vec<f64> = table
            .records
            .iter()
            .filter_map(|r| r.metrics.get(column).copied())
            .collect();
        mean(&values)
    };

    Overview {
        channels: table.len(),
        mean_score: mean(&scores),
        mean_subscribers: column_mean(Criterion::SubscriberCount),
        mean_engagement: column_mean(Criterion::EngagementRate),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins spanning the observed score range.
pub fn score_histogram(table: &RankedTable, bins: usize) -> Vec<HistogramBin> {
    if table.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = table
        .records
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.score), hi.max(r.score))
        });

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: table.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for record in &table.records {
        let index = (((record.score - min) / width).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    histogram
}

/// The landing view: criteria, their default weights and a sample breakdown.
pub fn build_methodology() -> String {
    const SAMPLE_NORMALIZED: [f64; 6] = [0.85, 0.78, 0.92, 0.88, 0.75, 0.95];

    let mut output = String::new();
    let _ = writeln!(output, "# Indonesian YouTuber Endorsement Potential");
    let _ = writeln!(
        output,
        "Channels are ranked with Simple Additive Weighting (SAW)."
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Criteria");
    for (position, criterion) in Criterion::ALL.into_iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} (default weight {:.2})",
            position + 1,
            criterion.label(),
            criterion.default_weight()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Steps");
    let _ = writeln!(output, "1. Normalize each criterion with min-max scaling");
    let _ = writeln!(output, "2. Weight each criterion by its importance");
    let _ = writeln!(output, "3. Sum the weighted values into the final score");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sample Calculation");
    let mut total = 0.0;
    for (criterion, normalized) in Criterion::ALL.into_iter().zip(SAMPLE_NORMALIZED) {
        let weighted = criterion.default_weight() * normalized;
        total += weighted;
        let _ = writeln!(
            output,
            "- {}: {:.2} x {:.2} = {:.4}",
            criterion.label(),
            criterion.default_weight(),
            normalized,
            weighted
        );
    }
    let _ = writeln!(output, "- Score: {total:.4}");

    output
}

pub fn build_report(
    table: &RankedTable,
    weights: &CriterionWeights,
    mapping: &ColumnMapping,
    top: usize,
    generated: NaiveDateTime,
) -> String {
    let summary = overview(table, mapping);
    let mut output = String::new();

    let _ = writeln!(output, "# Endorsement Potential Report");
    let _ = writeln!(output, "Generated {}", generated.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Channels: {}", summary.channels);
    if let Some(score) = summary.mean_score {
        let _ = writeln!(output, "- Average score: {score:.3}");
    }
    if let Some(subscribers) = summary.mean_subscribers {
        let _ = writeln!(output, "- Average subscribers: {}", group_thousands(subscribers));
    }
    if let Some(engagement) = summary.mean_engagement {
        let _ = writeln!(output, "- Average engagement: {engagement:.2}%");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weights");
    match weights.normalized() {
        Ok(normalized) => {
            for (column, weight) in normalized {
                let _ = writeln!(output, "- {column}: {weight:.3}");
            }
        }
        Err(_) => {
            let _ = writeln!(output, "No usable weights.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top {top} Channels");
    if table.is_empty() {
        let _ = writeln!(output, "No channels match the selected filters.");
    } else {
        let subscribers = mapping.column(Criterion::SubscriberCount);
        let engagement = mapping.column(Criterion::EngagementRate);
        let views = mapping.column(Criterion::AvgViews);

        let _ = writeln!(
            output,
            "| Rank | Channel | Score | Subscribers | Engagement Rate (%) | Avg Views |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for record in table.records.iter().take(top) {
            let metric = |column: &str, decimals: bool| {
                record.metrics.get(column).map_or_else(
                    || "-".to_string(),
                    |&v| {
                        if decimals {
                            format!("{v:.2}")
                        } else {
                            group_thousands(v)
                        }
                    },
                )
            };
            let _ = writeln!(
                output,
                "| {} | {} | {:.3} | {} | {} | {} |",
                record.rank,
                record.name,
                record.score,
                metric(subscribers, false),
                metric(engagement, true),
                metric(views, false)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Distribution");
    let histogram = score_histogram(table, 20);
    if histogram.is_empty() {
        let _ = writeln!(output, "No scores to summarize.");
    } else {
        for bin in histogram.iter().filter(|b| b.count > 0) {
            let _ = writeln!(
                output,
                "- {:.3} to {:.3}: {} channels",
                bin.lower, bin.upper, bin.count
            );
        }
    }

    output
}

/// Rounds to a whole number and inserts thousands separators.
pub fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && grouped != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
