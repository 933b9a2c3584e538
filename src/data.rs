use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::columns::ColumnMapping;
use crate::error::ScoreError;
use crate::models::{ChannelRecord, ChannelTable};

/// Loads the channel table from a CSV file with a header row.
pub fn load_channels(path: &Path, mapping: &ColumnMapping) -> Result<ChannelTable, ScoreError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ScoreError::MissingInput {
            path: path.to_path_buf(),
            source,
        })?;

    let table = parse(reader, mapping)?;
    info!(
        path = %path.display(),
        channels = table.len(),
        columns = table.columns().len(),
        "loaded channel data"
    );
    Ok(table)
}

/// Reads a channel table from any CSV source.
pub fn read_channels<R: Read>(source: R, mapping: &ColumnMapping) -> Result<ChannelTable, ScoreError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    parse(reader, mapping)
}

fn parse<R: Read>(
    mut reader: csv::Reader<R>,
    mapping: &ColumnMapping,
) -> Result<ChannelTable, ScoreError> {
    let headers = reader
        .headers()
        .map_err(|err| ScoreError::invalid_input(format!("unreadable header: {err}")))?
        .clone();

    let name_index = headers
        .iter()
        .position(|h| h == mapping.name_column())
        .ok_or_else(|| {
            ScoreError::invalid_input(format!(
                "name column `{}` not found in header",
                mapping.name_column()
            ))
        })?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = result
            .map_err(|err| ScoreError::invalid_input(format!("row {}: {err}", line + 1)))?;
        rows.push(row);
    }

    // A column is numeric only when every row parses as a finite number.
    let mut numeric = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if index == name_index {
            continue;
        }
        let parses = rows
            .iter()
            .all(|row| {
                row.get(index)
                    .is_some_and(|v| v.parse::<f64>().is_ok_and(f64::is_finite))
            });
        if parses {
            numeric.push((index, header.to_string()));
        } else {
            debug!(column = header, "dropping non-numeric column");
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = row.get(name_index).unwrap_or_default();
        if name.is_empty() {
            return Err(ScoreError::invalid_input("channel with an empty name"));
        }

        let mut record = ChannelRecord::new(name);
        for (index, column) in &numeric {
            let value = row
                .get(*index)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or_default();
            record = record.with_metric(column.clone(), value);
        }
        records.push(record);
    }

    let columns = numeric.into_iter().map(|(_, column)| column).collect();
    ChannelTable::new(mapping.name_column(), columns, records)
}
