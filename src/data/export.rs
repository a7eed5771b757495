use std::io::Write;
use std::path::Path;

use crate::error::{TradeError, TradeResult};

use super::derive::DerivedMetric;
use super::loader::RawTable;
use super::model::{Dataset, Value};

/// Write the dataset in long form: one row per (entity, period) with base
/// metrics then derived metrics as columns. Missing values are empty cells.
pub fn write_long_csv<W: Write>(dataset: &Dataset, writer: W) -> TradeResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let entity_label = if dataset.entity_column.is_empty() {
        "entity"
    } else {
        dataset.entity_column.as_str()
    };
    let mut header = vec![entity_label, "period"];
    header.extend(dataset.metric_names.iter().map(String::as_str));
    header.extend(DerivedMetric::ALL.iter().map(|d| d.name()));
    wtr.write_record(&header)?;

    for rec in &dataset.records {
        let mut row = vec![rec.entity.clone(), rec.period.clone()];
        row.extend(dataset.metric_names.iter().map(|m| cell(rec.metric(m))));
        row.extend(DerivedMetric::ALL.iter().map(|d| cell(rec.derived(*d))));
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a raw table (for instance the output of `to_wide`) as CSV.
pub fn write_raw<W: Write>(table: &RawTable, writer: W, delimiter: u8) -> TradeResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .delimiter(delimiter)
        .from_writer(writer);
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_raw_csv(table: &RawTable, path: &Path, delimiter: u8) -> TradeResult<()> {
    let file = std::fs::File::create(path).map_err(|source| TradeError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    write_raw(table, file, delimiter)
}

fn cell(value: Value) -> String {
    match value {
        Value::Number(v) => v.to_string(),
        Value::Missing => String::new(),
    }
}
