use crate::error::{TradeError, TradeResult};

use super::loader::RawTable;
use super::model::ColumnHeader;

/// Decode the two header rows into one (period, metric) key per data column.
///
/// Column 0 is the entity column and gets no header. Every data row must
/// have the same width as the header rows; the first row that does not
/// fails the whole decode with its raw-table index.
///
/// With `fill_blank_periods`, an empty period cell inherits the period to
/// its left (spreadsheets export merged cells that way). Otherwise an empty
/// period or metric label is a malformed header.
pub fn decode_headers(raw: &RawTable, fill_blank_periods: bool) -> TradeResult<Vec<ColumnHeader>> {
    let [period_row, metric_row, data_rows @ ..] = raw.rows.as_slice() else {
        return Err(TradeError::MalformedHeader {
            reason: format!("expected at least 2 header rows, found {}", raw.len()),
        });
    };

    if period_row.len() != metric_row.len() {
        return Err(TradeError::MalformedHeader {
            reason: format!(
                "period row has {} columns but metric row has {}",
                period_row.len(),
                metric_row.len()
            ),
        });
    }
    let width = period_row.len();
    if width < 2 {
        return Err(TradeError::MalformedHeader {
            reason: "no data columns after the entity column".to_string(),
        });
    }

    for (offset, row) in data_rows.iter().enumerate() {
        if row.len() != width {
            return Err(TradeError::ColumnCountMismatch {
                row: offset + 2,
                expected: width,
                actual: row.len(),
            });
        }
    }

    let mut headers = Vec::with_capacity(width - 1);
    let mut last_period: Option<&str> = None;
    for column in 1..width {
        let mut period = period_row[column].trim();
        if period.is_empty() && fill_blank_periods {
            period = last_period.unwrap_or("");
        }
        let metric = metric_row[column].trim();

        if period.is_empty() {
            return Err(TradeError::MalformedHeader {
                reason: format!("empty period label in column {column}"),
            });
        }
        if metric.is_empty() {
            return Err(TradeError::MalformedHeader {
                reason: format!("empty metric label in column {column}"),
            });
        }

        last_period = Some(period);
        headers.push(ColumnHeader {
            column,
            period: period.to_string(),
            metric: metric.to_string(),
        });
    }

    log::debug!("decoded {} column headers", headers.len());
    Ok(headers)
}
