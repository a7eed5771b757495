use std::collections::{BTreeMap, HashMap};

use crate::config::DuplicatePolicy;
use crate::error::{TradeError, TradeResult};

use super::loader::RawTable;
use super::model::{ColumnHeader, Dataset, EntityPeriodRecord, ObservationRecord, Value};

/// Output of the reshaper before metric derivation.
#[derive(Debug, Clone)]
pub struct Reshaped {
    pub records: Vec<EntityPeriodRecord>,
    /// Headers repeating an earlier (period, metric) pair.
    pub duplicate_columns: Vec<ColumnHeader>,
}

/// Wide → long → one record per (entity, period).
///
/// `headers` must come from [`decode_headers`](super::header::decode_headers)
/// on the same table, so every data row is known to have the right width.
pub fn reshape(
    raw: &RawTable,
    headers: &[ColumnHeader],
    policy: DuplicatePolicy,
) -> TradeResult<Reshaped> {
    let duplicates = find_duplicate_columns(headers);
    if let Some((first, dup)) = duplicates.first() {
        match policy {
            DuplicatePolicy::Reject => {
                return Err(TradeError::DuplicateColumnKey {
                    period: dup.period.clone(),
                    metric: dup.metric.clone(),
                    first: *first,
                    second: dup.column,
                });
            }
            DuplicatePolicy::LastWins => {
                for (first, dup) in &duplicates {
                    log::warn!(
                        "column {} repeats ({}, {}) from column {first}; later values win",
                        dup.column,
                        dup.period,
                        dup.metric
                    );
                }
            }
        }
    }

    let observations = flatten(raw, headers);
    let metric_names = metric_names(headers);
    let records = group(observations, &metric_names);
    log::debug!(
        "reshaped {} data rows into {} entity-period records",
        raw.len().saturating_sub(2),
        records.len()
    );

    Ok(Reshaped {
        records,
        duplicate_columns: duplicates.into_iter().map(|(_, h)| h).collect(),
    })
}

/// Every header whose (period, metric) pair already appeared, paired with
/// the column index of the first occurrence.
pub fn find_duplicate_columns(headers: &[ColumnHeader]) -> Vec<(usize, ColumnHeader)> {
    let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for h in headers {
        match first_seen.get(&(h.period.as_str(), h.metric.as_str())) {
            Some(&first) => duplicates.push((first, h.clone())),
            None => {
                first_seen.insert((h.period.as_str(), h.metric.as_str()), h.column);
            }
        }
    }
    duplicates
}

/// One observation per (data row × data column), row-major.
///
/// Entity names are trimmed; rows whose entity is blank are skipped.
pub fn flatten(raw: &RawTable, headers: &[ColumnHeader]) -> Vec<ObservationRecord> {
    let mut observations = Vec::with_capacity(raw.len().saturating_sub(2) * headers.len());
    for (offset, row) in raw.rows.iter().skip(2).enumerate() {
        let entity = row.first().map(|s| s.trim()).unwrap_or("");
        if entity.is_empty() {
            log::warn!("row {} has no entity name, skipping", offset + 2);
            continue;
        }
        for h in headers {
            let cell = row.get(h.column).map(String::as_str).unwrap_or("");
            observations.push(ObservationRecord {
                entity: entity.to_string(),
                period: h.period.clone(),
                metric: h.metric.clone(),
                value: Value::parse(cell),
            });
        }
    }
    observations
}

/// Group observations into one record per (entity, period).
///
/// Every record carries all `metric_names`, missing by default. A present
/// value overwrites an earlier one for the same key; a missing value never
/// overwrites a present one.
pub fn group(observations: Vec<ObservationRecord>, metric_names: &[String]) -> Vec<EntityPeriodRecord> {
    let mut records: Vec<EntityPeriodRecord> = Vec::new();
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for obs in observations {
        let key = (obs.entity, obs.period);
        let idx = match slots.get(&key) {
            Some(&idx) => idx,
            None => {
                records.push(EntityPeriodRecord {
                    entity: key.0.clone(),
                    period: key.1.clone(),
                    metrics: metric_names
                        .iter()
                        .map(|m| (m.clone(), Value::Missing))
                        .collect(),
                    derived: BTreeMap::new(),
                });
                slots.insert(key.clone(), records.len() - 1);
                records.len() - 1
            }
        };

        if obs.value.is_missing() {
            continue;
        }
        let slot = records[idx].metrics.entry(obs.metric).or_default();
        if let (Value::Number(old), Value::Number(new)) = (*slot, obs.value) {
            if old != new {
                log::warn!(
                    "{} / {}: value {old} replaced by {new}",
                    key.0,
                    key.1
                );
            }
        }
        *slot = obs.value;
    }
    records
}

/// Distinct metric names in header order.
pub fn metric_names(headers: &[ColumnHeader]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for h in headers {
        if !names.contains(&h.metric) {
            names.push(h.metric.clone());
        }
    }
    names
}

/// Inverse pivot: rebuild the wide table from a dataset.
///
/// Columns follow the dataset's headers, rows its entity order. Missing
/// values are written as `-`.
pub fn to_wide(dataset: &Dataset) -> RawTable {
    let mut period_row = Vec::with_capacity(dataset.headers.len() + 1);
    let mut metric_row = Vec::with_capacity(dataset.headers.len() + 1);
    period_row.push(dataset.entity_column.clone());
    metric_row.push(String::new());
    for h in &dataset.headers {
        period_row.push(h.period.clone());
        metric_row.push(h.metric.clone());
    }

    let mut rows = vec![period_row, metric_row];
    for entity in &dataset.entities {
        let mut row = Vec::with_capacity(dataset.headers.len() + 1);
        row.push(entity.clone());
        for h in &dataset.headers {
            let value = dataset
                .get(entity, &h.period)
                .map(|rec| rec.metric(&h.metric))
                .unwrap_or_default();
            row.push(value.to_string());
        }
        rows.push(row);
    }
    RawTable::new(rows)
}
