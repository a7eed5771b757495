use std::path::Path;
use std::sync::Arc;

use crate::cache::{DatasetCache, SourceKey};
use crate::config::AnalysisConfig;
use crate::error::TradeResult;

use super::derive::derive_metrics;
use super::header::decode_headers;
use super::loader::{parse_bytes, read_source, RawTable};
use super::model::Dataset;
use super::reshape::reshape;

/// Decode, reshape and derive. Pure: the same table and config always give
/// the same dataset, and any error leaves nothing behind.
pub fn build_dataset(raw: &RawTable, config: &AnalysisConfig) -> TradeResult<Dataset> {
    let headers = decode_headers(raw, config.fill_blank_periods)?;
    let reshaped = reshape(raw, &headers, config.duplicate_columns)?;
    let records = derive_metrics(reshaped.records, &config.labels);

    let entity_column = raw
        .rows
        .first()
        .and_then(|row| row.first())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let dataset = Dataset::from_records(
        records,
        headers,
        reshaped.duplicate_columns,
        entity_column,
        config.labels.clone(),
    );

    for label in [&config.labels.exports, &config.labels.imports] {
        if !dataset.metric_names.contains(label) {
            log::warn!("metric label '{label}' not found in headers; derived metrics will be missing");
        }
    }
    Ok(dataset)
}

/// Parse raw bytes and build the dataset.
pub fn dataset_from_bytes(bytes: &[u8], config: &AnalysisConfig) -> TradeResult<Dataset> {
    let raw = parse_bytes(bytes, config.delimiter_byte()?)?;
    build_dataset(&raw, config)
}

/// Load a file through `cache`. The file is always read so that a changed
/// file gets a new key; parsing and reshaping only happen on a miss.
pub fn load_dataset(
    path: &Path,
    config: &AnalysisConfig,
    cache: &dyn DatasetCache,
) -> TradeResult<Arc<Dataset>> {
    let bytes = read_source(path)?;
    let key = SourceKey::new(path, &bytes, config);
    if let Some(hit) = cache.get(&key) {
        log::debug!("dataset cache hit for {}", path.display());
        return Ok(hit);
    }

    let dataset = Arc::new(dataset_from_bytes(&bytes, config)?);
    log::info!(
        "loaded {}: {} entities, {} periods, {} metrics, {} records",
        path.display(),
        dataset.entities.len(),
        dataset.periods.len(),
        dataset.metric_names.len(),
        dataset.len()
    );
    cache.put(key, Arc::clone(&dataset));
    Ok(dataset)
}
