use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TradeError, TradeResult};

/// Labels used in header row 1 for the two base metrics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricLabels {
    pub exports: String,
    pub imports: String,
}

impl Default for MetricLabels {
    fn default() -> Self {
        Self {
            exports: "수출".to_string(),
            imports: "수입".to_string(),
        }
    }
}

/// What to do when two data columns carry the same (period, metric) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later column overwrites earlier one; a warning is logged.
    #[default]
    LastWins,
    /// Fail the load with `DuplicateColumnKey`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub delimiter: char,
    pub labels: MetricLabels,
    pub top_n: usize,
    pub compare_from: String,
    pub compare_to: String,
    pub default_entity: String,
    pub duplicate_columns: DuplicatePolicy,
    /// Forward-fill empty cells in the period row (merged header cells).
    pub fill_blank_periods: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            labels: MetricLabels::default(),
            top_n: 10,
            compare_from: "2022".to_string(),
            compare_to: "2024".to_string(),
            default_entity: "대한민국".to_string(),
            duplicate_columns: DuplicatePolicy::LastWins,
            fill_blank_periods: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(text: &str) -> TradeResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> TradeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TradeError::FileUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> TradeResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                TradeError::InvalidParameter(format!(
                    "delimiter '{}' is not a single ASCII character",
                    self.delimiter
                ))
            })
    }

    fn validate(&self) -> TradeResult<()> {
        self.delimiter_byte()?;
        if self.labels.exports.trim().is_empty() || self.labels.imports.trim().is_empty() {
            return Err(TradeError::InvalidParameter(
                "metric labels must not be empty".to_string(),
            ));
        }
        if self.labels.exports == self.labels.imports {
            return Err(TradeError::InvalidParameter(
                "export and import labels must differ".to_string(),
            ));
        }
        Ok(())
    }
}
