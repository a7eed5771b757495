use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::data::model::Dataset;
use crate::error::{TradeError, TradeResult};
use crate::menu::{Analysis, Selection};
use crate::query::{execute, QueryResult};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the presentation layer holds between requests, independent of
/// rendering.
pub struct AppState {
    /// Shared, immutable dataset.
    pub dataset: Arc<Dataset>,

    /// Periods offered for selection, ascending.
    pub periods: Vec<String>,

    /// Entities offered for selection, ascending.
    pub entities: Vec<String>,

    /// Current parameters for the fixed analyses.
    pub selection: Selection,
}

impl AppState {
    /// Ingest a loaded dataset and pick default selections: the earliest
    /// period, and the configured default entity if present (otherwise the
    /// first entity in sorted order).
    pub fn new(dataset: Arc<Dataset>, config: &AnalysisConfig) -> Self {
        let periods = dataset.sorted_periods();
        let entities = dataset.sorted_entities();

        let period = periods.first().cloned().unwrap_or_default();
        let entity = if dataset.has_entity(&config.default_entity) {
            config.default_entity.clone()
        } else {
            entities.first().cloned().unwrap_or_default()
        };

        Self {
            dataset,
            periods,
            entities,
            selection: Selection {
                period,
                entity,
                compare_from: config.compare_from.clone(),
                compare_to: config.compare_to.clone(),
                n: config.top_n,
            },
        }
    }

    /// Select a period; it must exist in the dataset.
    pub fn select_period(&mut self, period: &str) -> TradeResult<()> {
        if !self.dataset.has_period(period) {
            return Err(TradeError::InsufficientPeriods {
                missing: vec![period.to_string()],
            });
        }
        self.selection.period = period.to_string();
        Ok(())
    }

    /// Select an entity; it must exist in the dataset.
    pub fn select_entity(&mut self, entity: &str) -> TradeResult<()> {
        let entity = entity.trim();
        if !self.dataset.has_entity(entity) {
            return Err(TradeError::UnknownEntity {
                name: entity.to_string(),
            });
        }
        self.selection.entity = entity.to_string();
        Ok(())
    }

    pub fn set_comparison(&mut self, from: &str, to: &str) {
        self.selection.compare_from = from.to_string();
        self.selection.compare_to = to.to_string();
    }

    pub fn set_top_n(&mut self, n: usize) {
        self.selection.n = n;
    }

    /// Run one of the fixed analyses with the current selection.
    pub fn run(&self, analysis: Analysis) -> TradeResult<QueryResult> {
        let query = analysis.to_query(&self.selection);
        execute(&self.dataset, &query)
    }
}
