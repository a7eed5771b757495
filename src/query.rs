use serde::{Deserialize, Serialize};

use crate::data::model::{Dataset, EntityPeriodRecord};
use crate::data::rank::{Direction, RankedDelta, RankedRow};
use crate::error::TradeResult;

fn default_n() -> usize {
    10
}

/// A request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Query {
    RankSingle {
        period: String,
        field: String,
        #[serde(default = "default_n")]
        n: usize,
        #[serde(default)]
        direction: Direction,
    },
    CompareAcrossPeriods {
        period_a: String,
        period_b: String,
        field: String,
        #[serde(default = "default_n")]
        n: usize,
        #[serde(default)]
        direction: Direction,
    },
    EntityHistory {
        entity: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    Ranking {
        period: String,
        field: String,
        direction: Direction,
        rows: Vec<RankedRow>,
    },
    Changes {
        period_a: String,
        period_b: String,
        field: String,
        direction: Direction,
        rows: Vec<RankedDelta>,
    },
    History {
        entity: String,
        records: Vec<EntityPeriodRecord>,
    },
}

impl QueryResult {
    /// Number of result rows.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Ranking { rows, .. } => rows.len(),
            QueryResult::Changes { rows, .. } => rows.len(),
            QueryResult::History { records, .. } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run one query against a loaded dataset.
pub fn execute(dataset: &Dataset, query: &Query) -> TradeResult<QueryResult> {
    log::debug!("executing {query:?}");
    match query {
        Query::RankSingle {
            period,
            field,
            n,
            direction,
        } => {
            let resolved = dataset.resolve_field(field)?;
            let rows = dataset.rank(period, field, *n, *direction)?;
            Ok(QueryResult::Ranking {
                period: period.clone(),
                field: resolved.name().to_string(),
                direction: *direction,
                rows,
            })
        }
        Query::CompareAcrossPeriods {
            period_a,
            period_b,
            field,
            n,
            direction,
        } => {
            let resolved = dataset.resolve_field(field)?;
            let rows = dataset.rank_changes(period_a, period_b, field, *n, *direction)?;
            Ok(QueryResult::Changes {
                period_a: period_a.clone(),
                period_b: period_b.clone(),
                field: resolved.name().to_string(),
                direction: *direction,
                rows,
            })
        }
        Query::EntityHistory { entity } => Ok(QueryResult::History {
            entity: entity.trim().to_string(),
            records: dataset.history(entity)?,
        }),
    }
}
