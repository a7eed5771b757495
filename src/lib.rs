//! Trade dependency analytics.
//!
//! Turns a wide table with two header rows (period, metric) into one record
//! per (country, period), derives comparison metrics, and answers ranking
//! and trend queries over the immutable result.

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod menu;
pub mod query;
pub mod report;
pub mod state;

pub use cache::{DatasetCache, MemoryCache, NoCache, SourceKey};
pub use config::{AnalysisConfig, DuplicatePolicy, MetricLabels};
pub use data::model::{ColumnHeader, Dataset, EntityPeriodRecord, Field, ObservationRecord, Value};
pub use data::pipeline::{build_dataset, dataset_from_bytes, load_dataset};
pub use data::rank::{ComparisonRecord, Direction, RankedDelta, RankedRow};
pub use error::{TradeError, TradeResult};
pub use query::{execute, Query, QueryResult};
