use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::MetricLabels;
use crate::error::{TradeError, TradeResult};

use super::derive::DerivedMetric;

// ---------------------------------------------------------------------------
// Value – a single numeric cell
// ---------------------------------------------------------------------------

/// A numeric cell that may be absent.
///
/// Missing is distinct from zero. Arithmetic on a missing operand yields
/// missing, and missing values never take part in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    Number(f64),
    #[default]
    Missing,
}

impl Value {
    /// Parse a raw cell. Anything that is not a finite number (including the
    /// `-` placeholder, empty cells and `NaN`) becomes `Missing`.
    pub fn parse(token: &str) -> Self {
        match token.trim().parse::<f64>() {
            Ok(v) => Value::from(v),
            Err(_) => Value::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Combine two values, propagating `Missing`. A non-finite result is
    /// also `Missing`.
    pub fn zip_with(self, other: Value, f: impl FnOnce(f64, f64) -> f64) -> Value {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::from(f(a, b)),
            _ => Value::Missing,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            // Normalise -0.0 so it prints and serializes as 0.
            Value::Number(v + 0.0)
        } else {
            Value::Missing
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Missing, Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Missing => write!(f, "-"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(v) => serializer.serialize_f64(*v),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Header and record types
// ---------------------------------------------------------------------------

/// The (period, metric) key of one data column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnHeader {
    /// Index of the column in the raw table (always ≥ 1).
    pub column: usize,
    pub period: String,
    pub metric: String,
}

/// One cell of the wide table, flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub entity: String,
    pub period: String,
    pub metric: String,
    pub value: Value,
}

/// All metrics of one entity in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPeriodRecord {
    pub entity: String,
    pub period: String,
    /// Base metric name → value. Keys are exactly the dataset's metric names.
    pub metrics: BTreeMap<String, Value>,
    /// Derived metric name → value.
    pub derived: BTreeMap<String, Value>,
}

impl EntityPeriodRecord {
    pub fn metric(&self, name: &str) -> Value {
        self.metrics.get(name).copied().unwrap_or_default()
    }

    pub fn derived(&self, metric: DerivedMetric) -> Value {
        self.derived.get(metric.name()).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Field – something a ranking can sort by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Field {
    Metric(String),
    Derived(DerivedMetric),
}

impl Field {
    pub fn value(&self, record: &EntityPeriodRecord) -> Value {
        match self {
            Field::Metric(name) => record.metric(name),
            Field::Derived(d) => record.derived(*d),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Metric(name) => name,
            Field::Derived(d) => d.name(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded snapshot
// ---------------------------------------------------------------------------

/// The reshaped and derived dataset. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// One record per (entity, period), in table order: entities by first
    /// appearance, periods by header order.
    pub records: Vec<EntityPeriodRecord>,
    /// Decoded headers, one per data column.
    pub headers: Vec<ColumnHeader>,
    /// Entities in order of first appearance.
    pub entities: Vec<String>,
    /// Periods in header order.
    pub periods: Vec<String>,
    /// Base metric names in header order.
    pub metric_names: Vec<String>,
    /// Headers that repeated an earlier (period, metric) pair.
    pub duplicate_columns: Vec<ColumnHeader>,
    /// Label of the entity column (cell 0 of the period row).
    pub entity_column: String,
    pub labels: MetricLabels,
    #[serde(skip)]
    index: HashMap<(String, String), usize>,
}

impl Dataset {
    /// Build lookup indices from the reshaped records.
    pub fn from_records(
        records: Vec<EntityPeriodRecord>,
        headers: Vec<ColumnHeader>,
        duplicate_columns: Vec<ColumnHeader>,
        entity_column: String,
        labels: MetricLabels,
    ) -> Self {
        let mut entities = Vec::new();
        let mut seen_entities = BTreeSet::new();
        let mut index = HashMap::with_capacity(records.len());

        for (i, rec) in records.iter().enumerate() {
            if seen_entities.insert(rec.entity.clone()) {
                entities.push(rec.entity.clone());
            }
            index.insert((rec.entity.clone(), rec.period.clone()), i);
        }

        let periods = distinct_in_order(headers.iter().map(|h| h.period.as_str()));
        let metric_names = distinct_in_order(headers.iter().map(|h| h.metric.as_str()));

        Dataset {
            records,
            headers,
            entities,
            periods,
            metric_names,
            duplicate_columns,
            entity_column,
            labels,
            index,
        }
    }

    /// Number of (entity, period) records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, entity: &str, period: &str) -> Option<&EntityPeriodRecord> {
        self.index
            .get(&(entity.to_string(), period.to_string()))
            .map(|&i| &self.records[i])
    }

    pub fn has_period(&self, period: &str) -> bool {
        self.periods.iter().any(|p| p == period)
    }

    pub fn has_entity(&self, entity: &str) -> bool {
        self.entities.iter().any(|e| e == entity)
    }

    /// Periods in ascending order.
    pub fn sorted_periods(&self) -> Vec<String> {
        let mut periods = self.periods.clone();
        periods.sort();
        periods
    }

    /// Entities in ascending order.
    pub fn sorted_entities(&self) -> Vec<String> {
        let mut entities = self.entities.clone();
        entities.sort();
        entities
    }

    /// Resolve a caller-supplied field name.
    ///
    /// Accepts any base metric label present in the headers, the aliases
    /// `exports` / `imports`, and the derived metric names.
    pub fn resolve_field(&self, name: &str) -> TradeResult<Field> {
        let name = name.trim();
        if self.metric_names.iter().any(|m| m == name) {
            return Ok(Field::Metric(name.to_string()));
        }
        let aliased = match name {
            "exports" => Some(&self.labels.exports),
            "imports" => Some(&self.labels.imports),
            _ => None,
        };
        if let Some(label) = aliased {
            if self.metric_names.contains(label) {
                return Ok(Field::Metric(label.clone()));
            }
        }
        if let Ok(derived) = name.parse::<DerivedMetric>() {
            return Ok(Field::Derived(derived));
        }
        Err(TradeError::UnknownField {
            name: name.to_string(),
        })
    }
}

fn distinct_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_placeholders_to_missing() {
        assert_eq!(Value::parse("12.5"), Value::Number(12.5));
        assert_eq!(Value::parse(" 7 "), Value::Number(7.0));
        assert_eq!(Value::parse("-"), Value::Missing);
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("n/a"), Value::Missing);
        assert_eq!(Value::parse("NaN"), Value::Missing);
        assert_eq!(Value::parse("inf"), Value::Missing);
        assert_eq!(Value::parse("-3"), Value::Number(-3.0));
    }

    #[test]
    fn negative_zero_is_normalised() {
        let v = Value::parse("-0").as_f64().unwrap();
        assert!(v.is_sign_positive());
        let v = Value::from(-0.0).as_f64().unwrap();
        assert!(v.is_sign_positive());
        assert_eq!(Value::parse("-0").to_string(), "0");
    }

    #[test]
    fn zip_with_propagates_missing() {
        let a = Value::Number(4.0);
        assert_eq!(a.zip_with(Value::Number(2.0), |x, y| x / y), Value::Number(2.0));
        assert_eq!(a.zip_with(Value::Missing, |x, y| x + y), Value::Missing);
        assert_eq!(Value::Missing.zip_with(a, |x, y| x + y), Value::Missing);
        assert_eq!(a.zip_with(Value::Number(0.0), |x, y| x / y), Value::Missing);
    }

    #[test]
    fn value_serializes_missing_as_null() {
        let json = serde_json::to_string(&[Value::Number(1.5), Value::Missing]).unwrap();
        assert_eq!(json, "[1.5,null]");
    }
}
