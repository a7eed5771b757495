use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::MetricLabels;
use crate::error::TradeError;

use super::model::{EntityPeriodRecord, Value};

/// Metrics computed from the two base metrics on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedMetric {
    /// imports / exports × 100
    ImportExportRatio,
    /// exports + imports
    Openness,
    /// exports − imports
    Balance,
}

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 3] = [
        DerivedMetric::ImportExportRatio,
        DerivedMetric::Openness,
        DerivedMetric::Balance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DerivedMetric::ImportExportRatio => "import_export_ratio",
            DerivedMetric::Openness => "openness",
            DerivedMetric::Balance => "balance",
        }
    }

    pub fn compute(self, exports: Value, imports: Value) -> Value {
        match self {
            DerivedMetric::ImportExportRatio => match exports {
                Value::Number(e) if e != 0.0 => imports.zip_with(exports, |i, e| i / e * 100.0),
                _ => Value::Missing,
            },
            DerivedMetric::Openness => exports.zip_with(imports, |e, i| e + i),
            DerivedMetric::Balance => exports.zip_with(imports, |e, i| e - i),
        }
    }
}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DerivedMetric {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "import_export_ratio" | "ratio" => Ok(DerivedMetric::ImportExportRatio),
            "openness" => Ok(DerivedMetric::Openness),
            "balance" => Ok(DerivedMetric::Balance),
            other => Err(TradeError::UnknownField {
                name: other.to_string(),
            }),
        }
    }
}

/// Return the records with `derived` filled in. Exports and imports are
/// looked up under the configured labels; an absent label reads as missing.
pub fn derive_metrics(records: Vec<EntityPeriodRecord>, labels: &MetricLabels) -> Vec<EntityPeriodRecord> {
    records
        .into_iter()
        .map(|mut rec| {
            let exports = rec.metric(&labels.exports);
            let imports = rec.metric(&labels.imports);
            rec.derived = DerivedMetric::ALL
                .iter()
                .map(|d| (d.name().to_string(), d.compute(exports, imports)))
                .collect();
            rec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(exports: Value, imports: Value) -> EntityPeriodRecord {
        let labels = MetricLabels::default();
        let mut metrics = BTreeMap::new();
        metrics.insert(labels.exports, exports);
        metrics.insert(labels.imports, imports);
        EntityPeriodRecord {
            entity: "X".into(),
            period: "2022".into(),
            metrics,
            derived: BTreeMap::new(),
        }
    }

    fn derived_one(exports: Value, imports: Value) -> EntityPeriodRecord {
        derive_metrics(vec![record(exports, imports)], &MetricLabels::default()).remove(0)
    }

    #[test]
    fn ratio_is_imports_over_exports_percent() {
        let rec = derived_one(Value::Number(10.0), Value::Number(5.0));
        assert_eq!(rec.derived(DerivedMetric::ImportExportRatio), Value::Number(50.0));
        assert_eq!(rec.derived(DerivedMetric::Openness), Value::Number(15.0));
        assert_eq!(rec.derived(DerivedMetric::Balance), Value::Number(5.0));
    }

    #[test]
    fn zero_or_missing_exports_give_missing_ratio() {
        let zero = derived_one(Value::Number(0.0), Value::Number(5.0));
        assert_eq!(zero.derived(DerivedMetric::ImportExportRatio), Value::Missing);
        assert_eq!(zero.derived(DerivedMetric::Openness), Value::Number(5.0));

        let missing = derived_one(Value::Missing, Value::Number(5.0));
        assert_eq!(missing.derived(DerivedMetric::ImportExportRatio), Value::Missing);
        assert_eq!(missing.derived(DerivedMetric::Balance), Value::Missing);
    }

    #[test]
    fn missing_imports_propagate() {
        let rec = derived_one(Value::Number(3.0), Value::Missing);
        for d in DerivedMetric::ALL {
            assert_eq!(rec.derived(d), Value::Missing, "{d}");
        }
    }

    #[test]
    fn parses_names_and_alias() {
        assert_eq!("ratio".parse::<DerivedMetric>().unwrap(), DerivedMetric::ImportExportRatio);
        assert_eq!("balance".parse::<DerivedMetric>().unwrap(), DerivedMetric::Balance);
        assert!(matches!(
            "volume".parse::<DerivedMetric>(),
            Err(TradeError::UnknownField { .. })
        ));
    }
}
