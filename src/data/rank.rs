use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TradeError, TradeResult};

use super::model::{Dataset, EntityPeriodRecord, Field};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Largest first.
    #[default]
    Top,
    /// Smallest first.
    Bottom,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Top => f.write_str("top"),
            Direction::Bottom => f.write_str("bottom"),
        }
    }
}

impl FromStr for Direction {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "desc" => Ok(Direction::Top),
            "bottom" | "asc" => Ok(Direction::Bottom),
            other => Err(TradeError::InvalidParameter(format!(
                "direction must be 'top' or 'bottom', got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// One row of a single-period ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    /// 1-based position.
    pub rank: usize,
    pub entity: String,
    pub period: String,
    /// The value of the ranked field.
    pub value: f64,
    pub record: EntityPeriodRecord,
}

/// Per-entity change between two periods. Only metrics with a value in
/// both periods appear in `delta_by_metric`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub entity: String,
    pub delta_by_metric: BTreeMap<String, f64>,
}

/// One row of a ranking over deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDelta {
    pub rank: usize,
    pub entity: String,
    pub delta: f64,
}

// ---------------------------------------------------------------------------
// Sorting core
// ---------------------------------------------------------------------------

/// Keep the items whose key is present, stable-sort them by key in the given
/// direction and return at most `n` with their keys.
///
/// Equal keys keep their input order in both directions.
pub fn top_n_by<T>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> Option<f64>,
    n: usize,
    direction: Direction,
) -> Vec<(T, f64)> {
    let mut keyed: Vec<(T, f64)> = items
        .into_iter()
        .filter_map(|item| key(&item).map(|k| (item, k)))
        .collect();
    // `-0.0 == 0.0` must stay a tie, which `total_cmp` would break.
    let cmp = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match direction {
        Direction::Top => keyed.sort_by(|a, b| cmp(b.1, a.1)),
        Direction::Bottom => keyed.sort_by(|a, b| cmp(a.1, b.1)),
    }
    keyed.truncate(n);
    keyed
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Rank the records of one period by `field`.
///
/// Records with a missing value are dropped. An unknown period or `n == 0`
/// gives an empty ranking.
pub fn rank_single(
    records: &[EntityPeriodRecord],
    period: &str,
    field: &Field,
    n: usize,
    direction: Direction,
) -> Vec<RankedRow> {
    top_n_by(
        records.iter().filter(|r| r.period == period),
        |r| field.value(r).as_f64(),
        n,
        direction,
    )
    .into_iter()
    .enumerate()
    .map(|(i, (rec, value))| RankedRow {
        rank: i + 1,
        entity: rec.entity.clone(),
        period: rec.period.clone(),
        value,
        record: rec.clone(),
    })
    .collect()
}

/// Per-entity `value(period_b) - value(period_a)` for each field.
///
/// Entities absent from either period, or missing a field's value in either
/// period, get no delta for that field. Entities with no delta at all are
/// left out. Output follows the order of `records`.
pub fn compare_across_periods(
    records: &[EntityPeriodRecord],
    period_a: &str,
    period_b: &str,
    fields: &[Field],
) -> Vec<ComparisonRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut pairs: BTreeMap<&str, (Option<&EntityPeriodRecord>, Option<&EntityPeriodRecord>)> =
        BTreeMap::new();

    for rec in records {
        let in_a = rec.period == period_a;
        let in_b = rec.period == period_b;
        if !in_a && !in_b {
            continue;
        }
        let slot = pairs.entry(rec.entity.as_str()).or_insert_with(|| {
            order.push(rec.entity.as_str());
            (None, None)
        });
        if in_a {
            slot.0 = Some(rec);
        }
        if in_b {
            slot.1 = Some(rec);
        }
    }

    order
        .into_iter()
        .filter_map(|entity| {
            let (Some(a), Some(b)) = pairs.get(entity).copied()? else {
                return None;
            };
            let delta_by_metric: BTreeMap<String, f64> = fields
                .iter()
                .filter_map(|field| {
                    let va = field.value(a).as_f64()?;
                    let vb = field.value(b).as_f64()?;
                    Some((field.name().to_string(), vb - va))
                })
                .collect();
            if delta_by_metric.is_empty() {
                None
            } else {
                Some(ComparisonRecord {
                    entity: entity.to_string(),
                    delta_by_metric,
                })
            }
        })
        .collect()
}

/// Rank comparison records by one metric's delta, with the same ordering
/// and tie rules as [`rank_single`].
pub fn rank_deltas(
    comparisons: &[ComparisonRecord],
    metric: &str,
    n: usize,
    direction: Direction,
) -> Vec<RankedDelta> {
    top_n_by(
        comparisons.iter(),
        |c| c.delta_by_metric.get(metric).copied(),
        n,
        direction,
    )
    .into_iter()
    .enumerate()
    .map(|(i, (c, delta))| RankedDelta {
        rank: i + 1,
        entity: c.entity.clone(),
        delta,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Dataset-level queries with parameter validation
// ---------------------------------------------------------------------------

impl Dataset {
    /// Single-period ranking by a named field.
    pub fn rank(
        &self,
        period: &str,
        field: &str,
        n: usize,
        direction: Direction,
    ) -> TradeResult<Vec<RankedRow>> {
        let field = self.resolve_field(field)?;
        Ok(rank_single(&self.records, period, &field, n, direction))
    }

    /// Compare two periods over the named fields (all base metrics when
    /// `fields` is empty).
    ///
    /// Fails with `InsufficientPeriods` when either period does not occur in
    /// the dataset, so that "no entity qualifies" stays distinguishable
    /// from "no such period".
    pub fn compare(
        &self,
        period_a: &str,
        period_b: &str,
        fields: &[&str],
    ) -> TradeResult<Vec<ComparisonRecord>> {
        let missing: Vec<String> = [period_a, period_b]
            .into_iter()
            .filter(|p| !self.has_period(p))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TradeError::InsufficientPeriods { missing });
        }

        let fields = if fields.is_empty() {
            self.metric_names
                .iter()
                .map(|m| Field::Metric(m.clone()))
                .collect()
        } else {
            fields
                .iter()
                .map(|f| self.resolve_field(f))
                .collect::<TradeResult<Vec<_>>>()?
        };
        Ok(compare_across_periods(&self.records, period_a, period_b, &fields))
    }

    /// Rank entities by how much `field` changed from `period_a` to `period_b`.
    pub fn rank_changes(
        &self,
        period_a: &str,
        period_b: &str,
        field: &str,
        n: usize,
        direction: Direction,
    ) -> TradeResult<Vec<RankedDelta>> {
        let resolved = self.resolve_field(field)?;
        let comparisons = self.compare(period_a, period_b, &[resolved.name()])?;
        Ok(rank_deltas(&comparisons, resolved.name(), n, direction))
    }

    /// Every record of one entity, sorted by period.
    pub fn history(&self, entity: &str) -> TradeResult<Vec<EntityPeriodRecord>> {
        let entity = entity.trim();
        if !self.has_entity(entity) {
            return Err(TradeError::UnknownEntity {
                name: entity.to_string(),
            });
        }
        let mut rows: Vec<EntityPeriodRecord> = self
            .records
            .iter()
            .filter(|r| r.entity == entity)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.period.cmp(&b.period));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_by_is_stable_for_ties() {
        let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0), ("d", 2.0)];
        let top: Vec<_> = top_n_by(items.clone(), |i| Some(i.1), 10, Direction::Top)
            .into_iter()
            .map(|(i, _)| i.0)
            .collect();
        assert_eq!(top, ["b", "d", "a", "c"]);

        let bottom: Vec<_> = top_n_by(items, |i| Some(i.1), 10, Direction::Bottom)
            .into_iter()
            .map(|(i, _)| i.0)
            .collect();
        assert_eq!(bottom, ["a", "c", "b", "d"]);
    }

    #[test]
    fn top_n_by_drops_absent_keys_and_truncates() {
        let items = vec![Some(3.0), None, Some(5.0), Some(1.0)];
        let out = top_n_by(items, |v| *v, 2, Direction::Top);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].1, 5.0);
        assert_eq!(out[1].1, 3.0);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        let items = vec![("a", -0.0), ("b", 0.0), ("c", -0.0)];
        for direction in [Direction::Top, Direction::Bottom] {
            let order: Vec<_> = top_n_by(items.clone(), |i| Some(i.1), 10, direction)
                .into_iter()
                .map(|(i, _)| i.0)
                .collect();
            assert_eq!(order, ["a", "b", "c"], "{direction}");
        }
    }

    #[test]
    fn zero_n_is_empty() {
        let out = top_n_by(vec![1.0, 2.0], |v| Some(*v), 0, Direction::Top);
        assert!(out.is_empty());
    }

    #[test]
    fn direction_parses() {
        assert_eq!("Top".parse::<Direction>().unwrap(), Direction::Top);
        assert_eq!("bottom".parse::<Direction>().unwrap(), Direction::Bottom);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
