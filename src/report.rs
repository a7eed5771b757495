use std::io::{self, Write};

use crate::data::model::{Dataset, EntityPeriodRecord};
use crate::query::QueryResult;

/// Render a query result as a plain-text table. Values use one decimal,
/// matching the dashboard's bar labels.
pub fn render<W: Write>(out: &mut W, dataset: &Dataset, result: &QueryResult) -> io::Result<()> {
    match result {
        QueryResult::Ranking {
            period,
            field,
            direction,
            rows,
        } => {
            writeln!(out, "{period}: {direction} {} by {field}", rows.len())?;
            writeln!(out, "{:>4}  {:<24} {:>12}", "#", "entity", field)?;
            for row in rows {
                writeln!(out, "{:>4}  {:<24} {:>12.1}", row.rank, row.entity, row.value)?;
            }
        }
        QueryResult::Changes {
            period_a,
            period_b,
            field,
            direction,
            rows,
        } => {
            writeln!(
                out,
                "{period_a} → {period_b}: {direction} {} by change in {field}",
                rows.len()
            )?;
            writeln!(out, "{:>4}  {:<24} {:>12}", "#", "entity", "delta")?;
            for row in rows {
                writeln!(out, "{:>4}  {:<24} {:>+12.1}", row.rank, row.entity, row.delta)?;
            }
        }
        QueryResult::History { entity, records } => {
            writeln!(out, "{entity}")?;
            write!(out, "{:<8}", "period")?;
            for m in &dataset.metric_names {
                write!(out, " {m:>12}")?;
            }
            writeln!(out)?;
            for rec in records {
                history_row(out, dataset, rec)?;
            }
        }
    }
    if result.is_empty() {
        writeln!(out, "(no qualifying entities)")?;
    }
    Ok(())
}

fn history_row<W: Write>(out: &mut W, dataset: &Dataset, rec: &EntityPeriodRecord) -> io::Result<()> {
    write!(out, "{:<8}", rec.period)?;
    for m in &dataset.metric_names {
        match rec.metric(m).as_f64() {
            Some(v) => write!(out, " {v:>12.1}")?,
            None => write!(out, " {:>12}", "-")?,
        }
    }
    writeln!(out)
}

/// One-paragraph description of a loaded dataset.
pub fn summary<W: Write>(out: &mut W, dataset: &Dataset) -> io::Result<()> {
    writeln!(out, "entities:  {}", dataset.entities.len())?;
    writeln!(out, "periods:   {}", dataset.sorted_periods().join(", "))?;
    writeln!(out, "metrics:   {}", dataset.metric_names.join(", "))?;
    writeln!(out, "records:   {}", dataset.len())?;
    if !dataset.duplicate_columns.is_empty() {
        writeln!(out, "duplicate columns (later value kept):")?;
        for h in &dataset.duplicate_columns {
            writeln!(out, "  column {}: ({}, {})", h.column, h.period, h.metric)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::data::pipeline::dataset_from_bytes;
    use crate::data::rank::Direction;
    use crate::query::{execute, Query};

    #[test]
    fn renders_ranking_rows() {
        let text = "Country,2022,2022\n,수출,수입\nX,10,5\nY,20,40\n";
        let ds = dataset_from_bytes(text.as_bytes(), &AnalysisConfig::default()).unwrap();
        let result = execute(
            &ds,
            &Query::RankSingle {
                period: "2022".into(),
                field: "ratio".into(),
                n: 1,
                direction: Direction::Top,
            },
        )
        .unwrap();

        let mut buf = Vec::new();
        render(&mut buf, &ds, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("import_export_ratio"));
        assert!(text.contains("200.0"));
        assert!(!text.contains("50.0"));
    }

    #[test]
    fn empty_result_is_flagged() {
        let text = "Country,2022\n,수출\nX,-\n";
        let ds = dataset_from_bytes(text.as_bytes(), &AnalysisConfig::default()).unwrap();
        let result = execute(
            &ds,
            &Query::RankSingle {
                period: "2022".into(),
                field: "exports".into(),
                n: 5,
                direction: Direction::Top,
            },
        )
        .unwrap();
        let mut buf = Vec::new();
        render(&mut buf, &ds, &result).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("no qualifying"));
    }
}
