use std::fmt;
use std::str::FromStr;

use crate::data::derive::DerivedMetric;
use crate::data::rank::Direction;
use crate::error::TradeError;
use crate::query::Query;

/// The fixed analyses offered by the dashboard, numbered as in its menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    TopExporters,
    TopImporters,
    HighestImportRatio,
    LowestImportRatio,
    ExportGain,
    ExportDrop,
    ImportGain,
    ImportDrop,
    EntityHistory,
}

/// Selections an analysis is parameterised with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub period: String,
    pub entity: String,
    pub compare_from: String,
    pub compare_to: String,
    pub n: usize,
}

impl Analysis {
    pub const ALL: [Analysis; 9] = [
        Analysis::TopExporters,
        Analysis::TopImporters,
        Analysis::HighestImportRatio,
        Analysis::LowestImportRatio,
        Analysis::ExportGain,
        Analysis::ExportDrop,
        Analysis::ImportGain,
        Analysis::ImportDrop,
        Analysis::EntityHistory,
    ];

    /// Menu number, 1-based.
    pub fn number(self) -> u8 {
        Analysis::ALL
            .iter()
            .position(|a| *a == self)
            .map_or(0, |i| i as u8 + 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Analysis::TopExporters => "Top exporters by year",
            Analysis::TopImporters => "Top importers by year",
            Analysis::HighestImportRatio => "Highest imports relative to exports",
            Analysis::LowestImportRatio => "Lowest imports relative to exports",
            Analysis::ExportGain => "Largest export share increase",
            Analysis::ExportDrop => "Largest export share decrease",
            Analysis::ImportGain => "Largest import share increase",
            Analysis::ImportDrop => "Largest import share decrease",
            Analysis::EntityHistory => "Country detail (all years)",
        }
    }

    /// Whether the analysis uses the selected single period.
    pub fn uses_period(self) -> bool {
        matches!(
            self,
            Analysis::TopExporters
                | Analysis::TopImporters
                | Analysis::HighestImportRatio
                | Analysis::LowestImportRatio
        )
    }

    /// Translate into a query over the current selection.
    pub fn to_query(self, sel: &Selection) -> Query {
        let rank = |field: &str, direction| Query::RankSingle {
            period: sel.period.clone(),
            field: field.to_string(),
            n: sel.n,
            direction,
        };
        let change = |field: &str, direction| Query::CompareAcrossPeriods {
            period_a: sel.compare_from.clone(),
            period_b: sel.compare_to.clone(),
            field: field.to_string(),
            n: sel.n,
            direction,
        };
        let ratio = DerivedMetric::ImportExportRatio.name();

        match self {
            Analysis::TopExporters => rank("exports", Direction::Top),
            Analysis::TopImporters => rank("imports", Direction::Top),
            Analysis::HighestImportRatio => rank(ratio, Direction::Top),
            Analysis::LowestImportRatio => rank(ratio, Direction::Bottom),
            Analysis::ExportGain => change("exports", Direction::Top),
            Analysis::ExportDrop => change("exports", Direction::Bottom),
            Analysis::ImportGain => change("imports", Direction::Top),
            Analysis::ImportDrop => change("imports", Direction::Bottom),
            Analysis::EntityHistory => Query::EntityHistory {
                entity: sel.entity.clone(),
            },
        }
    }
}

impl TryFrom<u8> for Analysis {
    type Error = TradeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        usize::from(n)
            .checked_sub(1)
            .and_then(|i| Analysis::ALL.get(i).copied())
            .ok_or_else(|| TradeError::InvalidParameter(format!("no analysis numbered {n}")))
    }
}

impl FromStr for Analysis {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| TradeError::InvalidParameter(format!("'{s}' is not a menu number")))?;
        Analysis::try_from(n)
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}
