use std::io::Read;
use std::path::Path;

use crate::error::{TradeError, TradeResult};

// ---------------------------------------------------------------------------
// RawTable – the delimited file, cell for cell
// ---------------------------------------------------------------------------

/// Every row of the input as text, with no header inference.
///
/// Row 0 carries period labels, row 1 metric labels, rows ≥ 2 one entity
/// each. Nothing here enforces that; the header decoder does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        RawTable { rows }
    }

    /// Convenience for tests and generators.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        RawTable {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read the whole file into memory.
pub fn read_source(path: &Path) -> TradeResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| TradeError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a raw table from a delimited file on disk.
pub fn load_file(path: &Path, delimiter: u8) -> TradeResult<RawTable> {
    let bytes = read_source(path)?;
    parse_bytes(&bytes, delimiter)
}

/// Parse delimited UTF-8 text. Rows may have differing widths; width checks
/// belong to the header decoder so that it can report the offending row.
pub fn parse_bytes(bytes: &[u8], delimiter: u8) -> TradeResult<RawTable> {
    parse_reader(bytes, delimiter)
}

pub fn parse_reader<R: Read>(reader: R, delimiter: u8) -> TradeResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    log::debug!("parsed raw table with {} rows", rows.len());
    Ok(RawTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_every_row_including_headers() {
        let text = "Country,2022,2022\n,수출,수입\nKorea,40.1,-\n";
        let raw = parse_bytes(text.as_bytes(), b',').unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.rows[0], vec!["Country", "2022", "2022"]);
        assert_eq!(raw.rows[1], vec!["", "수출", "수입"]);
        assert_eq!(raw.rows[2], vec!["Korea", "40.1", "-"]);
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let raw = parse_bytes(b"a,b,c\nd,e\n", b',').unwrap();
        assert_eq!(raw.rows[0].len(), 3);
        assert_eq!(raw.rows[1].len(), 2);
    }

    #[test]
    fn strips_byte_order_mark() {
        let raw = parse_bytes("\u{feff}Country,2022\n".as_bytes(), b',').unwrap();
        assert_eq!(raw.rows[0][0], "Country");
    }

    #[test]
    fn honours_delimiter() {
        let raw = parse_bytes(b"a;b\n1;2\n", b';').unwrap();
        assert_eq!(raw.rows[1], vec!["1", "2"]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_file(Path::new("/definitely/not/here.csv"), b',').unwrap_err();
        assert!(matches!(err, TradeError::FileUnavailable { .. }));
    }
}
