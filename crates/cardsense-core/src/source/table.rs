//! Tabular CSV source.

use tracing::debug;

use super::{DocumentSource, DocumentUnit};
use crate::error::SourceError;

/// A CSV document. Each record is one unit whose grid is the record's
/// cells; the unit text is the cells joined, so prose-style strategies
/// see the same content the table strategy does.
pub struct CsvSource {
    rows: Vec<Vec<String>>,
}

impl CsvSource {
    /// Read a CSV file from a path.
    pub fn from_path(path: &std::path::Path) -> Result<Self, SourceError> {
        let data = std::fs::read(path).map_err(|e| SourceError::Parse(e.to_string()))?;
        Self::load(&data)
    }

    /// Parse CSV from raw bytes.
    ///
    /// Ragged rows are accepted; summary blocks at the top of exported
    /// statements rarely share the transaction table's column count.
    pub fn load(data: &[u8]) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| SourceError::Table(e.to_string()))?;
            rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        if rows.is_empty() {
            return Err(SourceError::Empty);
        }
        debug!("loaded CSV with {} rows", rows.len());
        Ok(Self { rows })
    }
}

impl DocumentSource for CsvSource {
    fn unit_count(&self) -> usize {
        self.rows.len()
    }

    fn unit(&self, index: usize) -> Option<DocumentUnit> {
        self.rows.get(index).map(|cells| DocumentUnit {
            text: cells.join("  "),
            grid: Some(vec![cells.clone()]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_basic_csv() {
        let data = b"Credit Limit,Available Credit,Total Due\n50000.00,42350.50,3200.00\n";
        let source = CsvSource::load(data).unwrap();
        assert_eq!(source.unit_count(), 2);

        let header = source.unit(0).unwrap();
        assert_eq!(
            header.grid.unwrap()[0],
            vec!["Credit Limit", "Available Credit", "Total Due"]
        );
    }

    #[test]
    fn test_load_ragged_rows() {
        let data = b"Summary\nCredit Limit,50000.00\nDate,Description,Amount\n";
        let source = CsvSource::load(data).unwrap();
        assert_eq!(source.unit_count(), 3);
    }

    #[test]
    fn test_load_empty_is_error() {
        assert!(matches!(CsvSource::load(b""), Err(SourceError::Empty)));
    }
}
