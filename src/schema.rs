/*!
 * Schema definition for the claims export
 *
 * The export's column order is not guaranteed, so the header row is
 * resolved into a position per [`Column`] rather than compared positionally.
 * Every required column must be present; extra columns are ignored.
 */

use std::path::Path;

use crate::data_types::{Column, COLUMN_COUNT};
use crate::{PrcError, Result};

/// Claims export file schema
pub struct ClaimsSchema;

impl ClaimsSchema {
    /// Get all required column names in output order
    pub fn column_names() -> Vec<&'static str> {
        Column::ALL.iter().map(|c| c.header()).collect()
    }

    pub fn column_count() -> usize {
        COLUMN_COUNT
    }

    /// Validate a header row, returning where each column lives in it
    pub fn resolve_headers(headers: &[String], file: Option<&Path>) -> Result<ColumnMap> {
        let mut positions = [None; COLUMN_COUNT];

        for (position, header) in headers.iter().enumerate() {
            // exports written by spreadsheet tools may carry a BOM on the first cell
            let header = header.trim_start_matches('\u{feff}').trim();
            if let Some(column) = Column::from_header(header) {
                positions[column.index()].get_or_insert(position);
            }
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| positions[c.index()].is_none())
            .map(|c| c.header().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(PrcError::schema_missing_columns(
                missing,
                file.map(Path::to_path_buf),
            ));
        }

        Ok(ColumnMap {
            positions: positions.map(|p| p.unwrap_or_default()),
            width: headers.len(),
        })
    }
}

/// Position of every required column within a particular export
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: [usize; COLUMN_COUNT],
    width: usize,
}

impl ColumnMap {
    /// Position of `column` in the source row
    pub fn position(&self, column: Column) -> usize {
        self.positions[column.index()]
    }

    /// Number of source columns that are not part of the schema
    pub fn extra_columns(&self) -> usize {
        self.width.saturating_sub(COLUMN_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_reordered_headers() {
        let mut names = ClaimsSchema::column_names();
        names.reverse();
        names.push("Unused Column");

        let map = ClaimsSchema::resolve_headers(&headers(&names), None).unwrap();
        assert_eq!(map.position(Column::Eor), 0);
        assert_eq!(map.position(Column::FileId), COLUMN_COUNT - 1);
        assert_eq!(map.extra_columns(), 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let names: Vec<&str> = ClaimsSchema::column_names()
            .into_iter()
            .filter(|n| *n != "CPT Codes")
            .collect();

        match ClaimsSchema::resolve_headers(&headers(&names), None) {
            Err(PrcError::SchemaMismatch { missing_columns, .. }) => {
                assert_eq!(missing_columns, vec!["CPT Codes".to_string()]);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_bom_on_first_header() {
        let mut names = headers(&ClaimsSchema::column_names());
        names[0] = format!("\u{feff}{}", names[0]);
        let map = ClaimsSchema::resolve_headers(&names, None).unwrap();
        assert_eq!(map.position(Column::FileId), 0);
    }
}
