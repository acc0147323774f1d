/*!
 * CSV reader for claims exports
 *
 * Finds the export waiting in the input directory and loads it into
 * [`ClaimRecord`]s. Structural problems (unreadable file, ragged rows,
 * missing columns) are fatal; cell contents are never validated here.
 */

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::data_types::{ClaimRecord, Column};
use crate::schema::{ClaimsSchema, ColumnMap};
use crate::{ErrorContext, PrcError, Result};

/// Locate the export to process in `dir`
///
/// Only regular files directly inside `dir` whose extension equals
/// `extension` qualify. When several do, the lexicographically first name
/// is picked and the rest are left for a later run.
pub fn discover_input(dir: &Path, extension: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(PrcError::file_not_found_with_suggestion(dir.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PrcError::from(e).with_file(dir))? {
        let entry = entry.map_err(|e| PrcError::from(e).with_file(dir))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            candidates.push(path);
        }
    }

    candidates.sort();
    let mut candidates = candidates.into_iter();
    let chosen = candidates.next().ok_or_else(|| PrcError::NoInputFile {
        directory: dir.to_path_buf(),
        extension: extension.to_string(),
    })?;

    for skipped in candidates {
        warn!(file = %skipped.display(), "Additional export left for a later run");
    }

    Ok(chosen)
}

/// A loaded claims export
#[derive(Debug)]
pub struct ClaimsExport {
    pub path: PathBuf,
    pub records: Vec<ClaimRecord>,
    pub columns: ColumnMap,
}

/// Claims export reader
pub struct ClaimsReader {
    /// Field delimiter
    delimiter: u8,
}

impl Default for ClaimsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Load every row of the export at `path`
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ClaimsExport> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PrcError::file_not_found_with_suggestion(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| PrcError::from(e).with_file(path))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PrcError::from(e).with_file(path))?
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = ClaimsSchema::resolve_headers(&headers, Some(path))?;

        let start_time = Instant::now();
        let mut records = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let csv_record = result.map_err(|e| PrcError::CsvParse {
                message: e.to_string(),
                line: Some(idx + 2), // +2 for header and 0-based index
                context: ErrorContext {
                    file_path: Some(path.to_path_buf()),
                    line_number: Some(idx + 2),
                    ..Default::default()
                },
            })?;

            records.push(parse_claim_record(&csv_record, &columns));
        }

        info!(
            file = %path.display(),
            records = records.len(),
            extra_columns = columns.extra_columns(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Loaded claims export"
        );

        Ok(ClaimsExport {
            path: path.to_path_buf(),
            records,
            columns,
        })
    }
}

/// Map a CSV row onto a record using the resolved column positions
fn parse_claim_record(row: &csv::StringRecord, columns: &ColumnMap) -> ClaimRecord {
    let mut record = ClaimRecord::new();
    for column in Column::ALL {
        let value = row.get(columns.position(column)).map(str::to_string);
        record.set(column, value);
    }
    record
}
