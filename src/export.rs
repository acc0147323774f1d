/*!
 * Export of the cleaned claims file
 *
 * The output file name embeds the run timestamp. Rows are first written to
 * a `.partial` sibling which is renamed into place once flushed, so the
 * output directory never holds a half-written file.
 */

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

use crate::data_types::{AggregatedClaim, Column};
use crate::{PrcError, Result};

/// Timestamp layout embedded in output file names
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%m%d%Y_%H%M%S";

/// `<prefix>_<MMDDYYYY>_<HHMMSS>.csv`
pub fn output_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.csv", prefix, now.format(OUTPUT_TIMESTAMP_FORMAT))
}

/// CSV writer for aggregated claims
pub struct ClaimsExporter {
    /// Field delimiter
    delimiter: u8,
}

impl Default for ClaimsExporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ClaimsExporter {
    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `claims` to `path`, header row first
    pub fn export(&self, claims: &[AggregatedClaim], path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| PrcError::from(e).with_file(dir))?;
        }

        let partial = partial_path(path);
        if let Err(err) = self.write_rows(claims, &partial) {
            let _ = std::fs::remove_file(&partial);
            return Err(err);
        }

        std::fs::rename(&partial, path).map_err(|e| PrcError::Export {
            message: format!("Could not move {} into place: {}", partial.display(), e),
            path: Some(path.to_path_buf()),
            suggestion: Some("Check permissions on the output directory".to_string()),
        })?;

        info!(file = %path.display(), rows = claims.len(), "Wrote cleaned claims file");
        Ok(())
    }

    fn write_rows(&self, claims: &[AggregatedClaim], path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| PrcError::from(e).with_file(path))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        writer.write_record(Column::ALL.iter().map(|c| c.header()))?;
        for claim in claims {
            writer.write_record(claim.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{AccountKey, ClaimRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_output_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 20)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap();
        assert_eq!(output_file_name("OP", now), "OP_06202024_070509.csv");
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("OP_test.csv");

        let record = ClaimRecord::from_pairs([
            (Column::AccountCode, "100"),
            (Column::CptCodes, "99213 99214"),
            (Column::PhysicianNpi, "ignored"),
        ]);
        let mut claim = AggregatedClaim::from_first(AccountKey::Numeric(100), record);
        claim.physician_npi = Some(1234567890);

        ClaimsExporter::new().export(&[claim], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers.len(), Column::ALL.len());
        assert_eq!(headers[Column::AccountCode.index()], "Account Code");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][Column::CptCodes.index()], "99213 99214");
        assert_eq!(&rows[0][Column::PhysicianNpi.index()], "1234567890");
        assert_eq!(&rows[0][Column::Room.index()], "");
        assert!(!partial_path(&path).exists());
    }
}
