/*!
 * End-to-end run of the claims cleaner
 *
 * discover → load → filter → sort → render dates → aggregate → normalize
 * → write → delete source. Any error before the write leaves the input
 * file where it is so the next scheduled run can retry it.
 */

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::aggregate::{aggregate, sort_by_account};
use crate::config::PipelineConfig;
use crate::data_types::{AggregatedClaim, ClaimRecord, Column};
use crate::export::{output_file_name, ClaimsExporter};
use crate::filter::{FilterStats, RecordFilter};
use crate::normalize::{format_service_date, normalize_claim};
use crate::reader::{discover_input, ClaimsReader};
use crate::Result;

/// What happened to the source file after the output was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceDisposition {
    Deleted,
    Kept,
    DeleteFailed { reason: String },
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub run_at: NaiveDateTime,
    pub filter: FilterStats,
    pub output_rows: usize,
    pub source: SourceDisposition,
    pub elapsed_ms: u64,
}

/// The claims cleaning pipeline
pub struct Pipeline {
    config: PipelineConfig,
    reader: ClaimsReader,
    exporter: ClaimsExporter,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            reader: ClaimsReader::new(),
            exporter: ClaimsExporter::new(),
        }
    }

    /// Run against the local wall clock
    pub fn run(&self) -> Result<RunReport> {
        self.run_at(Local::now().naive_local())
    }

    /// Run as if the current time were `now`
    #[instrument(skip(self), fields(input_dir = %self.config.input_dir.display()))]
    pub fn run_at(&self, now: NaiveDateTime) -> Result<RunReport> {
        let started = Instant::now();
        self.config.validate()?;

        let input = discover_input(&self.config.input_dir, self.config.extension())?;
        let export = self.reader.load(&input)?;

        let (claims, filter) = self.transform(export.records, now);

        let output = self
            .config
            .output_dir
            .join(output_file_name(&self.config.output_prefix, now));
        self.exporter.export(&claims, &output)?;

        let source = if self.config.delete_source {
            remove_source(&input)
        } else {
            SourceDisposition::Kept
        };

        let report = RunReport {
            input_file: input,
            output_file: output,
            run_at: now,
            filter,
            output_rows: claims.len(),
            source,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            output = %report.output_file.display(),
            rows = report.output_rows,
            "Run complete"
        );
        Ok(report)
    }

    /// The in-memory part of a run: filter, sort, aggregate, normalize
    pub fn transform(
        &self,
        records: Vec<ClaimRecord>,
        now: NaiveDateTime,
    ) -> (Vec<AggregatedClaim>, FilterStats) {
        let filter = RecordFilter::new(&self.config, now.date());
        let (records, mut stats) = filter.apply(records);

        let (mut sorted, missing_account) = sort_by_account(records);
        stats.missing_account_code = missing_account;
        stats.retained_records -= missing_account;

        // display form from here on; the window check is already done
        for (_, record) in sorted.iter_mut() {
            let rendered = record.service_date.map(format_service_date);
            record.set(Column::DischargeServiceDate, rendered);
        }

        let mut claims = aggregate(sorted);
        for claim in claims.iter_mut() {
            normalize_claim(claim, self.config.npi_missing_sentinel);
        }

        (claims, stats)
    }
}

fn remove_source(path: &Path) -> SourceDisposition {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(file = %path.display(), "Deleted source export");
            SourceDisposition::Deleted
        }
        Err(e) => {
            error!(file = %path.display(), error = %e, "Failed to delete source export");
            SourceDisposition::DeleteFailed {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn record(account: &str, date: &str, cpt: &str) -> ClaimRecord {
        ClaimRecord::from_pairs([
            (Column::AccountCode, account),
            (Column::DischargeServiceDate, date),
            (Column::CptCodes, cpt),
            (Column::PhysicianName, "DR SMITH"),
        ])
    }

    #[test]
    fn test_transform_groups_and_renders_dates() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let (claims, stats) = pipeline.transform(
            vec![
                record("100", "2024-06-10", "99213"),
                record("100", "2024-06-11", "99214"),
                record("200", "2024-06-01", "99215"),
            ],
            now(),
        );

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].get(Column::CptCodes), Some("99213 99214"));
        assert_eq!(claims[0].get(Column::DischargeServiceDate), Some("06/10/2024"));
        assert_eq!(stats.outside_window, 1);
        assert_eq!(stats.retained_records, 2);
    }

    #[test]
    fn test_transform_counts_missing_account() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let mut orphan = record("1", "2024-06-10", "99213");
        orphan.set(Column::AccountCode, None);

        let (claims, stats) = pipeline.transform(vec![orphan], now());
        assert!(claims.is_empty());
        assert_eq!(stats.missing_account_code, 1);
        assert_eq!(stats.retained_records, 0);
        assert_eq!(stats.dropped(), 1);
    }

    #[test]
    fn test_remove_source_reports_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("already_gone.csv");

        match remove_source(&missing) {
            SourceDisposition::DeleteFailed { reason } => assert!(!reason.is_empty()),
            other => panic!("unexpected disposition: {other:?}"),
        }
    }

    #[test]
    fn test_remove_source_deletes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "x").unwrap();

        assert_eq!(remove_source(&path), SourceDisposition::Deleted);
        assert!(!path.exists());
    }
}
