/*!
 * # prc-op: Outpatient Claims Export Cleaner
 *
 * Turns the periodic patient billing/claims export into the file the
 * patient-experience survey vendor ingests.
 *
 * ## What a run does
 *
 * 1. Picks up the export (`*.csv`) waiting in the input directory
 * 2. Drops deceased-placeholder rows, rows without a usable discharge date
 *    or CPT codes, exact duplicates, rows with alphabetic CPT codes, test
 *    physicians, and discharges outside the trailing window
 *    (14 to 8 days ago by default)
 * 3. Sorts by account code and folds every account into a single row,
 *    joining its CPT codes with spaces
 * 4. Cleans the physician NPI, Admit Source and MRN columns
 * 5. Writes `OP_<MMDDYYYY>_<HHMMSS>.csv` to the output directory and
 *    deletes the source export
 *
 * ## Quick Start
 *
 * ```no_run
 * use prc_op::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let config = ConfigBuilder::new()
 *     .input_dir("/srv/claims/ToBeCleaned")
 *     .output_dir("/srv/claims/ToSend")
 *     .build();
 *
 * let report = Pipeline::new(config).run()?;
 * println!("Wrote {} rows to {}", report.output_rows, report.output_file.display());
 * # Ok(())
 * # }
 * ```
 *
 * ## Testing against a fixed date
 *
 * ```no_run
 * # use prc_op::prelude::*;
 * # fn main() -> Result<()> {
 * let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 20)
 *     .unwrap()
 *     .and_hms_opt(6, 0, 0)
 *     .unwrap();
 * let report = Pipeline::new(PipelineConfig::default()).run_at(now)?;
 * # Ok(())
 * # }
 * ```
 */

// Re-export error types from root
pub use error::{ErrorContext, PrcError, Result};

// Public modules
pub mod aggregate;
pub mod config;
pub mod data_types;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod schema;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use prc_op::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigBuilder, PipelineConfig};
    pub use crate::data_types::{AccountKey, AggregatedClaim, ClaimRecord, Column};
    pub use crate::error::{PrcError, Result};
    pub use crate::filter::FilterStats;
    pub use crate::pipeline::{Pipeline, RunReport, SourceDisposition};
    pub use crate::reader::ClaimsReader;
    pub use crate::schema::ClaimsSchema;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_schema_matches_columns() {
        assert_eq!(ClaimsSchema::column_count(), Column::ALL.len());
        assert_eq!(ClaimsSchema::column_names()[0], "FileID");
        assert_eq!(ClaimsSchema::column_names()[34], "EOR");
    }
}
