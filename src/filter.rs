/*!
 * Record filtering
 *
 * The filters run in a fixed order and never fail; a record that does not
 * pass is dropped and counted.
 */

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::data_types::{ClaimRecord, Column};
use crate::normalize::{has_alphabetic, parse_service_date};

/// How many records each step removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub input_records: usize,
    pub deceased: usize,
    pub missing_service_date: usize,
    pub missing_cpt_codes: usize,
    pub duplicates: usize,
    pub alphabetic_cpt_codes: usize,
    pub test_physician: usize,
    pub outside_window: usize,
    pub missing_account_code: usize,
    pub retained_records: usize,
}

impl FilterStats {
    /// Total number of records removed
    pub fn dropped(&self) -> usize {
        self.input_records - self.retained_records
    }
}

/// The filter set for one run
pub struct RecordFilter<'a> {
    config: &'a PipelineConfig,
    sentinel_date: Option<NaiveDate>,
    window: (NaiveDate, NaiveDate),
}

impl<'a> RecordFilter<'a> {
    /// Build the filters for a run on `today`
    pub fn new(config: &'a PipelineConfig, today: NaiveDate) -> Self {
        Self {
            config,
            sentinel_date: parse_service_date(&config.deceased_sentinel),
            window: config.discharge_window(today),
        }
    }

    /// Inclusive discharge window used by this filter set
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        self.window
    }

    /// Run every filter in order
    pub fn apply(&self, records: Vec<ClaimRecord>) -> (Vec<ClaimRecord>, FilterStats) {
        let mut stats = FilterStats {
            input_records: records.len(),
            ..Default::default()
        };

        let mut records: Vec<ClaimRecord> = records
            .into_iter()
            .map(|mut record| {
                record.service_date = record
                    .get(Column::DischargeServiceDate)
                    .and_then(parse_service_date);
                record
            })
            .collect();

        retain_counted(&mut records, &mut stats.deceased, |r| !self.is_deceased(r));
        retain_counted(&mut records, &mut stats.missing_service_date, |r| {
            r.service_date.is_some()
        });
        retain_counted(&mut records, &mut stats.missing_cpt_codes, |r| {
            r.cpt_codes().is_some()
        });

        let before = records.len();
        records = drop_duplicates(records);
        stats.duplicates = before - records.len();

        retain_counted(&mut records, &mut stats.alphabetic_cpt_codes, |r| {
            !r.cpt_codes().is_some_and(has_alphabetic)
        });
        retain_counted(&mut records, &mut stats.test_physician, |r| {
            !self.is_test_physician(r)
        });
        retain_counted(&mut records, &mut stats.outside_window, |r| self.in_window(r));

        stats.retained_records = records.len();
        info!(
            input = stats.input_records,
            retained = stats.retained_records,
            window_start = %self.window.0,
            window_end = %self.window.1,
            "Filtered claims records"
        );
        debug!(?stats, "Filter breakdown");

        (records, stats)
    }

    /// Raw discharge date is the deceased placeholder
    pub fn is_deceased(&self, record: &ClaimRecord) -> bool {
        let sentinel = self.config.deceased_sentinel.as_str();
        let raw_match = record.get(Column::DischargeServiceDate) == Some(sentinel);
        let parsed_match =
            self.sentinel_date.is_some() && record.service_date == self.sentinel_date;
        raw_match || parsed_match
    }

    pub fn is_test_physician(&self, record: &ClaimRecord) -> bool {
        record
            .physician_name()
            .is_some_and(|name| self.config.test_physician_names.iter().any(|t| t == name))
    }

    pub fn in_window(&self, record: &ClaimRecord) -> bool {
        let (start, end) = self.window;
        record
            .service_date
            .is_some_and(|date| date >= start && date <= end)
    }
}

/// Keep the first occurrence of every distinct row
pub fn drop_duplicates(records: Vec<ClaimRecord>) -> Vec<ClaimRecord> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(records.len());
        records
            .iter()
            .map(|record| {
                let first = seen.insert(record.duplicate_key());
                if !first {
                    debug!(account = ?record.account_code(), "Dropping duplicate row");
                }
                first
            })
            .collect()
    };

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}

fn retain_counted<F>(records: &mut Vec<ClaimRecord>, counter: &mut usize, keep: F)
where
    F: Fn(&ClaimRecord) -> bool,
{
    let before = records.len();
    records.retain(|r| keep(r));
    *counter += before - records.len();
}
