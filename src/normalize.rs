/*!
 * Field-level parsing and normalization
 *
 * Nothing in here fails: a value that cannot be understood is reported as
 * missing and the caller decides whether that excludes the row.
 */

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::data_types::{AggregatedClaim, Column};

/// Display format of the discharge/service date in the output file
pub const OUTPUT_DATE_FORMAT: &str = "%m/%d/%Y";

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a discharge/service date, `None` when it is not a recognizable date
pub fn parse_service_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Render a service date the way downstream consumers expect it
pub fn format_service_date(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

/// Strip the `.0` left behind when an integer identifier went through a float
///
/// Only values that read as a number and end in `.0` are touched; the
/// rightmost `.0` is removed. Everything else, including text such as `N/A`,
/// comes back unchanged, so applying the trim twice is the same as once.
pub fn trim_decimal_suffix(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim();
    if trimmed.ends_with(".0") && trimmed.parse::<f64>().is_ok() {
        if let Some(idx) = trimmed.rfind(".0") {
            return Cow::Owned(trimmed[..idx].to_string());
        }
    }
    Cow::Borrowed(value)
}

/// Apply [`trim_decimal_suffix`] to an optional field
///
/// Shared by Admit Source and MRN.
pub fn trim_decimal_field(value: Option<String>) -> Option<String> {
    value.map(|v| match trim_decimal_suffix(&v) {
        Cow::Borrowed(_) => v,
        Cow::Owned(trimmed) => trimmed,
    })
}

/// Coerce a physician NPI to an integer
///
/// `missing_sentinel` and anything that is not a whole number (letters,
/// fractions, overflow) become `None`.
pub fn normalize_physician_npi(raw: Option<&str>, missing_sentinel: i64) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let value = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let float = raw.parse::<f64>().ok()?;
            if !float.is_finite() || float.fract() != 0.0 || float.abs() >= i64::MAX as f64 {
                return None;
            }
            float as i64
        }
    };

    if value == missing_sentinel {
        None
    } else {
        Some(value)
    }
}

/// Whether a CPT code value carries alphabetic residue
pub fn has_alphabetic(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic())
}

/// Post-aggregation clean-up of the identifier columns
pub fn normalize_claim(claim: &mut AggregatedClaim, npi_missing_sentinel: i64) {
    claim.physician_npi =
        normalize_physician_npi(claim.get(Column::PhysicianNpi), npi_missing_sentinel);
    claim.set(
        Column::PhysicianNpi,
        claim.physician_npi.map(|npi| npi.to_string()),
    );

    for column in [Column::AdmitSource, Column::Mrn] {
        let trimmed = trim_decimal_field(claim.get(column).map(str::to_string));
        claim.set(column, trimmed);
    }
}
