/*!
 * Data type definitions for claims export records
 *
 * A claims export is a flat table; every cell is kept as optional text and
 * addressed through the [`Column`] enum. Only the discharge/service date gets
 * a typed companion because the filters compare it as a calendar date.
 */

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

/// Number of columns every claims export must carry
pub const COLUMN_COUNT: usize = 35;

/// Columns of the claims export, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    FileId,
    PhoneNumber,
    FirstName,
    MiddleName,
    LastName,
    MailingAddress1,
    MailingAddress2,
    City,
    State,
    ZipCode,
    DateOfBirth,
    Gender,
    DischargeServiceDate,
    Mrn,
    AccountCode,
    EmailAddress,
    PatientLanguage,
    Ccn,
    SystemName,
    HospitalNpi,
    HopdAscName,
    Facility,
    FacilityCode,
    ServiceCode,
    PatientType,
    ServiceDescription,
    TreatmentType,
    AdmitSource,
    PatientDischargeStatus,
    CptCodes,
    PhysicianName,
    PhysicianNpi,
    Room,
    PrcReportGroup,
    Eor,
}

impl Column {
    /// All columns in the order they are written to the output file
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::FileId,
        Column::PhoneNumber,
        Column::FirstName,
        Column::MiddleName,
        Column::LastName,
        Column::MailingAddress1,
        Column::MailingAddress2,
        Column::City,
        Column::State,
        Column::ZipCode,
        Column::DateOfBirth,
        Column::Gender,
        Column::DischargeServiceDate,
        Column::Mrn,
        Column::AccountCode,
        Column::EmailAddress,
        Column::PatientLanguage,
        Column::Ccn,
        Column::SystemName,
        Column::HospitalNpi,
        Column::HopdAscName,
        Column::Facility,
        Column::FacilityCode,
        Column::ServiceCode,
        Column::PatientType,
        Column::ServiceDescription,
        Column::TreatmentType,
        Column::AdmitSource,
        Column::PatientDischargeStatus,
        Column::CptCodes,
        Column::PhysicianName,
        Column::PhysicianNpi,
        Column::Room,
        Column::PrcReportGroup,
        Column::Eor,
    ];

    /// Header text as it appears in the export
    pub fn header(&self) -> &'static str {
        match self {
            Column::FileId => "FileID",
            Column::PhoneNumber => "Phone Number",
            Column::FirstName => "First Name",
            Column::MiddleName => "Middle Name",
            Column::LastName => "Last Name",
            Column::MailingAddress1 => "Mailing Address 1",
            Column::MailingAddress2 => "Mailing Address 2",
            Column::City => "City",
            Column::State => "State",
            Column::ZipCode => "ZIP Code",
            Column::DateOfBirth => "Date of Birth",
            Column::Gender => "Gender",
            Column::DischargeServiceDate => "Discharge/Service Date",
            Column::Mrn => "MRN",
            Column::AccountCode => "Account Code",
            Column::EmailAddress => "Email Address",
            Column::PatientLanguage => "Patient Language",
            Column::Ccn => "CCN",
            Column::SystemName => "System Name",
            Column::HospitalNpi => "Hospital NPI",
            Column::HopdAscName => "HOPD/ASC Name",
            Column::Facility => "Facility",
            Column::FacilityCode => "Facility Code",
            Column::ServiceCode => "Service Code",
            Column::PatientType => "Patient Type",
            Column::ServiceDescription => "Service Description",
            Column::TreatmentType => "Treatment Type",
            Column::AdmitSource => "Admit Source",
            Column::PatientDischargeStatus => "Patient Discharge Status",
            Column::CptCodes => "CPT Codes",
            Column::PhysicianName => "Physician Name",
            Column::PhysicianNpi => "Physician NPI",
            Column::Room => "Room",
            Column::PrcReportGroup => "PRC Report Group",
            Column::Eor => "EOR",
        }
    }

    /// Look a column up by its exact header text
    pub fn from_header(header: &str) -> Option<Column> {
        Self::ALL.iter().copied().find(|c| c.header() == header)
    }

    /// Position of the column in a record
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One row of the claims export
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClaimRecord {
    values: Vec<Option<String>>,
    /// Parsed discharge/service date; `None` when the raw value is missing or unparseable
    pub service_date: Option<NaiveDate>,
}

impl Default for ClaimRecord {
    fn default() -> Self {
        Self {
            values: vec![None; COLUMN_COUNT],
            service_date: None,
        }
    }
}

impl ClaimRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs; empty values count as missing
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Column, &'a str)>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.set(column, Some(value.to_string()));
        }
        record
    }

    /// Value of a column, `None` when missing
    pub fn get(&self, column: Column) -> Option<&str> {
        self.values[column.index()].as_deref()
    }

    /// Set a column; blank text is stored as missing, anything else verbatim
    pub fn set(&mut self, column: Column, value: Option<String>) {
        self.values[column.index()] = value.filter(|v| !v.trim().is_empty());
    }

    /// Take a column's value out of the record
    pub fn take(&mut self, column: Column) -> Option<String> {
        self.values[column.index()].take()
    }

    pub fn account_code(&self) -> Option<&str> {
        self.get(Column::AccountCode)
    }

    pub fn cpt_codes(&self) -> Option<&str> {
        self.get(Column::CptCodes)
    }

    pub fn physician_name(&self) -> Option<&str> {
        self.get(Column::PhysicianName)
    }

    /// Identity used for full-row duplicate detection
    ///
    /// The date column compares by parsed date so that two spellings of
    /// the same day are still duplicates.
    pub fn duplicate_key(&self) -> (Vec<Option<&str>>, Option<NaiveDate>) {
        let cells = Column::ALL
            .iter()
            .filter(|c| **c != Column::DischargeServiceDate)
            .map(|c| self.get(*c))
            .collect();
        (cells, self.service_date)
    }
}

/// Grouping key derived from the account code
///
/// A dataset whose account codes are all integers is keyed numerically,
/// anything else falls back to text comparison. Keys of one dataset are
/// always of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountKey {
    Numeric(i128),
    Text(String),
}

impl AccountKey {
    /// Parse an account code as a numeric key
    pub fn numeric(code: &str) -> Option<Self> {
        code.trim().parse::<i128>().ok().map(AccountKey::Numeric)
    }

    /// Use the account code verbatim as a text key
    pub fn text(code: &str) -> Self {
        AccountKey::Text(code.to_string())
    }
}

impl Ord for AccountKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AccountKey::Numeric(a), AccountKey::Numeric(b)) => a.cmp(b),
            (AccountKey::Text(a), AccountKey::Text(b)) => a.cmp(b),
            (AccountKey::Numeric(_), AccountKey::Text(_)) => Ordering::Less,
            (AccountKey::Text(_), AccountKey::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for AccountKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Numeric(n) => write!(f, "{}", n),
            AccountKey::Text(s) => f.write_str(s),
        }
    }
}

/// One output row: every record sharing an account code folded together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedClaim {
    pub key: AccountKey,
    values: Vec<Option<String>>,
    /// Normalized physician NPI
    pub physician_npi: Option<i64>,
    /// How many source rows were folded into this one
    pub source_rows: usize,
}

impl AggregatedClaim {
    /// Start a group from its first record
    pub fn from_first(key: AccountKey, record: ClaimRecord) -> Self {
        Self {
            key,
            values: record.values,
            physician_npi: None,
            source_rows: 1,
        }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.values[column.index()].as_deref()
    }

    pub fn set(&mut self, column: Column, value: Option<String>) {
        self.values[column.index()] = value;
    }

    /// Mutable slot of a column, used by the group fold
    pub(crate) fn slot_mut(&mut self, column: Column) -> &mut Option<String> {
        &mut self.values[column.index()]
    }

    /// Cells in output column order, missing values as empty strings
    pub fn to_row(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|c| match c {
                Column::PhysicianNpi => self
                    .physician_npi
                    .map(|npi| npi.to_string())
                    .unwrap_or_default(),
                _ => self.get(*c).unwrap_or_default().to_string(),
            })
            .collect()
    }
}
