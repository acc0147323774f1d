/*!
 * Error handling for the claims cleaning pipeline
 *
 * Only structural problems surface as errors: a missing input file, an
 * unreadable export, a header without the expected columns, or a failed
 * write. Per-record problems (bad dates, junk identifiers) are handled by
 * exclusion or coercion and never reach this type.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline result type
pub type Result<T> = std::result::Result<T, PrcError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum PrcError {
    /// File I/O errors with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    /// CSV parsing errors with location information
    #[error("CSV parsing error at line {line:?}: {message}")]
    CsvParse {
        message: String,
        line: Option<usize>,
        context: ErrorContext,
    },

    /// Header row is missing one or more required columns
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        message: String,
        missing_columns: Vec<String>,
        context: ErrorContext,
    },

    /// Input directory holds no export to process
    #[error("No '.{extension}' file found in {}", .directory.display())]
    NoInputFile {
        directory: PathBuf,
        extension: String,
    },

    /// File not found with suggestions
    #[error("File not found: {path}")]
    FileNotFound {
        path: PathBuf,
        suggestion: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// Output could not be produced
    #[error("Export error: {message}")]
    Export {
        message: String,
        path: Option<PathBuf>,
        suggestion: Option<String>,
    },
}

/// Error context providing additional information
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub line_number: Option<usize>,
    pub column_name: Option<String>,
}

impl PrcError {
    /// Create a file not found error with helpful suggestion
    pub fn file_not_found_with_suggestion(path: PathBuf) -> Self {
        let suggestion = format!(
            "Check if '{}' exists and is readable. The nightly claims export is expected to be dropped there.",
            path.display()
        );
        Self::FileNotFound { path, suggestion }
    }

    /// Create a schema error listing every required column absent from the header
    pub fn schema_missing_columns(missing: Vec<String>, file: Option<PathBuf>) -> Self {
        let message = if missing.len() == 1 {
            format!("Required column '{}' is missing", missing[0])
        } else {
            format!(
                "{} required columns are missing: {}",
                missing.len(),
                missing.join(", ")
            )
        };

        let column_name = match missing.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };

        Self::SchemaMismatch {
            message,
            missing_columns: missing,
            context: ErrorContext {
                file_path: file,
                line_number: Some(1),
                column_name,
            },
        }
    }

    /// Attach the offending file to an I/O or CSV error
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        match &mut self {
            Self::Io { context, .. }
            | Self::CsvParse { context, .. }
            | Self::SchemaMismatch { context, .. } => {
                context.file_path = Some(path.into());
            }
            _ => {}
        }
        self
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound { suggestion, .. } => {
                format!("{}\n\nSuggestion: {}", self, suggestion)
            }
            Self::SchemaMismatch { missing_columns, .. } => {
                format!(
                    "{}\n\nThe export header must contain: {}",
                    self,
                    missing_columns.join(", ")
                )
            }
            Self::NoInputFile { .. } => {
                format!("{}\n\nSuggestion: nothing to do until the next export arrives", self)
            }
            Self::Configuration { suggestion: Some(sug), .. }
            | Self::Export { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for PrcError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            context: ErrorContext::default(),
        }
    }
}

impl From<csv::Error> for PrcError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);

        Self::CsvParse {
            message: err.to_string(),
            line,
            context: ErrorContext {
                line_number: line,
                ..Default::default()
            },
        }
    }
}

impl From<toml::de::Error> for PrcError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Failed to parse config file: {}", err),
            suggestion: Some("Check that the file is valid TOML format".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_columns() {
        let err = PrcError::schema_missing_columns(
            vec!["CPT Codes".to_string(), "MRN".to_string()],
            None,
        );
        let msg = err.to_string();
        assert!(msg.contains("CPT Codes"));
        assert!(msg.contains("MRN"));
        assert!(err.user_message().contains("must contain"));
    }

    #[test]
    fn test_with_file_sets_context() {
        let err = PrcError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            .with_file("/tmp/input.csv");
        match err {
            PrcError::Io { context, .. } => {
                assert_eq!(context.file_path, Some(PathBuf::from("/tmp/input.csv")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
