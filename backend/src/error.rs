//! Error types for the table engine.
//!
//! Store commands never fail, and import problems surface as data
//! ([`crate::models::ImportError`]), so the hierarchy here is small:
//!
//! - [`CsvError`] - Hard CSV parse failures (internal to the import pipeline)
//! - [`CellError`] - Rejected typed input for a single cell
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Hard failures while reading CSV input.
///
/// The import pipeline turns any of these into a single synthetic
/// import error; they never reach the caller of `import_*`.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file or stream.
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV record.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Input larger than the configured import limit.
    #[error("Input too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

// =============================================================================
// Cell Errors
// =============================================================================

/// Rejection of a raw input value for a typed column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    /// Value is not a number for a `number` column.
    #[error("Must be a valid number")]
    InvalidNumber,

    /// Value is not an address for an `email` column.
    #[error("Must be a valid email")]
    InvalidEmail,

    /// Blank value where one is required.
    #[error("This field is required")]
    Required,

    /// Column does not accept edits.
    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    /// No column with this identifier.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// No row with this identifier.
    #[error("Unknown row: {0}")]
    UnknownRow(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Listener or connection failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for cell edits.
pub type CellResult<T> = Result<T, CellError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: CsvError = io.into();
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_cell_error_format() {
        let err = CellError::NotEditable("email".into());
        assert!(err.to_string().contains("email"));
        assert_eq!(CellError::InvalidNumber.to_string(), "Must be a valid number");
    }

    #[test]
    fn test_too_large_format() {
        let err = CsvError::TooLarge { size: 10, limit: 5 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("5"));
    }
}
