//! CSV import: parse, validate, and collect per-field errors.
//!
//! # Flow
//!
//! ```text
//! bytes/file ──▶ decode ──▶ parse_table ──▶ validate each record ──▶ ImportResult
//!                   │            │
//!                   └── failure ─┴──▶ { rows: [], errors: [row 0, "file"] }
//! ```
//!
//! A record is accepted only when all four required fields are valid.
//! Rejected records contribute their errors and nothing else. Import never
//! returns `Err`: every outcome, including unreadable input, is an
//! [`ImportResult`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::{MAX_IMPORT_SIZE, MAX_REPORTED_ERRORS};
use crate::error::{CsvError, CsvResult};
use crate::models::{next_row_id, CellValue, ImportError, Row};
use crate::parser::{parse_bytes, parse_table, ParsedTable};
use crate::store::TableStore;
use crate::validation::{is_present, is_valid_email, parse_age};

/// Field name used for file-level failures.
pub const FILE_FIELD: &str = "file";

/// Message of the synthetic file-level error.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse CSV file";

/// Accepted rows plus every validation error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub rows: Vec<Row>,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    /// Empty rows and one row-0 `file` error.
    pub fn parse_failure() -> Self {
        Self {
            rows: Vec::new(),
            errors: vec![ImportError::new(0, FILE_FIELD, PARSE_FAILURE_MESSAGE)],
        }
    }

    /// True when no error was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Replace the store's rows with the accepted ones, if the import is clean.
    ///
    /// Returns whether the store was changed.
    pub fn apply_to(&self, store: &mut TableStore) -> bool {
        if !self.is_clean() {
            return false;
        }
        store.set_all_rows(self.rows.clone());
        true
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Import already-decoded CSV text.
pub fn import_str(content: &str) -> ImportResult {
    finish(parse_table(content))
}

/// Import raw bytes, detecting the text encoding.
pub fn import_bytes(bytes: &[u8]) -> ImportResult {
    log_info(format!("Reading CSV ({} bytes)...", bytes.len()));
    if bytes.len() > MAX_IMPORT_SIZE {
        return finish(Err(CsvError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMPORT_SIZE,
        }));
    }
    finish(parse_bytes(bytes))
}

/// Import a file from disk.
pub async fn import_file(path: &Path) -> ImportResult {
    log_info(format!("Importing {}", path.display()));
    match tokio::fs::read(path).await {
        Ok(bytes) => import_bytes(&bytes),
        Err(e) => finish(Err(e.into())),
    }
}

/// Import from any async stream (upload body, pipe, ...).
pub async fn import_reader<R: AsyncRead + Unpin>(reader: R) -> ImportResult {
    match read_limited(reader).await {
        Ok(bytes) => import_bytes(&bytes),
        Err(e) => finish(Err(e)),
    }
}

async fn read_limited<R: AsyncRead + Unpin>(reader: R) -> CsvResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let limit = MAX_IMPORT_SIZE as u64 + 1;
    reader.take(limit).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

fn finish(parsed: CsvResult<ParsedTable>) -> ImportResult {
    match parsed {
        Ok(table) => {
            log_success(format!(
                "Read {} rows ({}), columns: {}",
                table.records.len(),
                table.encoding,
                table.headers.join(", ")
            ));
            let result = validate_table(&table);
            report(&result);
            result
        }
        Err(e) => {
            log_error(format!("{}: {}", PARSE_FAILURE_MESSAGE, e));
            ImportResult::parse_failure()
        }
    }
}

fn report(result: &ImportResult) {
    if result.is_clean() {
        log_success(format!("All {} rows valid", result.rows.len()));
        return;
    }
    log_warning(format!(
        "{} rows accepted, {} errors",
        result.rows.len(),
        result.errors.len()
    ));
    for err in result.errors.iter().take(MAX_REPORTED_ERRORS) {
        log_error(err.to_string());
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate every record of a parsed table.
///
/// Row numbers are `index + 2`: the header is row 1.
pub fn validate_table(table: &ParsedTable) -> ImportResult {
    let mut result = ImportResult::default();

    for (index, record) in table.records.iter().enumerate() {
        let row_number = index + 2;
        match validate_record(table, record, row_number) {
            Ok(row) => result.rows.push(row),
            Err(errors) => result.errors.extend(errors),
        }
    }

    result
}

/// Build one row, or return every error it produced.
fn validate_record(
    table: &ParsedTable,
    record: &[String],
    row_number: usize,
) -> Result<Row, Vec<ImportError>> {
    let mut row = Row::new(next_row_id())
        .with("name", "")
        .with("email", "")
        .with("age", 0i64)
        .with("role", "");

    let (mut name, mut email, mut age, mut role) = ("", "", "", "");
    for (header, value) in table.pairs(record) {
        let key = header.trim().to_lowercase();
        match key.as_str() {
            "name" => name = value,
            "email" => email = value,
            "age" => age = value,
            "role" => role = value,
            _ => row.set(key, value),
        }
    }

    let mut errors = Vec::new();

    if is_present(name) {
        row.set("name", name.trim());
    } else {
        errors.push(ImportError::new(row_number, "name", "Name is required"));
    }

    if is_valid_email(email) {
        row.set("email", email.trim());
    } else {
        errors.push(ImportError::new(row_number, "email", "Valid email is required"));
    }

    match parse_age(age) {
        Some(age) => row.set("age", CellValue::from(age)),
        None => errors.push(ImportError::new(
            row_number,
            "age",
            "Age must be a number between 0 and 150",
        )),
    }

    if is_present(role) {
        row.set("role", role.trim());
    } else {
        errors.push(ImportError::new(row_number, "role", "Role is required"));
    }

    if errors.is_empty() {
        Ok(row)
    } else {
        Err(errors)
    }
}

// =============================================================================
// Tests
// =============================================================================
