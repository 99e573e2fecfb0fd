//! Field validators shared by CSV import and cell editing.
//!
//! # Import rules
//!
//! | Field   | Rule                                          |
//! |---------|-----------------------------------------------|
//! | `name`  | non-blank after trim                          |
//! | `email` | `local@domain.tld`, no whitespace             |
//! | `age`   | leading integer in `[0, 150]`                 |
//! | `role`  | non-blank after trim                          |
//!
//! # Cell edits
//!
//! [`coerce_cell`] turns raw text typed into a cell into a [`CellValue`]
//! according to the column type, or rejects it with a [`CellError`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CellError, CellResult};
use crate::models::{CellValue, Column, ColumnKind};

/// Lowest accepted age.
pub const MIN_AGE: i64 = 0;

/// Highest accepted age.
pub const MAX_AGE: i64 = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// True when `value` looks like `local@domain.tld`.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Non-blank after trimming.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Read the integer at the start of `value`.
///
/// Leading whitespace and one sign are allowed; parsing stops at the first
/// non-digit, so `"42 years"` is 42 and `"3.7"` is 3. `None` when no digit
/// follows.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // saturate rather than overflow: anything this large is out of range anyway
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse an age cell, `None` when missing or out of `[MIN_AGE, MAX_AGE]`.
pub fn parse_age(value: &str) -> Option<i64> {
    parse_leading_int(value).filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
}

/// Convert raw cell input according to the column type.
pub fn coerce_cell(column: &Column, raw: &str) -> CellResult<CellValue> {
    match column.kind {
        ColumnKind::Number => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(CellError::InvalidNumber);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(CellValue::Number)
                .ok_or(CellError::InvalidNumber)
        }
        ColumnKind::Email => {
            if is_valid_email(raw) {
                Ok(CellValue::Text(raw.to_string()))
            } else {
                Err(CellError::InvalidEmail)
            }
        }
        ColumnKind::String => Ok(CellValue::Text(raw.to_string())),
    }
}

/// Like [`coerce_cell`], but blank input is rejected for every type.
///
/// Used for new-row forms, where each editable field is required.
pub fn coerce_required(column: &Column, raw: &str) -> CellResult<CellValue> {
    if !is_present(raw) {
        return Err(CellError::Required);
    }
    coerce_cell(column, raw)
}
