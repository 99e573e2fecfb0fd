//! Generic CSV reader with encoding auto-detection.
//!
//! Produces header-aligned string records. No table semantics here:
//! header normalisation and field validation live in [`crate::import`].

use std::borrow::Cow;

use crate::error::CsvResult;

/// Result of parsing with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    /// Column headers, as written in the file
    pub headers: Vec<String>,
    /// Data records, blank lines removed. Records may be shorter or longer
    /// than `headers`.
    pub records: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
}

impl ParsedTable {
    /// Iterate `(header, value)` pairs of one record.
    ///
    /// Cells past the end of a short record are absent; extra cells are dropped.
    pub fn pairs<'a>(&'a self, record: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content<'a>(bytes: &'a [u8], encoding: &str) -> Cow<'a, str> {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0,
        // UTF-8 and anything unrecognised: lossy UTF-8
        _ => String::from_utf8_lossy(bytes),
    }
}

/// Parse comma-delimited text whose first line is the header.
///
/// Standard CSV quoting is honoured. Blank lines are skipped.
pub fn parse_table(content: &str) -> CsvResult<ParsedTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if is_blank_record(&record) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(ParsedTable {
        headers,
        records,
        encoding: "utf-8".to_string(),
    })
}

/// Decode and parse raw bytes.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<ParsedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let mut table = parse_table(&content)?;
    table.encoding = encoding;
    Ok(table)
}

fn is_blank_record(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}
