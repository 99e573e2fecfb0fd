//! CSV export of the visible columns.
//!
//! Header line: visible labels in display order. One line per row after
//! it. A value is quoted only when it contains a comma or a double quote,
//! with inner quotes doubled.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::config::{CSV_MIME_TYPE, EXPORT_FILE_PREFIX};
use crate::models::{Column, Row};
use crate::view::visible_columns;

/// Serialise `rows` over the visible columns of `columns`.
pub fn export_csv(rows: &[Row], columns: &[Column]) -> String {
    let visible = visible_columns(columns);

    let header = visible
        .iter()
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let line = visible
            .iter()
            .map(|column| escape_value(&row.value_for(column).to_string()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Quote a value containing `,` or `"`.
pub fn escape_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `table-data-<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("{}-{}.csv", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Export filename for today's UTC date.
pub fn suggested_filename() -> String {
    export_filename(Utc::now().date_naive())
}

/// An export ready to hand to a download.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl ExportFile {
    pub fn new(content: String, date: NaiveDate) -> Self {
        Self {
            filename: export_filename(date),
            mime_type: CSV_MIME_TYPE,
            content,
        }
    }

    /// Named after today's UTC date.
    pub fn today(content: String) -> Self {
        Self::new(content, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_str;
    use crate::models::{default_columns, sample_rows, ColumnKind};

    #[test]
    fn test_header_and_rows() {
        let rows = sample_rows();
        let csv = export_csv(&rows[..2], &default_columns());
        assert_eq!(
            csv,
            "Name,Email,Age,Role\n\
             John Doe,john@example.com,30,Developer\n\
             Jane Smith,jane@example.com,28,Designer"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_value("Smith, Jr."), "\"Smith, Jr.\"");
        assert_eq!(escape_value("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_value("plain"), "plain");
        assert_eq!(escape_value(""), "");
    }

    #[test]
    fn test_hidden_and_reordered_columns() {
        let rows = vec![Row::new("1")
            .with("name", "Ann")
            .with("email", "ann@x.com")
            .with("age", 41i64)
            .with("role", "Ops")];
        let mut columns = default_columns();
        columns[1].visible = false;
        columns[3].order = -1;

        assert_eq!(export_csv(&rows, &columns), "Role,Name,Age\nOps,Ann,41");
    }

    #[test]
    fn test_absent_field_uses_column_default() {
        let rows = vec![Row::new("1").with("name", "Ann")];
        let columns = vec![
            Column::new("name", "Name", ColumnKind::String, 0),
            Column::new("dept", "Dept", ColumnKind::String, 1),
            Column::new("score", "Score", ColumnKind::Number, 2),
        ];
        assert_eq!(export_csv(&rows, &columns), "Name,Dept,Score\nAnn,,0");
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(export_csv(&[], &default_columns()), "Name,Email,Age,Role");
    }

    #[test]
    fn test_round_trip_required_fields() {
        let rows = vec![
            Row::new("a")
                .with("name", "Smith, Jr.")
                .with("email", "s@x.com")
                .with("age", 0i64)
                .with("role", "Lead \"A\""),
            Row::new("b")
                .with("name", "Ann")
                .with("email", "ann@x.org")
                .with("age", 150i64)
                .with("role", "Dev"),
        ];
        let csv = export_csv(&rows, &default_columns());
        let result = import_str(&csv);

        assert!(result.is_clean());
        assert_eq!(result.rows.len(), rows.len());
        for (original, imported) in rows.iter().zip(&result.rows) {
            for field in ["name", "email", "age", "role"] {
                assert_eq!(original.value(field), imported.value(field), "field {}", field);
            }
        }
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "table-data-2024-03-09.csv");

        let file = ExportFile::new("x".into(), date);
        assert_eq!(file.mime_type, "text/csv; charset=utf-8");
        assert!(suggested_filename().starts_with("table-data-"));
    }
}
