//! REST API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::import::ImportResult;
use crate::models::{Column, ImportError};
use crate::store::FormErrors;
use crate::view::ViewPage;

/// Response sent after a CSV upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" when rows were applied, "invalid" when errors blocked them
    pub status: &'static str,

    /// Number of accepted rows
    pub accepted: usize,

    /// Whether the store now holds the imported rows
    pub applied: bool,

    pub errors: Vec<ImportError>,
}

impl ImportResponse {
    pub fn new(result: &ImportResult, applied: bool) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: if applied { "ready" } else { "invalid" },
            accepted: result.rows.len(),
            applied,
            errors: result.errors.clone(),
        }
    }
}

/// Current page plus the columns needed to render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub columns: Vec<Column>,
    #[serde(flatten)]
    pub page: ViewPage,
}

/// Body of `POST /api/cells`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub row_id: String,
    pub column_id: String,
    pub value: String,
}

/// Body of `POST /api/rows`: raw input keyed by column field.
#[derive(Debug, Clone, Deserialize)]
pub struct RowForm {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Response to an accepted row.
#[derive(Debug, Clone, Serialize)]
pub struct RowCreated {
    pub id: String,
}

/// 422 body for a rejected row form, one message per field.
pub fn form_errors_response(errors: &FormErrors) -> Value {
    let fields: BTreeMap<&str, String> = errors
        .iter()
        .map(|(field, err)| (field.as_str(), err.to_string()))
        .collect();
    json!({
        "status": "error",
        "error": "Row rejected",
        "fields": fields,
    })
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_response_status() {
        let clean = ImportResult::default();
        let response = ImportResponse::new(&clean, true);
        assert_eq!(response.status, "ready");
        assert!(Uuid::parse_str(&response.job_id).is_ok());

        let failed = ImportResult::parse_failure();
        let response = ImportResponse::new(&failed, false);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["errors"][0]["field"], "file");
        assert_eq!(json["errors"][0]["row"], 0);
    }

    #[test]
    fn test_cell_edit_json() {
        let body = json!({ "rowId": "1", "columnId": "age", "value": "44" });
        let edit: CellEdit = serde_json::from_value(body).unwrap();
        assert_eq!(edit.row_id, "1");
        assert_eq!(edit.value, "44");
    }

    #[test]
    fn test_form_errors_response() {
        let mut errors = FormErrors::new();
        errors.insert("age".into(), crate::error::CellError::InvalidNumber);
        errors.insert("name".into(), crate::error::CellError::Required);

        let json = form_errors_response(&errors);
        assert_eq!(json["status"], "error");
        assert_eq!(json["fields"]["age"], "Must be a valid number");
        assert_eq!(json["fields"]["name"], "This field is required");
    }
}
