//! Domain models for the table engine.
//!
//! This module contains the core data structures shared by every component:
//!
//! - [`CellValue`] - A cell: text or number
//! - [`Row`] - Identifier plus a field → value mapping
//! - [`Column`] - Schema entry (label, field key, flags, type, order)
//! - [`ColumnPatch`] - Partial column update
//! - [`ImportError`] - Per-row/per-field import diagnostic
//! - [`SortDirection`] / [`Theme`] - View settings

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Cell Values
// =============================================================================

/// Value held by a row for one field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value (ages, counts, ...).
    Number(f64),
    /// Any other value.
    Text(String),
}

impl CellValue {
    /// Empty text.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

/// Default stringification: integral numbers print without a fraction.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Field → value mapping of a row.
pub type Fields = BTreeMap<String, CellValue>;

/// One record of the table.
///
/// The identifier is fixed at creation; every other value lives in
/// `fields` and is reached by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Row {
    /// Create a row with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set one field. The `id` key is reserved and ignored.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        let field = field.into();
        if field != "id" {
            self.fields.insert(field, value.into());
        }
    }

    /// Raw lookup; `None` when the row never received this field.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Lookup with an empty-text default for absent fields.
    pub fn value(&self, field: &str) -> CellValue {
        self.get(field).cloned().unwrap_or_default()
    }

    /// Lookup through a column, defaulting by the column's type.
    pub fn value_for(&self, column: &Column) -> CellValue {
        self.get(&column.field)
            .cloned()
            .unwrap_or_else(|| column.kind.default_value())
    }

    /// Merge a partial update into this row.
    pub fn merge(&mut self, patch: Fields) {
        for (field, value) in patch {
            self.set(field, value);
        }
    }
}

static ROW_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh row identifier: `<unix-millis>-<sequence>`.
///
/// The sequence is process-wide, so identifiers never repeat within a
/// session even when many are generated in the same millisecond.
pub fn next_row_id() -> String {
    let seq = ROW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), seq)
}

// =============================================================================
// Columns
// =============================================================================

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    String,
    Number,
    Email,
}

impl ColumnKind {
    /// Value used for a field the row does not carry.
    pub fn default_value(self) -> CellValue {
        match self {
            ColumnKind::Number => CellValue::Number(0.0),
            ColumnKind::String | ColumnKind::Email => CellValue::empty(),
        }
    }
}

/// Schema entry describing one field of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
    pub field: String,
    pub visible: bool,
    pub sortable: bool,
    pub editable: bool,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub order: i64,
}

impl Column {
    /// Visible, sortable, editable column whose id and field are `key`.
    pub fn new(key: &str, label: &str, kind: ColumnKind, order: i64) -> Self {
        Self {
            id: key.to_string(),
            label: label.to_string(),
            field: key.to_string(),
            visible: true,
            sortable: true,
            editable: true,
            kind,
            order,
        }
    }
}

/// Lower-case a label and collapse whitespace runs into `_`.
///
/// ```
/// assert_eq!(tablekit::models::slugify("Start  Date"), "start_date");
/// ```
pub fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_space = false;
    for c in label.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Partial column update. `id` and `field` cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ColumnKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl ColumnPatch {
    /// Patch that only changes visibility.
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    /// Apply the set fields to `column`.
    pub fn apply(self, column: &mut Column) {
        if let Some(label) = self.label {
            column.label = label;
        }
        if let Some(visible) = self.visible {
            column.visible = visible;
        }
        if let Some(sortable) = self.sortable {
            column.sortable = sortable;
        }
        if let Some(editable) = self.editable {
            column.editable = editable;
        }
        if let Some(kind) = self.kind {
            column.kind = kind;
        }
        if let Some(order) = self.order {
            column.order = order;
        }
    }
}

// =============================================================================
// View Settings
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Colour scheme carried in the snapshot for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// =============================================================================
// Import Diagnostics
// =============================================================================

/// A validation failure tied to a source row and field.
///
/// `row` is 1-based and counts the header line, so the first data line is
/// row 2. Row 0 is reserved for file-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl ImportError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}, field '{}': {}", self.row, self.field, self.message)
    }
}

// =============================================================================
// Seed Data
// =============================================================================

/// The built-in schema: Name, Email, Age, Role.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name", ColumnKind::String, 0),
        Column::new("email", "Email", ColumnKind::Email, 1),
        Column::new("age", "Age", ColumnKind::Number, 2),
        Column::new("role", "Role", ColumnKind::String, 3),
    ]
}

/// Sample people used to start a session.
pub fn sample_rows() -> Vec<Row> {
    const PEOPLE: [(&str, &str, &str, i64, &str); 12] = [
        ("1", "John Doe", "john@example.com", 30, "Developer"),
        ("2", "Jane Smith", "jane@example.com", 28, "Designer"),
        ("3", "Bob Johnson", "bob@example.com", 35, "Manager"),
        ("4", "Alice Brown", "alice@example.com", 32, "Developer"),
        ("5", "Charlie Wilson", "charlie@example.com", 29, "Analyst"),
        ("6", "Diana Davis", "diana@example.com", 31, "Designer"),
        ("7", "Edward Miller", "edward@example.com", 33, "Developer"),
        ("8", "Fiona Garcia", "fiona@example.com", 27, "Manager"),
        ("9", "George Martinez", "george@example.com", 34, "Analyst"),
        ("10", "Helen Rodriguez", "helen@example.com", 26, "Designer"),
        ("11", "Ian Lopez", "ian@example.com", 36, "Developer"),
        ("12", "Julia Hernandez", "julia@example.com", 25, "Manager"),
    ];

    PEOPLE
        .iter()
        .map(|(id, name, email, age, role)| {
            Row::new(*id)
                .with("name", *name)
                .with("email", *email)
                .with("age", *age)
                .with("role", *role)
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::from(30i64).to_string(), "30");
        assert_eq!(CellValue::from(1.5).to_string(), "1.5");
        assert_eq!(CellValue::from(-0.0).to_string(), "0");
        assert_eq!(CellValue::from("Dev").to_string(), "Dev");
    }

    #[test]
    fn test_row_json_shape() {
        let row = Row::new("1").with("name", "John").with("age", 30i64);
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value, json!({ "id": "1", "name": "John", "age": 30 }));

        let back: Row = serde_json::from_value(value).unwrap();
        assert_eq!(back.get("age"), Some(&CellValue::Number(30.0)));
    }

    #[test]
    fn test_row_id_is_immutable_through_merge() {
        let mut row = Row::new("1");
        let mut patch = Fields::new();
        patch.insert("id".into(), "99".into());
        patch.insert("name".into(), "Jane".into());
        row.merge(patch);

        assert_eq!(row.id, "1");
        assert_eq!(row.value("name"), CellValue::from("Jane"));
        assert!(row.get("id").is_none());
    }

    #[test]
    fn test_value_for_defaults_by_type() {
        let row = Row::new("1");
        let age = Column::new("age", "Age", ColumnKind::Number, 0);
        let dept = Column::new("dept", "Dept", ColumnKind::String, 1);
        assert_eq!(row.value_for(&age), CellValue::Number(0.0));
        assert_eq!(row.value_for(&dept), CellValue::empty());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Department"), "department");
        assert_eq!(slugify("Start \t Date"), "start_date");
        assert_eq!(slugify("Cost Center Code"), "cost_center_code");
    }

    #[test]
    fn test_row_ids_are_unique() {
        let a = next_row_id();
        let b = next_row_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_column_json_shape() {
        let column = Column::new("email", "Email", ColumnKind::Email, 1);
        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(value["type"], "email");
        assert_eq!(value["order"], 1);
        assert_eq!(value["field"], "email");
    }

    #[test]
    fn test_column_patch_apply() {
        let mut column = Column::new("age", "Age", ColumnKind::Number, 2);
        ColumnPatch::visible(false).apply(&mut column);
        assert!(!column.visible);
        assert_eq!(column.label, "Age");
    }

    #[test]
    fn test_sample_rows() {
        let rows = sample_rows();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].value("name"), CellValue::from("John Doe"));
        assert_eq!(rows[11].value("age"), CellValue::Number(25.0));
    }
}
