//! The table state container.
//!
//! [`TableStore`] owns rows, columns and view settings and exposes them only
//! through a closed set of commands and read-only queries, so rules such as
//! "a new search goes back to page 0" cannot be bypassed.
//!
//! Commands are total: unknown row or column identifiers are silently
//! ignored. The same commands are available as data through [`Command`].

mod command;

pub use command::Command;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CellError, CellResult};
use crate::export::{export_csv, ExportFile};
use crate::models::{
    default_columns, next_row_id, sample_rows, slugify, Column, ColumnKind, ColumnPatch, Fields,
    Row, SortDirection, Theme,
};
use crate::validation::{coerce_cell, coerce_required};
use crate::view::{derive_view, visible_columns, ViewPage, ViewState};

/// Serialisable snapshot of the whole state, as consumed by a UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub data: Vec<Row>,
    pub columns: Vec<Column>,
    pub search_term: String,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub page: usize,
    pub rows_per_page: usize,
    pub editing_rows: Vec<String>,
    pub theme: Theme,
}

/// Rejections of a new-row form, keyed by column field.
pub type FormErrors = BTreeMap<String, CellError>;

/// Single source of truth for rows, columns and view settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStore {
    rows: Vec<Row>,
    columns: Vec<Column>,
    view: ViewState,
    theme: Theme,
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore {
    /// Default schema with the sample rows.
    pub fn new() -> Self {
        Self::with_rows(sample_rows())
    }

    /// Default schema and no rows.
    pub fn empty() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Default schema with the given rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            columns: default_columns(),
            view: ViewState::default(),
            theme: Theme::default(),
        }
    }

    /// Restore a store from a snapshot.
    pub fn from_snapshot(snapshot: TableSnapshot) -> Self {
        Self {
            rows: snapshot.data,
            columns: snapshot.columns,
            view: ViewState {
                search_term: snapshot.search_term,
                sort_field: snapshot.sort_field,
                sort_direction: snapshot.sort_direction,
                page: snapshot.page,
                rows_per_page: snapshot.rows_per_page,
                editing_rows: snapshot.editing_rows,
            },
            theme: snapshot.theme,
        }
    }

    // =========================================================================
    // Row commands
    // =========================================================================

    /// Replace every row (used after an import).
    pub fn set_all_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    /// Append a row.
    ///
    /// Fields of current columns the row does not carry are filled with the
    /// column type's default (empty text, or 0 for numbers).
    pub fn add_row(&mut self, mut row: Row) {
        for column in &self.columns {
            if row.get(&column.field).is_none() {
                row.set(column.field.clone(), column.kind.default_value());
            }
        }
        self.rows.push(row);
    }

    /// Merge `fields` into the row with `id`.
    pub fn update_row(&mut self, id: &str, fields: Fields) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            row.merge(fields);
        }
    }

    /// Remove the row with `id`.
    pub fn delete_row(&mut self, id: &str) {
        self.rows.retain(|r| r.id != id);
    }

    /// Add a row from raw form input, keyed by column field.
    ///
    /// Every editable column is required and converted by its type. If any
    /// field is rejected nothing is added and all rejections are returned.
    /// On success the generated row id is returned.
    pub fn submit_row(&mut self, form: &BTreeMap<String, String>) -> Result<String, FormErrors> {
        let mut row = Row::new(next_row_id());
        let mut errors = FormErrors::new();

        for column in self.columns.iter().filter(|c| c.editable) {
            let raw = form.get(&column.field).map(String::as_str).unwrap_or("");
            match coerce_required(column, raw) {
                Ok(value) => row.set(column.field.clone(), value),
                Err(e) => {
                    errors.insert(column.field.clone(), e);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        let id = row.id.clone();
        self.add_row(row);
        Ok(id)
    }

    /// Validate raw input for one cell and store it.
    ///
    /// A rejected value leaves the row unchanged.
    pub fn edit_cell(&mut self, row_id: &str, column_id: &str, raw: &str) -> CellResult<()> {
        let column = self
            .column(column_id)
            .ok_or_else(|| CellError::UnknownColumn(column_id.to_string()))?;
        if !column.editable {
            return Err(CellError::NotEditable(column_id.to_string()));
        }
        let value = coerce_cell(column, raw)?;
        let field = column.field.clone();

        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| CellError::UnknownRow(row_id.to_string()))?;
        row.set(field, value);
        Ok(())
    }

    // =========================================================================
    // Column commands
    // =========================================================================

    /// Append a column.
    ///
    /// `id` and `field` are re-derived from the label. A derived key that is
    /// already taken gets a numeric suffix (`dept`, `dept_2`, ...). `order`
    /// is the current column count. Blank labels are ignored.
    pub fn add_column(&mut self, label: &str, kind: ColumnKind) {
        if label.trim().is_empty() {
            return;
        }
        let key = self.unique_key(&slugify(label.trim()));
        let order = self.columns.len() as i64;
        self.columns.push(Column::new(&key, label.trim(), kind, order));
    }

    /// Merge a partial update into the column with `id`.
    pub fn update_column(&mut self, id: &str, patch: ColumnPatch) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.id == id) {
            patch.apply(column);
        }
    }

    /// Reorder columns to follow `ids`, then stamp `order` with the position.
    ///
    /// Unknown ids are ignored. Columns missing from `ids` keep their
    /// relative order after the listed ones.
    pub fn reorder_columns(&mut self, ids: &[String]) {
        let mut remaining = std::mem::take(&mut self.columns);
        let mut ordered = Vec::with_capacity(remaining.len());

        for id in ids {
            if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.append(&mut remaining);

        for (index, column) in ordered.iter_mut().enumerate() {
            column.order = index as i64;
        }
        self.columns = ordered;
    }

    fn unique_key(&self, base: &str) -> String {
        let taken = |key: &str| self.columns.iter().any(|c| c.id == key || c.field == key);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|key| !taken(key))
            .unwrap_or_else(|| base.to_string())
    }

    // =========================================================================
    // View commands
    // =========================================================================

    /// Set the search term and go back to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.search_term = term.into();
        self.view.page = 0;
    }

    /// Replace the sort field and direction.
    pub fn set_sorting(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.view.sort_field = Some(field.into());
        self.view.sort_direction = direction;
    }

    /// Header-click sorting: ascending first, descending on a second click.
    pub fn toggle_sort(&mut self, field: &str) {
        let direction = match (&self.view.sort_field, self.view.sort_direction) {
            (Some(current), SortDirection::Asc) if current == field => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        self.set_sorting(field, direction);
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.page = page;
    }

    /// Set the page size and go back to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.view.rows_per_page = rows_per_page;
        self.view.page = 0;
    }

    /// Flip a row in or out of edit mode.
    pub fn toggle_editing(&mut self, id: &str) {
        let editing = &mut self.view.editing_rows;
        match editing.iter().position(|r| r == id) {
            Some(pos) => {
                editing.remove(pos);
            }
            None => editing.push(id.to_string()),
        }
    }

    pub fn clear_editing(&mut self) {
        self.view.editing_rows.clear();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.view.editing_rows.iter().any(|r| r == id)
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        visible_columns(&self.columns)
    }

    /// Current page of the derived view.
    pub fn view(&self) -> ViewPage {
        derive_view(&self.rows, &self.columns, &self.view)
    }

    /// All rows as CSV, visible columns only.
    pub fn export_csv(&self) -> String {
        export_csv(&self.rows, &self.columns)
    }

    /// CSV plus suggested filename and MIME type.
    pub fn export_file(&self) -> ExportFile {
        ExportFile::today(self.export_csv())
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            data: self.rows.clone(),
            columns: self.columns.clone(),
            search_term: self.view.search_term.clone(),
            sort_field: self.view.sort_field.clone(),
            sort_direction: self.view.sort_direction,
            page: self.view.page,
            rows_per_page: self.view.rows_per_page,
            editing_rows: self.view.editing_rows.clone(),
            theme: self.theme,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn fields(pairs: &[(&str, CellValue)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn column_ids(store: &TableStore) -> Vec<String> {
        store.columns().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_add_row_fills_defaults() {
        let mut store = TableStore::empty();
        store.add_row(Row::new("n1").with("name", "Nina"));

        let row = store.row("n1").unwrap();
        assert_eq!(row.value("name"), CellValue::from("Nina"));
        assert_eq!(row.get("email"), Some(&CellValue::from("")));
        assert_eq!(row.get("age"), Some(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_update_and_delete_row() {
        let mut store = TableStore::new();
        store.update_row("2", fields(&[("role", "Lead".into()), ("age", 29i64.into())]));

        let row = store.row("2").unwrap();
        assert_eq!(row.value("role"), CellValue::from("Lead"));
        assert_eq!(row.value("age"), CellValue::Number(29.0));
        assert_eq!(row.value("name"), CellValue::from("Jane Smith"));

        store.delete_row("2");
        assert!(store.row("2").is_none());
        assert_eq!(store.rows().len(), 11);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = TableStore::new();
        let before = store.clone();

        store.update_row("missing", fields(&[("name", "X".into())]));
        store.delete_row("missing");
        store.update_column("missing", ColumnPatch::visible(false));
        assert_eq!(store, before);
    }

    #[test]
    fn test_add_column_slug_and_order() {
        let mut store = TableStore::empty();
        store.add_column("Start Date", ColumnKind::String);

        let column = store.column("start_date").unwrap();
        assert_eq!(column.field, "start_date");
        assert_eq!(column.label, "Start Date");
        assert_eq!(column.order, 4);
        assert!(column.visible && column.sortable && column.editable);
    }

    #[test]
    fn test_add_column_collision_gets_suffix() {
        let mut store = TableStore::empty();
        store.add_column("Cost  Center", ColumnKind::String);
        store.add_column("cost center", ColumnKind::Number);
        store.add_column("Name", ColumnKind::String);
        store.add_column("   ", ColumnKind::String);

        assert_eq!(
            column_ids(&store),
            vec!["name", "email", "age", "role", "cost_center", "cost_center_2", "name_2"]
        );
        assert_eq!(store.column("cost_center_2").unwrap().kind, ColumnKind::Number);
    }

    #[test]
    fn test_new_column_is_not_backfilled() {
        let mut store = TableStore::new();
        store.add_column("Dept", ColumnKind::Number);

        let row = store.row("1").unwrap();
        assert!(row.get("dept").is_none());
        let column = store.column("dept").unwrap();
        assert_eq!(row.value_for(column), CellValue::Number(0.0));

        store.add_row(Row::new("new"));
        assert_eq!(store.row("new").unwrap().get("dept"), Some(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_update_column() {
        let mut store = TableStore::new();
        store.update_column("email", ColumnPatch::visible(false));
        assert!(!store.column("email").unwrap().visible);

        let visible: Vec<&str> = store.visible_columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["name", "age", "role"]);
    }

    #[test]
    fn test_reorder_columns_restamps_order() {
        let mut store = TableStore::new();
        let ids: Vec<String> = ["role", "name", "age", "email"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        store.reorder_columns(&ids);

        assert_eq!(column_ids(&store), ids);
        let orders: Vec<i64> = store.columns().iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reorder_columns_partial_list() {
        let mut store = TableStore::new();
        store.reorder_columns(&["age".to_string(), "ghost".to_string()]);
        assert_eq!(column_ids(&store), vec!["age", "name", "email", "role"]);
    }

    #[test]
    fn test_search_and_page_size_reset_page() {
        let mut store = TableStore::new();
        store.set_page(3);
        store.set_search_term("dev");
        assert_eq!(store.view_state().page, 0);

        store.set_page(2);
        store.set_sorting("age", SortDirection::Desc);
        assert_eq!(store.view_state().page, 2);

        store.set_rows_per_page(5);
        assert_eq!(store.view_state().page, 0);
        assert_eq!(store.view_state().rows_per_page, 5);
    }

    #[test]
    fn test_toggle_sort() {
        let mut store = TableStore::new();
        store.toggle_sort("name");
        assert_eq!(store.view_state().sort_direction, SortDirection::Asc);
        store.toggle_sort("name");
        assert_eq!(store.view_state().sort_direction, SortDirection::Desc);
        store.toggle_sort("name");
        assert_eq!(store.view_state().sort_direction, SortDirection::Asc);
        store.toggle_sort("age");
        assert_eq!(store.view_state().sort_field.as_deref(), Some("age"));
        assert_eq!(store.view_state().sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_toggle_editing() {
        let mut store = TableStore::new();
        store.toggle_editing("1");
        store.toggle_editing("2");
        assert!(store.is_editing("1"));
        store.toggle_editing("1");
        assert!(!store.is_editing("1"));
        assert!(store.is_editing("2"));
        store.clear_editing();
        assert!(store.view_state().editing_rows.is_empty());
    }

    #[test]
    fn test_edit_cell() {
        let mut store = TableStore::new();
        store.edit_cell("1", "age", "41").unwrap();
        assert_eq!(store.row("1").unwrap().value("age"), CellValue::Number(41.0));

        assert_eq!(store.edit_cell("1", "age", "old"), Err(CellError::InvalidNumber));
        assert_eq!(store.edit_cell("1", "email", "nope"), Err(CellError::InvalidEmail));
        assert_eq!(store.row("1").unwrap().value("age"), CellValue::Number(41.0));

        let read_only = ColumnPatch {
            editable: Some(false),
            ..Default::default()
        };
        store.update_column("role", read_only);
        assert_eq!(
            store.edit_cell("1", "role", "Boss"),
            Err(CellError::NotEditable("role".into()))
        );
        assert!(matches!(store.edit_cell("zz", "name", "x"), Err(CellError::UnknownRow(_))));
    }

    fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_submit_row() {
        let mut store = TableStore::empty();
        store.add_column("Team", ColumnKind::String);

        let id = store
            .submit_row(&form(&[
                ("name", "Ines"),
                ("email", "ines@example.com"),
                ("age", "38"),
                ("role", "Engineer"),
                ("team", "Core"),
            ]))
            .unwrap();

        let row = store.row(&id).unwrap();
        assert_eq!(row.value("age"), CellValue::Number(38.0));
        assert_eq!(row.value("team"), CellValue::from("Core"));
        assert_eq!(store.rows().len(), 1);
    }

    #[test]
    fn test_submit_row_collects_every_rejection() {
        let mut store = TableStore::empty();
        let errors = store
            .submit_row(&form(&[("name", "  "), ("email", "nope"), ("age", "old")]))
            .unwrap_err();

        assert_eq!(errors.get("name"), Some(&CellError::Required));
        assert_eq!(errors.get("email"), Some(&CellError::InvalidEmail));
        assert_eq!(errors.get("age"), Some(&CellError::InvalidNumber));
        assert_eq!(errors.get("role"), Some(&CellError::Required));
        assert!(store.rows().is_empty());
    }

    #[test]
    fn test_submit_row_skips_read_only_columns() {
        let mut store = TableStore::empty();
        let read_only = ColumnPatch {
            editable: Some(false),
            ..Default::default()
        };
        store.update_column("role", read_only);

        let id = store
            .submit_row(&form(&[("name", "Ola"), ("email", "ola@x.io"), ("age", "27")]))
            .unwrap();
        assert_eq!(store.row(&id).unwrap().get("role"), Some(&CellValue::from("")));
    }

    #[test]
    fn test_view_query() {
        let mut store = TableStore::new();
        store.set_search_term("manager");
        store.set_sorting("age", SortDirection::Asc);

        let page = store.view();
        let ids: Vec<&str> = page.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "8", "3"]);
    }

    #[test]
    fn test_snapshot_shape_and_restore() {
        let mut store = TableStore::new();
        store.set_theme(Theme::Dark);
        store.toggle_editing("4");

        let snapshot = store.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "data",
            "columns",
            "searchTerm",
            "sortField",
            "sortDirection",
            "page",
            "rowsPerPage",
            "editingRows",
            "theme",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["theme"], "dark");
        assert!(json["sortField"].is_null());

        assert_eq!(TableStore::from_snapshot(snapshot), store);
    }
}
