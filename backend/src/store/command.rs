//! Store commands as data.
//!
//! Every mutation a client may request, in serialisable form:
//!
//! ```json
//! { "type": "setSorting", "field": "age", "direction": "desc" }
//! { "type": "updateColumn", "id": "email", "updates": { "visible": false } }
//! { "type": "addColumn", "label": "Start Date", "columnType": "string" }
//! ```
//!
//! `type` is the command tag, so `addColumn` carries the column type as
//! `columnType`.

use serde::{Deserialize, Serialize};

use super::TableStore;
use crate::models::{next_row_id, ColumnKind, ColumnPatch, Fields, Row, SortDirection, Theme};

/// One store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    SetAllRows {
        rows: Vec<Row>,
    },
    /// Append a row; an identifier is generated when none is given.
    AddRow {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        fields: Fields,
    },
    UpdateRow {
        id: String,
        fields: Fields,
    },
    DeleteRow {
        id: String,
    },
    AddColumn {
        label: String,
        #[serde(default, rename = "columnType")]
        kind: ColumnKind,
    },
    UpdateColumn {
        id: String,
        updates: ColumnPatch,
    },
    /// Column identifiers in their new display order.
    ReorderColumns {
        ids: Vec<String>,
    },
    SetSearchTerm {
        term: String,
    },
    SetSorting {
        field: String,
        direction: SortDirection,
    },
    ToggleSort {
        field: String,
    },
    SetPage {
        page: usize,
    },
    #[serde(rename_all = "camelCase")]
    SetRowsPerPage {
        rows_per_page: usize,
    },
    ToggleEditing {
        id: String,
    },
    ClearEditing,
    SetTheme {
        theme: Theme,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetAllRows { .. } => "setAllRows",
            Command::AddRow { .. } => "addRow",
            Command::UpdateRow { .. } => "updateRow",
            Command::DeleteRow { .. } => "deleteRow",
            Command::AddColumn { .. } => "addColumn",
            Command::UpdateColumn { .. } => "updateColumn",
            Command::ReorderColumns { .. } => "reorderColumns",
            Command::SetSearchTerm { .. } => "setSearchTerm",
            Command::SetSorting { .. } => "setSorting",
            Command::ToggleSort { .. } => "toggleSort",
            Command::SetPage { .. } => "setPage",
            Command::SetRowsPerPage { .. } => "setRowsPerPage",
            Command::ToggleEditing { .. } => "toggleEditing",
            Command::ClearEditing => "clearEditing",
            Command::SetTheme { .. } => "setTheme",
        }
    }
}

impl TableStore {
    /// Dispatch a command to the matching store method.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetAllRows { rows } => self.set_all_rows(rows),
            Command::AddRow { id, fields } => {
                let mut row = Row::new(id.unwrap_or_else(next_row_id));
                row.merge(fields);
                self.add_row(row);
            }
            Command::UpdateRow { id, fields } => self.update_row(&id, fields),
            Command::DeleteRow { id } => self.delete_row(&id),
            Command::AddColumn { label, kind } => self.add_column(&label, kind),
            Command::UpdateColumn { id, updates } => self.update_column(&id, updates),
            Command::ReorderColumns { ids } => self.reorder_columns(&ids),
            Command::SetSearchTerm { term } => self.set_search_term(term),
            Command::SetSorting { field, direction } => self.set_sorting(field, direction),
            Command::ToggleSort { field } => self.toggle_sort(&field),
            Command::SetPage { page } => self.set_page(page),
            Command::SetRowsPerPage { rows_per_page } => self.set_rows_per_page(rows_per_page),
            Command::ToggleEditing { id } => self.toggle_editing(&id),
            Command::ClearEditing => self.clear_editing(),
            Command::SetTheme { theme } => self.set_theme(theme),
        }
    }
}
