//! Derived view pipeline: search → sort → paginate.
//!
//! Every query recomputes the page from the current rows, columns and
//! [`ViewState`]. Nothing is cached between calls and nothing here writes
//! to the store.
//!
//! ```text
//! rows ──▶ filter (visible columns) ──▶ stable sort ──▶ slice [page * n, +n)
//! ```

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::DEFAULT_ROWS_PER_PAGE;
use crate::models::{CellValue, Column, Row, SortDirection};

/// Search, sort, pagination and edit-mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub search_term: String,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub page: usize,
    pub rows_per_page: usize,
    pub editing_rows: Vec<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_field: None,
            sort_direction: SortDirection::Asc,
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            editing_rows: Vec::new(),
        }
    }
}

/// One page of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPage {
    /// Rows on this page, in display order.
    pub rows: Vec<Row>,
    /// Number of rows that passed the search filter.
    pub total: usize,
    pub page: usize,
    pub rows_per_page: usize,
    pub page_count: usize,
}

impl ViewPage {
    /// True when the requested page starts past the filtered rows.
    ///
    /// The pipeline never clamps; callers use this to move back.
    pub fn is_out_of_range(&self) -> bool {
        self.page > 0 && self.page.saturating_mul(self.rows_per_page) >= self.total
    }
}

// =============================================================================
// Column projection
// =============================================================================

/// Visible columns ordered by `order`, ties kept in collection order.
pub fn visible_columns(columns: &[Column]) -> Vec<&Column> {
    let mut visible: Vec<&Column> = columns.iter().filter(|c| c.visible).collect();
    visible.sort_by_key(|c| c.order);
    visible
}

// =============================================================================
// Stages
// =============================================================================

/// Keep rows where any visible column contains `term`, ignoring case.
///
/// An empty term keeps every row.
pub fn filter_rows<'a>(rows: &'a [Row], visible: &[&Column], term: &str) -> Vec<&'a Row> {
    if term.is_empty() {
        return rows.iter().collect();
    }
    let needle = term.to_lowercase();
    rows.iter()
        .filter(|row| {
            visible.iter().any(|column| {
                row.value_for(column)
                    .to_string()
                    .to_lowercase()
                    .contains(&needle)
            })
        })
        .collect()
}

/// Compare two cells: numerically when both are numbers, otherwise with
/// [`compare_text`].
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => compare_text(&a.to_string(), &b.to_string()),
    }
}

/// Dictionary order for display text.
///
/// Base letters decide first, with accents and case folded away, so
/// `Émile` sorts between `adam` and `Zoe`. Accents break remaining ties
/// (`emile` before `émile`); case alone never does.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    deunicode(&a).cmp(&deunicode(&b)).then_with(|| a.cmp(&b))
}

/// Stable sort by one field.
///
/// `columns` supplies the typed default for rows that lack the field.
pub fn sort_rows(rows: &mut [&Row], columns: &[Column], field: &str, direction: SortDirection) {
    let column = columns.iter().find(|c| c.field == field);
    let key = |row: &Row| match column {
        Some(column) => row.value_for(column),
        None => row.value(field),
    };

    rows.sort_by(|a, b| {
        let ordering = compare_values(&key(*a), &key(*b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Slice `[page * rows_per_page, +rows_per_page)`, empty when past the end.
pub fn paginate<T>(items: &[T], page: usize, rows_per_page: usize) -> &[T] {
    let start = page.saturating_mul(rows_per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(rows_per_page).min(items.len());
    &items[start..end]
}

/// Run the whole pipeline for one query.
pub fn derive_view(rows: &[Row], columns: &[Column], state: &ViewState) -> ViewPage {
    let visible = visible_columns(columns);
    let mut matched = filter_rows(rows, &visible, &state.search_term);

    if let Some(ref field) = state.sort_field {
        sort_rows(&mut matched, columns, field, state.sort_direction);
    }

    let total = matched.len();
    let page_rows = paginate(&matched, state.page, state.rows_per_page)
        .iter()
        .map(|row| (*row).clone())
        .collect();

    ViewPage {
        rows: page_rows,
        total,
        page: state.page,
        rows_per_page: state.rows_per_page,
        page_count: page_count(total, state.rows_per_page),
    }
}

/// Number of pages needed for `total` rows.
pub fn page_count(total: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        0
    } else {
        total.div_ceil(rows_per_page)
    }
}

// =============================================================================
// Tests
// =============================================================================
