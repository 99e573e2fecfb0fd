//! # Tablekit - in-memory table data engine
//!
//! Tablekit holds a row set and a column schema, derives a filtered,
//! sorted and paginated view for display, supports validated cell edits,
//! and round-trips data through CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV Import │────▶│ TableStore  │────▶│  View page  │
//! │ (validated) │     │ (commands)  │     │ (derived)   │
//! └─────────────┘     └──────┬──────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │  CSV Export │
//!                     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tablekit::{import_file, TableStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut store = TableStore::empty();
//!     let result = import_file("people.csv".as_ref()).await;
//!     result.apply_to(&mut store);
//!     store.set_search_term("dev");
//!     println!("{} matching rows", store.view().total);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Constants and environment configuration
//! - [`models`] - Rows, columns, cell values, import errors
//! - [`store`] - State container and command set
//! - [`view`] - Search / sort / paginate pipeline
//! - [`parser`] - CSV decoding and reading
//! - [`validation`] - Field validators
//! - [`import`] - CSV import with per-field errors
//! - [`export`] - CSV export
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// State
pub mod store;
pub mod view;

// CSV
pub mod export;
pub mod import;
pub mod parser;
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CellError, CellResult, CsvError, CsvResult, ServerError, ServerResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    default_columns, next_row_id, sample_rows, slugify, CellValue, Column, ColumnKind,
    ColumnPatch, Fields, ImportError, Row, SortDirection, Theme,
};

// =============================================================================
// Re-exports - Store & View
// =============================================================================

pub use store::{Command, FormErrors, TableSnapshot, TableStore};
pub use view::{derive_view, visible_columns, ViewPage, ViewState};

// =============================================================================
// Re-exports - CSV
// =============================================================================

pub use export::{export_csv, export_filename, suggested_filename, ExportFile};
pub use import::{import_bytes, import_file, import_reader, import_str, ImportResult};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
