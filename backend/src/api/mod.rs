//! HTTP API layer.
//!
//! - [`server`] - Axum router and handlers
//! - [`types`] - Request/response payloads
//! - [`logs`] - Log broadcaster and SSE stream

pub mod logs;
pub mod server;
pub mod types;
