//! HTTP server exposing the store's command/query surface.
//!
//! # API Endpoints
//!
//! | Method | Path               | Description                          |
//! |--------|--------------------|--------------------------------------|
//! | GET    | `/health`          | Health check                         |
//! | GET    | `/api/state`       | Full state snapshot                  |
//! | GET    | `/api/view`        | Current page of the derived view     |
//! | POST   | `/api/commands`    | Apply one store command              |
//! | POST   | `/api/cells`       | Validated single-cell edit           |
//! | POST   | `/api/rows`        | Validated new row from form input    |
//! | POST   | `/api/import`      | Upload CSV (multipart field `file`)  |
//! | GET    | `/api/export`      | Download visible columns as CSV      |
//! | GET    | `/api/logs`        | SSE stream for real-time logs        |
//! | GET    | `/api/logs/recent` | Recent log entries                   |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_warning, LogEntry, LOG_BROADCASTER};
use super::types::{
    error_response, form_errors_response, CellEdit, ImportResponse, RowCreated, RowForm,
    ViewResponse,
};
use crate::config::{AppConfig, CSV_MIME_TYPE, MAX_IMPORT_SIZE};
use crate::error::{ServerError, ServerResult};
use crate::import::{import_bytes, ImportResult};
use crate::store::{Command, TableSnapshot, TableStore};

/// Store shared by all handlers.
pub type SharedStore = Arc<RwLock<TableStore>>;

type ApiError = (StatusCode, Json<Value>);

/// Request body cap: the import limit plus room for multipart framing.
/// A file slightly over the import limit still reaches the size check.
pub const MAX_BODY_SIZE: usize = MAX_IMPORT_SIZE + 64 * 1024;

/// Initial store for a server session.
pub fn initial_store(config: &AppConfig) -> TableStore {
    let mut store = if config.seed {
        TableStore::new()
    } else {
        TableStore::empty()
    };
    store.set_rows_per_page(config.rows_per_page);
    store
}

/// Build the router around a store.
pub fn router(store: SharedStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/view", get(get_view))
        .route("/api/commands", post(apply_command))
        .route("/api/cells", post(edit_cell))
        .route("/api/rows", post(add_row))
        .route("/api/import", post(upload_csv))
        .route("/api/export", get(export_csv))
        .route("/api/logs", get(sse_logs))
        .route("/api/logs/recent", get(recent_logs))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors)
        .with_state(store)
}

/// Start the HTTP server
pub async fn start_server(config: &AppConfig) -> ServerResult<()> {
    let store: SharedStore = Arc::new(RwLock::new(initial_store(config)));
    let app = router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("Tablekit server running on http://localhost:{}", config.port);
    println!("   GET  /api/state    - State snapshot");
    println!("   GET  /api/view     - Current page");
    println!("   POST /api/commands - Apply a command");
    println!("   POST /api/rows     - Add a validated row");
    println!("   POST /api/import   - Upload CSV file");
    println!("   GET  /api/export   - Download CSV");
    println!("   GET  /api/logs     - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(ServerError::Io)?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tablekit",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_state(State(store): State<SharedStore>) -> Json<TableSnapshot> {
    Json(store.read().await.snapshot())
}

async fn get_view(State(store): State<SharedStore>) -> Json<ViewResponse> {
    let store = store.read().await;
    Json(ViewResponse {
        columns: store.visible_columns().into_iter().cloned().collect(),
        page: store.view(),
    })
}

async fn apply_command(
    State(store): State<SharedStore>,
    Json(command): Json<Command>,
) -> Json<TableSnapshot> {
    log_info(format!("Command: {}", command.name()));
    let mut store = store.write().await;
    store.apply(command);
    Json(store.snapshot())
}

async fn edit_cell(
    State(store): State<SharedStore>,
    Json(edit): Json<CellEdit>,
) -> Result<Json<TableSnapshot>, ApiError> {
    let mut store = store.write().await;
    store
        .edit_cell(&edit.row_id, &edit.column_id, &edit.value)
        .map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(error_response(&e.to_string())),
            )
        })?;
    Ok(Json(store.snapshot()))
}

async fn add_row(
    State(store): State<SharedStore>,
    Json(form): Json<RowForm>,
) -> Result<Json<RowCreated>, ApiError> {
    let mut store = store.write().await;
    match store.submit_row(&form.values) {
        Ok(id) => {
            log_info(format!("Row added: {}", id));
            Ok(Json(RowCreated { id }))
        }
        Err(errors) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(form_errors_response(&errors)),
        )),
    }
}

/// Upload CSV endpoint
async fn upload_csv(
    State(store): State<SharedStore>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(ServerError::BadRequest(format!("Multipart error: {}", e)))
    })? {
        if field.name() == Some("file") {
            match field.bytes().await {
                Ok(bytes) => file_data = Some(bytes.to_vec()),
                Err(e) => {
                    // oversized or truncated upload: report it like any unreadable file
                    log_warning(format!("Upload read error: {}", e));
                    let result = ImportResult::parse_failure();
                    return Ok(Json(ImportResponse::new(&result, false)));
                }
            }
        }
    }

    let bytes = file_data
        .ok_or_else(|| bad_request(ServerError::BadRequest("No file provided".into())))?;

    let result = tokio::task::spawn_blocking(move || import_bytes(&bytes))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&format!("Import task failed: {}", e))),
            )
        })?;
    let applied = result.apply_to(&mut *store.write().await);
    if !applied {
        log_warning("Import not applied: fix the reported errors and upload again");
    }

    Ok(Json(ImportResponse::new(&result, applied)))
}

async fn export_csv(State(store): State<SharedStore>) -> impl IntoResponse {
    let file = store.read().await.export_file();
    log_info(format!("Export: {}", file.filename));
    (
        [
            (header::CONTENT_TYPE, CSV_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.content,
    )
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn recent_logs() -> Json<Vec<LogEntry>> {
    Json(LOG_BROADCASTER.recent())
}

fn bad_request(err: ServerError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(&err.to_string())))
}
