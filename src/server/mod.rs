//! HTTP API server.
//!
//! All state lives behind a single [`tokio::sync::Mutex`]: each handler
//! locks, does its work, and releases, so every request observes and
//! produces a consistent store. Uploaded photo bytes are served statically
//! from the uploads directory; only filenames go through the store.

mod inventory;
mod people;
mod tasks;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::Error;
use crate::storage::Storage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The in-memory store (wrapped in a Mutex for thread safety)
    pub storage: Arc<Mutex<Storage>>,
    /// Directory photo files are written to and served from
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(storage: Storage, uploads_dir: PathBuf) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            uploads_dir,
        }
    }
}

/// An [`Error`] carried to the HTTP boundary.
///
/// The conversion to a response is the single place where the error
/// taxonomy maps onto status codes.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::SheetExists(_) => StatusCode::CONFLICT,
            Error::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Insufficient-stock responses carry the available quantity so the
        // client can show it without a second request
        let body = match &self.0 {
            Error::InsufficientStock { available, .. } => serde_json::json!({
                "message": "Insufficient stock",
                "availableQuantity": available,
            }),
            err => serde_json::json!({ "message": err.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Users
        .route("/api/users", get(people::list_users).post(people::create_user))
        .route("/api/users/{id}", get(people::get_user))
        // Tasks and their attachments
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/service-sheet", get(tasks::task_service_sheet))
        .route("/api/tasks/{id}/notes", get(tasks::task_notes))
        .route("/api/tasks/{id}/photos", get(tasks::task_photos))
        .route("/api/tasks/{id}/products", get(inventory::task_usage))
        .route("/api/service-sheets", post(tasks::create_service_sheet))
        .route("/api/service-sheets/{id}", patch(tasks::update_service_sheet))
        .route("/api/notes", post(tasks::create_note))
        .route("/api/notes/{id}", delete(tasks::delete_note))
        .route("/api/photos", post(tasks::create_photo))
        .route("/api/photos/{id}", delete(tasks::delete_photo))
        // Inventory
        .route(
            "/api/products",
            get(inventory::list_products).post(inventory::create_product),
        )
        .route(
            "/api/products/{id}",
            get(inventory::get_product)
                .patch(inventory::update_product)
                .delete(inventory::delete_product),
        )
        .route("/api/product-usage", post(inventory::record_usage))
        .route(
            "/api/product-usage/{id}",
            patch(inventory::adjust_usage).delete(inventory::release_usage),
        )
        // Timesheets
        .route(
            "/api/timesheets",
            get(people::list_timesheets).post(people::create_timesheet),
        )
        .route(
            "/api/timesheets/{id}",
            patch(people::update_timesheet).delete(people::delete_timesheet),
        )
        // Clients
        .route(
            "/api/clients",
            get(people::list_clients).post(people::create_client),
        )
        .route(
            "/api/clients/{id}",
            get(people::get_client)
                .patch(people::update_client)
                .delete(people::delete_client),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(people::dashboard_stats))
        // Photo bytes are served straight off disk
        .nest_service("/uploads", ServeDir::new(state.uploads_dir.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and run the server until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> crate::Result<()> {
    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|e| Error::InvalidInput(format!("Invalid host address '{}': {}", host, e)))?;
    let addr = SocketAddr::from((host_addr, port));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("fieldtrack API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Liveness probe with build information.
async fn health(State(_state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "buildTimestamp": env!("FT_BUILD_TIMESTAMP"),
        "gitCommit": env!("FT_GIT_COMMIT"),
    }))
}
