//! Fieldtrack - a field-service management backend.
//!
//! This library provides the core functionality for the `ft` server binary:
//! task scheduling, technician assignments, service sheets, inventory
//! tracking, and timesheet accounting, all backed by an in-memory store.

pub mod cli;
pub mod models;
pub mod seed;
pub mod server;
pub mod storage;

/// Library-level error type for fieldtrack operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A service sheet already exists for task {0}")]
    SheetExists(i64),

    #[error("Insufficient stock for product {product_id}: {available} available")]
    InsufficientStock { product_id: i64, available: i64 },
}

impl Error {
    /// Shorthand for a typed not-found error.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }
}

/// Result type alias for fieldtrack operations.
pub type Result<T> = std::result::Result<T, Error>;
