//! Partial-update payloads for mutable entities.
//!
//! Each patch struct enumerates exactly the fields a caller may change;
//! server-managed fields (id, createdAt, uploadedAt, ...) are absent by
//! construction, so a request can never overwrite them. A field left as
//! `None` means "unchanged". Optional entity fields can be set but not
//! cleared through a patch.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{ChecklistItem, TaskPriority, TaskStatus};

/// Mutable fields of a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub progress: Option<i32>,
    pub client_id: Option<i64>,
}

/// Mutable fields of a service sheet.
///
/// The checklist is replaced wholesale when present, never deep-merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSheetPatch {
    pub service_type: Option<String>,
    pub equipment_type: Option<String>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub technician_signature: Option<String>,
    pub customer_signature: Option<String>,
    pub customer_name: Option<String>,
    pub completion_date: Option<DateTime<Utc>>,
}

/// Mutable fields of a product.
///
/// `stock_quantity` is patchable to model restocking; the inventory ledger
/// separately adjusts it on usage mutations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub category: Option<String>,
}

/// Mutable fields of a product-usage record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUsagePatch {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

/// Mutable fields of a timesheet.
///
/// Supplying `duration_minutes` suppresses derivation from start/end for
/// that update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

/// Mutable fields of a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
