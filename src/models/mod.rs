//! Data models for fieldtrack entities.
//!
//! This module defines the core data structures:
//! - `Task` - Scheduled field work with status, priority, and progress
//! - `TaskAssignment` - Many-to-many link between tasks and technicians
//! - `ServiceSheet` - Checklist and signatures documenting work on a task
//! - `Note` / `Photo` - Attachments recorded against a task
//! - `Product` / `ProductUsage` - Inventory and materials consumed on site
//! - `Timesheet` - A recorded work interval against a task
//! - `Client` - The customer a task is performed for
//!
//! All entities are identified by an `i64` assigned by the store, and all
//! serialize with camelCase field names to match the JSON wire format.

pub mod patch;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status in the service workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TaskStatus::Scheduled),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(format!("Unknown task priority: {}", s)),
        }
    }
}

/// A technician or back-office user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: i64,

    /// Login name, unique across users
    pub username: String,

    /// Opaque credential string (hashing is out of scope here)
    pub password: String,

    /// Display name
    pub name: String,

    /// Optional avatar image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Role, defaults to "technician"
    pub role: String,
}

/// Payload for creating a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "technician".to_string()
}

impl User {
    /// Create a new user with the given ID.
    pub fn new(id: i64, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            password: new.password,
            name: new.name,
            avatar: new.avatar,
            role: new.role,
        }
    }
}

/// A schedulable unit of field work tied to a location and optionally a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: i64,

    /// Task title
    pub title: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Site name (e.g. "Acme Co. Office")
    pub location_name: String,

    /// Street address of the site
    pub location_address: String,

    /// When the work is scheduled to start
    pub scheduled_date: DateTime<Utc>,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Completion percentage (0-100)
    #[serde(default)]
    pub progress: i32,

    /// Weak reference to a client; a dangling id is tolerated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, bumped on every mutation
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location_name: String,
    pub location_address: String,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub client_id: Option<i64>,
}

impl Task {
    /// Create a new task with the given ID, stamping both timestamps.
    pub fn new(id: i64, new: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new.title,
            description: new.description,
            location_name: new.location_name,
            location_address: new.location_address,
            scheduled_date: new.scheduled_date,
            status: new.status,
            priority: new.priority,
            progress: new.progress,
            client_id: new.client_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Assignment of a technician to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    /// Unique identifier
    pub id: i64,

    /// The assigned task
    pub task_id: i64,

    /// The assigned user
    pub user_id: i64,

    /// When the assignment was made
    pub assigned_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Create a new assignment with the given ID.
    pub fn new(id: i64, task_id: i64, user_id: i64) -> Self {
        Self {
            id,
            task_id,
            user_id,
            assigned_at: Utc::now(),
        }
    }
}

/// A single item on a service-sheet checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Position/identifier within the checklist
    pub id: i64,

    /// What to check
    pub name: String,

    /// Whether the item has been completed
    #[serde(default)]
    pub completed: bool,
}

/// Structured checklist + signatures documenting work performed on a task.
///
/// At most one sheet exists per task; the store rejects duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSheet {
    /// Unique identifier
    pub id: i64,

    /// The task this sheet documents
    pub task_id: i64,

    /// Kind of work (maintenance, repair, installation, inspection)
    pub service_type: String,

    /// Equipment the work was performed on
    pub equipment_type: String,

    /// Ordered checklist; replaced wholesale on update, never deep-merged
    pub checklist: Vec<ChecklistItem>,

    /// Technician signature as an opaque image-encoded string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician_signature: Option<String>,

    /// Customer signature as an opaque image-encoded string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_signature: Option<String>,

    /// Name of the signing customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// When the work was signed off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a [`ServiceSheet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceSheet {
    pub task_id: i64,
    pub service_type: String,
    pub equipment_type: String,
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub technician_signature: Option<String>,
    #[serde(default)]
    pub customer_signature: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
}

impl ServiceSheet {
    /// Create a new service sheet with the given ID.
    pub fn new(id: i64, new: NewServiceSheet) -> Self {
        let now = Utc::now();
        Self {
            id,
            task_id: new.task_id,
            service_type: new.service_type,
            equipment_type: new.equipment_type,
            checklist: new.checklist,
            technician_signature: new.technician_signature,
            customer_signature: new.customer_signature,
            customer_name: new.customer_name,
            completion_date: new.completion_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Kind of note content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    #[default]
    Text,
    Voice,
}

/// A text or voice note recorded against a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: i64,

    /// The task the note belongs to
    pub task_id: i64,

    /// The author
    pub user_id: i64,

    /// Note text (or transcription placeholder for voice notes)
    pub content: String,

    /// Whether this is a text or voice note
    #[serde(default)]
    pub note_type: NoteType,

    /// Reference to the voice recording, for voice notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_recording_url: Option<String>,

    /// Recording length in seconds, for voice notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a [`Note`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub task_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub voice_recording_url: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl Note {
    /// Create a new note with the given ID.
    pub fn new(id: i64, new: NewNote) -> Self {
        Self {
            id,
            task_id: new.task_id,
            user_id: new.user_id,
            content: new.content,
            note_type: new.note_type,
            voice_recording_url: new.voice_recording_url,
            duration: new.duration,
            created_at: Utc::now(),
        }
    }
}

/// A photo attached to a task.
///
/// Only the filename is stored; the byte payload lives on disk and is served
/// statically. [`Photo::url`] derives the public URL from the filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Unique identifier
    pub id: i64,

    /// The task the photo belongs to
    pub task_id: i64,

    /// The uploader
    pub user_id: i64,

    /// On-disk filename within the uploads directory
    pub filename: String,

    /// Optional caption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// Payload for creating a [`Photo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub task_id: i64,
    pub user_id: i64,
    pub filename: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Photo {
    /// Create a new photo record with the given ID.
    pub fn new(id: i64, new: NewPhoto) -> Self {
        Self {
            id,
            task_id: new.task_id,
            user_id: new.user_id,
            filename: new.filename,
            description: new.description,
            uploaded_at: Utc::now(),
        }
    }

    /// Public URL for the photo, derived from its filename.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.filename)
    }
}

/// A stocked product or material consumable on tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: i64,

    /// Product name
    pub name: String,

    /// Stock-keeping unit, unique per product
    pub sku: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price per unit; rounded to two decimals only at presentation time
    pub unit_price: f64,

    /// Units currently on the shelf, never negative
    pub stock_quantity: i64,

    /// Stock level at or below which the product counts as low stock
    pub low_stock_threshold: i64,

    /// Product category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, bumped on stock movements too
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_low_stock_threshold() -> i64 {
    5
}

impl Product {
    /// Create a new product with the given ID.
    pub fn new(id: i64, new: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            sku: new.sku,
            description: new.description,
            unit_price: new.unit_price,
            stock_quantity: new.stock_quantity,
            low_stock_threshold: new.low_stock_threshold,
            category: new.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the product has fallen to or below its low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}

/// A record of materials consumed against a task.
///
/// Creating a usage decrements the product's stock; deleting it restores
/// stock. See the inventory ledger in the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUsage {
    /// Unique identifier
    pub id: i64,

    /// The task the material was used on
    pub task_id: i64,

    /// The consumed product
    pub product_id: i64,

    /// Units consumed, always positive
    pub quantity: i64,

    /// When the usage was recorded, re-stamped on adjustment
    pub used_at: DateTime<Utc>,
}

/// Payload for recording a [`ProductUsage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductUsage {
    pub task_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

impl ProductUsage {
    /// Create a new usage record with the given ID.
    pub fn new(id: i64, new: NewProductUsage) -> Self {
        Self {
            id,
            task_id: new.task_id,
            product_id: new.product_id,
            quantity: new.quantity,
            used_at: Utc::now(),
        }
    }
}

/// A recorded work interval (or in-progress session) against a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    /// Unique identifier
    pub id: i64,

    /// The task worked on
    pub task_id: i64,

    /// The technician who logged the time
    pub user_id: i64,

    /// When work started
    pub start_time: DateTime<Utc>,

    /// When work ended; absent for an in-progress session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Minutes worked; derived from start/end when not supplied explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,

    /// Free-form notes about the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a [`Timesheet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimesheet {
    pub task_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Timesheet {
    /// Create a new timesheet with the given ID.
    ///
    /// Duration derivation happens in the storage layer, not here.
    pub fn new(id: i64, new: NewTimesheet) -> Self {
        Self {
            id,
            task_id: new.task_id,
            user_id: new.user_id,
            start_time: new.start_time,
            end_time: new.end_time,
            duration_minutes: new.duration_minutes,
            notes: new.notes,
            created_at: Utc::now(),
        }
    }
}

/// A customer that tasks can be performed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique identifier
    pub id: i64,

    /// Company or customer name
    pub name: String,

    /// Contact person
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,

    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Contact email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Billing/site address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a [`Client`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Client {
    /// Create a new client with the given ID.
    pub fn new(id: i64, new: NewClient) -> Self {
        Self {
            id,
            name: new.name,
            contact_name: new.contact_name,
            phone: new.phone,
            email: new.email,
            address: new.address,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::new(
            1,
            NewTask {
                title: "HVAC Maintenance".to_string(),
                description: None,
                location_name: "Acme Co. Office".to_string(),
                location_address: "789 Oak St".to_string(),
                scheduled_date: Utc::now(),
                status: TaskStatus::default(),
                priority: TaskPriority::default(),
                progress: 0,
                client_id: None,
            },
        )
    }

    #[test]
    fn test_task_serialization_roundtrip() {
        let task = sample_task();
        let json = serde_json::to_string(&task).unwrap();
        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task.id, deserialized.id);
        assert_eq!(task.title, deserialized.title);
        assert_eq!(task.status, deserialized.status);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("locationName").is_some());
        assert!(json.get("scheduledDate").is_some());
        assert!(json.get("location_name").is_none());
    }

    #[test]
    fn test_task_status_serialization() {
        let status = TaskStatus::InProgress;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!(
            "scheduled".parse::<TaskStatus>().unwrap(),
            TaskStatus::Scheduled
        );
        assert_eq!(
            "in_progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            "completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
        assert_eq!(
            "cancelled".parse::<TaskStatus>().unwrap(),
            TaskStatus::Cancelled
        );
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_priority_defaults_to_medium() {
        let json = r#"{"title":"T","locationName":"A","locationAddress":"B","scheduledDate":"2026-01-01T00:00:00Z"}"#;
        let new: NewTask = serde_json::from_str(json).unwrap();
        assert_eq!(new.priority, TaskPriority::Medium);
        assert_eq!(new.status, TaskStatus::Scheduled);
        assert_eq!(new.progress, 0);
    }

    #[test]
    fn test_new_user_default_role() {
        let json = r#"{"username":"jane","password":"pw","name":"Jane"}"#;
        let new: NewUser = serde_json::from_str(json).unwrap();
        assert_eq!(new.role, "technician");
    }

    #[test]
    fn test_new_product_default_threshold() {
        let json = r#"{"name":"Filter","sku":"HVF-001","unitPrice":24.99}"#;
        let new: NewProduct = serde_json::from_str(json).unwrap();
        assert_eq!(new.low_stock_threshold, 5);
        assert_eq!(new.stock_quantity, 0);
    }

    #[test]
    fn test_product_low_stock_predicate() {
        let mut product = Product::new(
            1,
            NewProduct {
                name: "Filter".to_string(),
                sku: "HVF-001".to_string(),
                description: None,
                unit_price: 24.99,
                stock_quantity: 5,
                low_stock_threshold: 5,
                category: None,
            },
        );
        // At the threshold counts as low stock
        assert!(product.is_low_stock());
        product.stock_quantity = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_photo_url_from_filename() {
        let photo = Photo::new(
            1,
            NewPhoto {
                task_id: 1,
                user_id: 1,
                filename: "1692-panel.jpg".to_string(),
                description: None,
            },
        );
        assert_eq!(photo.url(), "/uploads/1692-panel.jpg");
    }

    #[test]
    fn test_service_sheet_checklist_roundtrip() {
        let sheet = ServiceSheet::new(
            1,
            NewServiceSheet {
                task_id: 1,
                service_type: "maintenance".to_string(),
                equipment_type: "HVAC System".to_string(),
                checklist: vec![
                    ChecklistItem {
                        id: 1,
                        name: "Inspect equipment".to_string(),
                        completed: true,
                    },
                    ChecklistItem {
                        id: 2,
                        name: "Test functionality".to_string(),
                        completed: false,
                    },
                ],
                technician_signature: None,
                customer_signature: None,
                customer_name: None,
                completion_date: None,
            },
        );
        let json = serde_json::to_string(&sheet).unwrap();
        let deserialized: ServiceSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.checklist.len(), 2);
        assert!(deserialized.checklist[0].completed);
        assert_eq!(deserialized.checklist[1].name, "Test functionality");
    }

    #[test]
    fn test_note_type_default_is_text() {
        let json = r#"{"taskId":1,"userId":1,"content":"Dust build-up in vents"}"#;
        let new: NewNote = serde_json::from_str(json).unwrap();
        assert_eq!(new.note_type, NoteType::Text);
    }
}
