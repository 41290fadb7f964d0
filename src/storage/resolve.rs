//! Per-request joins across collections.
//!
//! Read endpoints return a primary entity composed with its related
//! records, resolved through foreign-key lookups at call time. Nothing is
//! cached: every read recomputes the full join. Broken references (a
//! deleted user or client) are tolerated and resolve to nothing rather
//! than erroring.

use serde::Serialize;

use crate::models::{Client, Note, Photo, Product, ProductUsage, ServiceSheet, Task, Timesheet, User};

use super::Storage;

/// A task together with its assigned technicians.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAssignees {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_users: Vec<User>,
}

/// A usage record joined with its product (absent if the product was deleted).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWithProduct {
    #[serde(flatten)]
    pub usage: ProductUsage,
    pub product: Option<Product>,
}

/// A photo annotated with its derived public URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoWithUrl {
    #[serde(flatten)]
    pub photo: Photo,
    pub url: String,
}

impl From<Photo> for PhotoWithUrl {
    fn from(photo: Photo) -> Self {
        let url = photo.url();
        Self { photo, url }
    }
}

/// The full expansion of a task for detail reads and report rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_users: Vec<User>,
    pub service_sheet: Option<ServiceSheet>,
    pub notes: Vec<Note>,
    pub photos: Vec<PhotoWithUrl>,
    pub product_usage: Vec<UsageWithProduct>,
    pub timesheets: Vec<Timesheet>,
    pub client: Option<Client>,
}

impl Storage {
    /// Users assigned to a task. Assignments pointing at a missing user
    /// are silently dropped.
    pub fn assigned_users(&self, task_id: i64) -> Vec<User> {
        self.task_assignments(task_id)
            .iter()
            .filter_map(|a| self.get_user(a.user_id))
            .collect()
    }

    /// Expand a list of tasks with their assigned users.
    pub fn with_assignees(&self, tasks: Vec<Task>) -> Vec<TaskWithAssignees> {
        tasks
            .into_iter()
            .map(|task| {
                let assigned_users = self.assigned_users(task.id);
                TaskWithAssignees {
                    task,
                    assigned_users,
                }
            })
            .collect()
    }

    /// Usage records for a task, each joined with its product.
    pub fn task_usage_with_products(&self, task_id: i64) -> Vec<UsageWithProduct> {
        self.task_product_usage(task_id)
            .into_iter()
            .map(|usage| {
                let product = self.get_product(usage.product_id);
                UsageWithProduct { usage, product }
            })
            .collect()
    }

    /// Assemble the full expansion of a task, or `None` for an unknown id.
    pub fn task_detail(&self, id: i64) -> Option<TaskDetail> {
        let task = self.get_task(id)?;
        let client = task.client_id.and_then(|cid| self.get_client(cid));
        Some(TaskDetail {
            assigned_users: self.assigned_users(id),
            service_sheet: self.service_sheet_for_task(id),
            notes: self.task_notes(id),
            photos: self.task_photos(id).into_iter().map(Into::into).collect(),
            product_usage: self.task_usage_with_products(id),
            timesheets: self.task_timesheets(id),
            client,
            task,
        })
    }
}
