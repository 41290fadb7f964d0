//! In-memory storage layer for fieldtrack data.
//!
//! `Storage` owns one keyed collection per entity type plus an independent
//! id counter for each. There is no durable backend: the process holds the
//! single logical replica of state, and callers pass the store around as an
//! explicit dependency (the HTTP layer wraps it in a mutex).
//!
//! The entity CRUD primitives live here. The cross-entity rules are split
//! into focused submodules:
//! - [`inventory`] - stock movements tied to the product-usage lifecycle
//! - [`timesheets`] - duration derivation for work intervals
//! - [`query`] - task filters, low-stock listing, dashboard aggregates
//! - [`resolve`] - per-request joins across collections
//!
//! Expected absence is not an error at this layer: lookups return `Option`
//! and deletes return `bool`, leaving the 404-vs-failure decision to the
//! caller. Only invariant breaches (duplicate service sheet, insufficient
//! stock) surface as `Error`.

pub mod inventory;
pub mod query;
pub mod resolve;
pub mod timesheets;

pub use query::DashboardStats;
pub use resolve::{PhotoWithUrl, TaskDetail, TaskWithAssignees, UsageWithProduct};

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::patch::{ClientPatch, ServiceSheetPatch, TaskPatch};
use crate::models::{
    Client, NewClient, NewNote, NewPhoto, NewServiceSheet, NewTask, NewUser, Note, Photo, Product,
    ProductUsage, ServiceSheet, Task, TaskAssignment, Timesheet, User,
};
use crate::{Error, Result};

/// Monotonically increasing id source, starting at 1.
#[derive(Debug, Clone, Copy, Default)]
struct IdCounter(i64);

impl IdCounter {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

/// One counter per entity type; ids are unique per type, not globally.
#[derive(Debug, Default)]
struct IdAllocator {
    users: IdCounter,
    tasks: IdCounter,
    assignments: IdCounter,
    service_sheets: IdCounter,
    notes: IdCounter,
    photos: IdCounter,
    products: IdCounter,
    usage: IdCounter,
    timesheets: IdCounter,
    clients: IdCounter,
}

/// In-memory store for all fieldtrack entities.
#[derive(Debug, Default)]
pub struct Storage {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    assignments: BTreeMap<i64, TaskAssignment>,
    service_sheets: BTreeMap<i64, ServiceSheet>,
    notes: BTreeMap<i64, Note>,
    photos: BTreeMap<i64, Photo>,
    pub(crate) products: BTreeMap<i64, Product>,
    pub(crate) usage: BTreeMap<i64, ProductUsage>,
    pub(crate) timesheets: BTreeMap<i64, Timesheet>,
    clients: BTreeMap<i64, Client>,
    ids: IdAllocator,
}

impl Storage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Users ----

    /// Create a user and return the stored record.
    pub fn create_user(&mut self, new: NewUser) -> User {
        let id = self.ids.users.next();
        let user = User::new(id, new);
        self.users.insert(id, user.clone());
        user
    }

    /// Look up a user by id.
    pub fn get_user(&self, id: i64) -> Option<User> {
        self.users.get(&id).cloned()
    }

    /// Look up a user by unique username.
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.values().find(|u| u.username == username).cloned()
    }

    /// All users in id order.
    pub fn list_users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    // ---- Tasks ----

    /// Create a task and return the stored record.
    pub fn create_task(&mut self, new: NewTask) -> Task {
        let id = self.ids.tasks.next();
        let task = Task::new(id, new);
        self.tasks.insert(id, task.clone());
        task
    }

    /// Look up a task by id.
    pub fn get_task(&self, id: i64) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    /// All tasks in id order.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Apply a patch to a task, bumping `updated_at`.
    pub fn update_task(&mut self, id: i64, patch: TaskPatch) -> Option<Task> {
        let task = self.tasks.get_mut(&id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(location_name) = patch.location_name {
            task.location_name = location_name;
        }
        if let Some(location_address) = patch.location_address {
            task.location_address = location_address;
        }
        if let Some(scheduled_date) = patch.scheduled_date {
            task.scheduled_date = scheduled_date;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress;
        }
        if let Some(client_id) = patch.client_id {
            task.client_id = Some(client_id);
        }
        task.updated_at = Utc::now();
        Some(task.clone())
    }

    /// Delete a task. Returns whether a record existed.
    ///
    /// Related records (assignments, sheets, notes, ...) are left in place;
    /// reads tolerate the dangling references.
    pub fn delete_task(&mut self, id: i64) -> bool {
        self.tasks.remove(&id).is_some()
    }

    // ---- Task assignments ----

    /// Assignments for a task, in id order.
    pub fn task_assignments(&self, task_id: i64) -> Vec<TaskAssignment> {
        self.assignments
            .values()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Assign a user to a task.
    ///
    /// No uniqueness is enforced here; callers reconcile via
    /// [`Storage::set_task_assignees`].
    pub fn assign_user(&mut self, task_id: i64, user_id: i64) -> TaskAssignment {
        let id = self.ids.assignments.next();
        let assignment = TaskAssignment::new(id, task_id, user_id);
        self.assignments.insert(id, assignment.clone());
        assignment
    }

    /// Remove a user's assignment from a task. Returns whether one existed.
    pub fn unassign_user(&mut self, task_id: i64, user_id: i64) -> bool {
        let found = self
            .assignments
            .values()
            .find(|a| a.task_id == task_id && a.user_id == user_id)
            .map(|a| a.id);
        match found {
            Some(id) => self.assignments.remove(&id).is_some(),
            None => false,
        }
    }

    /// Reconcile a task's assignments against a desired set of user ids.
    ///
    /// Set-difference only: users missing from `desired` are unassigned,
    /// new ones are assigned, and untouched assignments keep their
    /// original `assigned_at`.
    pub fn set_task_assignees(&mut self, task_id: i64, desired: &[i64]) {
        let current: Vec<i64> = self
            .task_assignments(task_id)
            .iter()
            .map(|a| a.user_id)
            .collect();
        for user_id in &current {
            if !desired.contains(user_id) {
                self.unassign_user(task_id, *user_id);
            }
        }
        for user_id in desired {
            if !current.contains(user_id) {
                self.assign_user(task_id, *user_id);
            }
        }
    }

    // ---- Service sheets ----

    /// The sheet documenting a task, if one exists (at most one per task).
    pub fn service_sheet_for_task(&self, task_id: i64) -> Option<ServiceSheet> {
        self.service_sheets
            .values()
            .find(|s| s.task_id == task_id)
            .cloned()
    }

    /// Create a service sheet, rejecting a duplicate for the same task.
    pub fn create_service_sheet(&mut self, new: NewServiceSheet) -> Result<ServiceSheet> {
        if self.service_sheet_for_task(new.task_id).is_some() {
            return Err(Error::SheetExists(new.task_id));
        }
        let id = self.ids.service_sheets.next();
        let sheet = ServiceSheet::new(id, new);
        self.service_sheets.insert(id, sheet.clone());
        Ok(sheet)
    }

    /// Apply a patch to a service sheet, bumping `updated_at`.
    pub fn update_service_sheet(
        &mut self,
        id: i64,
        patch: ServiceSheetPatch,
    ) -> Option<ServiceSheet> {
        let sheet = self.service_sheets.get_mut(&id)?;
        if let Some(service_type) = patch.service_type {
            sheet.service_type = service_type;
        }
        if let Some(equipment_type) = patch.equipment_type {
            sheet.equipment_type = equipment_type;
        }
        if let Some(checklist) = patch.checklist {
            sheet.checklist = checklist;
        }
        if let Some(signature) = patch.technician_signature {
            sheet.technician_signature = Some(signature);
        }
        if let Some(signature) = patch.customer_signature {
            sheet.customer_signature = Some(signature);
        }
        if let Some(customer_name) = patch.customer_name {
            sheet.customer_name = Some(customer_name);
        }
        if let Some(completion_date) = patch.completion_date {
            sheet.completion_date = Some(completion_date);
        }
        sheet.updated_at = Utc::now();
        Some(sheet.clone())
    }

    // ---- Notes ----

    /// Notes recorded against a task, in id order.
    pub fn task_notes(&self, task_id: i64) -> Vec<Note> {
        self.notes
            .values()
            .filter(|n| n.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Create a note and return the stored record.
    pub fn create_note(&mut self, new: NewNote) -> Note {
        let id = self.ids.notes.next();
        let note = Note::new(id, new);
        self.notes.insert(id, note.clone());
        note
    }

    /// Delete a note. Returns whether a record existed.
    pub fn delete_note(&mut self, id: i64) -> bool {
        self.notes.remove(&id).is_some()
    }

    // ---- Photos ----

    /// Photos attached to a task, in id order.
    pub fn task_photos(&self, task_id: i64) -> Vec<Photo> {
        self.photos
            .values()
            .filter(|p| p.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Look up a photo by id.
    pub fn get_photo(&self, id: i64) -> Option<Photo> {
        self.photos.get(&id).cloned()
    }

    /// Create a photo record and return it.
    pub fn create_photo(&mut self, new: NewPhoto) -> Photo {
        let id = self.ids.photos.next();
        let photo = Photo::new(id, new);
        self.photos.insert(id, photo.clone());
        photo
    }

    /// Delete a photo record. Returns whether one existed.
    pub fn delete_photo(&mut self, id: i64) -> bool {
        self.photos.remove(&id).is_some()
    }

    // ---- Clients ----

    /// Create a client and return the stored record.
    pub fn create_client(&mut self, new: NewClient) -> Client {
        let id = self.ids.clients.next();
        let client = Client::new(id, new);
        self.clients.insert(id, client.clone());
        client
    }

    /// Look up a client by id.
    pub fn get_client(&self, id: i64) -> Option<Client> {
        self.clients.get(&id).cloned()
    }

    /// All clients in id order.
    pub fn list_clients(&self) -> Vec<Client> {
        self.clients.values().cloned().collect()
    }

    /// Apply a patch to a client.
    pub fn update_client(&mut self, id: i64, patch: ClientPatch) -> Option<Client> {
        let client = self.clients.get_mut(&id)?;
        if let Some(name) = patch.name {
            client.name = name;
        }
        if let Some(contact_name) = patch.contact_name {
            client.contact_name = Some(contact_name);
        }
        if let Some(phone) = patch.phone {
            client.phone = Some(phone);
        }
        if let Some(email) = patch.email {
            client.email = Some(email);
        }
        if let Some(address) = patch.address {
            client.address = Some(address);
        }
        Some(client.clone())
    }

    /// Delete a client. Returns whether a record existed.
    ///
    /// Tasks pointing at the deleted client keep their `client_id`; reads
    /// resolve it to nothing.
    pub fn delete_client(&mut self, id: i64) -> bool {
        self.clients.remove(&id).is_some()
    }
}
