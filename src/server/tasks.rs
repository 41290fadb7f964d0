//! Handlers for tasks and their attachments (sheets, notes, photos).

use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::Deserialize;

use crate::Error;
use crate::models::patch::{ServiceSheetPatch, TaskPatch};
use crate::models::{
    NewNote, NewPhoto, NewServiceSheet, NewTask, Note, ServiceSheet, TaskPriority, TaskStatus,
};
use crate::storage::{PhotoWithUrl, TaskDetail, TaskWithAssignees};

use super::{ApiResult, AppState};

/// Filters accepted by the task list endpoint. Applied first-match-wins
/// in declaration order; unfiltered requests return everything.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub date: Option<String>,
    pub user_id: Option<i64>,
}

/// A calendar day from either a bare date or a full timestamp, resolved
/// to the server's local calendar.
fn parse_day(raw: &str) -> Result<NaiveDate, Error> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    raw.parse::<DateTime<FixedOffset>>()
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .map_err(|_| Error::InvalidInput(format!("Invalid date filter: {}", raw)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskWithAssignees>>> {
    let storage = state.storage.lock().await;
    let tasks = if let Some(status) = query.status {
        let status: TaskStatus = status.parse().map_err(Error::InvalidInput)?;
        storage.tasks_by_status(status)
    } else if let Some(priority) = query.priority {
        let priority: TaskPriority = priority.parse().map_err(Error::InvalidInput)?;
        storage.tasks_by_priority(priority)
    } else if let Some(date) = query.date {
        storage.tasks_on(parse_day(&date)?)
    } else if let Some(user_id) = query.user_id {
        storage.tasks_for_user(user_id)
    } else {
        storage.list_tasks()
    };
    Ok(Json(storage.with_assignees(tasks)))
}

/// Task creation payload: the task fields plus an optional initial set of
/// assignees, applied in the same request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(flatten)]
    pub task: NewTask,
    #[serde(default)]
    pub assigned_user_ids: Vec<i64>,
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithAssignees>)> {
    let mut storage = state.storage.lock().await;
    let task = storage.create_task(req.task);
    storage.set_task_assignees(task.id, &req.assigned_user_ids);
    let assigned_users = storage.assigned_users(task.id);
    Ok((
        StatusCode::CREATED,
        Json(TaskWithAssignees {
            task,
            assigned_users,
        }),
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<TaskDetail>> {
    let storage = state.storage.lock().await;
    let detail = storage
        .task_detail(id)
        .ok_or(Error::not_found("task", id))?;
    Ok(Json(detail))
}

/// Task update payload: a field patch plus an optional full replacement
/// of the assignee set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(flatten)]
    pub patch: TaskPatch,
    pub assigned_user_ids: Option<Vec<i64>>,
}

pub async fn update_task(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskWithAssignees>> {
    let mut storage = state.storage.lock().await;
    let task = storage
        .update_task(id, req.patch)
        .ok_or(Error::not_found("task", id))?;
    if let Some(user_ids) = req.assigned_user_ids {
        storage.set_task_assignees(id, &user_ids);
    }
    let assigned_users = storage.assigned_users(id);
    Ok(Json(TaskWithAssignees {
        task,
        assigned_users,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.delete_task(id) {
        return Err(Error::not_found("task", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Service sheets ----

pub async fn task_service_sheet(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<ServiceSheet>> {
    let storage = state.storage.lock().await;
    let sheet = storage
        .service_sheet_for_task(id)
        .ok_or(Error::not_found("service sheet for task", id))?;
    Ok(Json(sheet))
}

pub async fn create_service_sheet(
    State(state): State<AppState>,
    Json(new): Json<NewServiceSheet>,
) -> ApiResult<(StatusCode, Json<ServiceSheet>)> {
    let mut storage = state.storage.lock().await;
    if storage.get_task(new.task_id).is_none() {
        return Err(Error::not_found("task", new.task_id).into());
    }
    let sheet = storage.create_service_sheet(new)?;
    Ok((StatusCode::CREATED, Json(sheet)))
}

pub async fn update_service_sheet(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(patch): Json<ServiceSheetPatch>,
) -> ApiResult<Json<ServiceSheet>> {
    let mut storage = state.storage.lock().await;
    let sheet = storage
        .update_service_sheet(id, patch)
        .ok_or(Error::not_found("service sheet", id))?;
    Ok(Json(sheet))
}

// ---- Notes ----

pub async fn task_notes(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<Vec<Note>>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.task_notes(id)))
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(new): Json<NewNote>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let mut storage = state.storage.lock().await;
    if storage.get_task(new.task_id).is_none() {
        return Err(Error::not_found("task", new.task_id).into());
    }
    let note = storage.create_note(new);
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.delete_note(id) {
        return Err(Error::not_found("note", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Photos ----

pub async fn task_photos(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<Vec<PhotoWithUrl>>> {
    let storage = state.storage.lock().await;
    let photos: Vec<PhotoWithUrl> = storage
        .task_photos(id)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(photos))
}

pub async fn create_photo(
    State(state): State<AppState>,
    Json(new): Json<NewPhoto>,
) -> ApiResult<(StatusCode, Json<PhotoWithUrl>)> {
    let mut storage = state.storage.lock().await;
    if storage.get_task(new.task_id).is_none() {
        return Err(Error::not_found("task", new.task_id).into());
    }
    if storage.get_user(new.user_id).is_none() {
        return Err(Error::not_found("user", new.user_id).into());
    }
    let photo: PhotoWithUrl = storage.create_photo(new).into();
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    let photo = storage
        .get_photo(id)
        .ok_or(Error::not_found("photo", id))?;
    storage.delete_photo(id);
    // Best-effort file cleanup; the record is authoritative
    let path = state.uploads_dir.join(&photo.filename);
    if let Err(err) = std::fs::remove_file(&path) {
        tracing::debug!("could not remove {}: {}", path.display(), err);
    }
    Ok(StatusCode::NO_CONTENT)
}
