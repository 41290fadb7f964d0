//! Handlers for users, clients, timesheets, and the dashboard.

use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::Error;
use crate::models::patch::{ClientPatch, TimesheetPatch};
use crate::models::{Client, NewClient, NewTimesheet, NewUser, Timesheet, User};
use crate::storage::DashboardStats;

use super::{ApiResult, AppState};

// ---- Users ----

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_users()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let mut storage = state.storage.lock().await;
    if storage.get_user_by_username(&new.username).is_some() {
        return Err(Error::InvalidInput(format!(
            "Username already taken: {}",
            new.username
        ))
        .into());
    }
    let user = storage.create_user(new);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<User>> {
    let storage = state.storage.lock().await;
    let user = storage.get_user(id).ok_or(Error::not_found("user", id))?;
    Ok(Json(user))
}

// ---- Timesheets ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetListQuery {
    pub user_id: Option<i64>,
    pub task_id: Option<i64>,
}

pub async fn list_timesheets(
    State(state): State<AppState>,
    Query(query): Query<TimesheetListQuery>,
) -> ApiResult<Json<Vec<Timesheet>>> {
    let storage = state.storage.lock().await;
    let timesheets = if let Some(user_id) = query.user_id {
        storage.user_timesheets(user_id)
    } else if let Some(task_id) = query.task_id {
        storage.task_timesheets(task_id)
    } else {
        storage.list_timesheets()
    };
    Ok(Json(timesheets))
}

pub async fn create_timesheet(
    State(state): State<AppState>,
    Json(new): Json<NewTimesheet>,
) -> ApiResult<(StatusCode, Json<Timesheet>)> {
    let mut storage = state.storage.lock().await;
    if storage.get_task(new.task_id).is_none() {
        return Err(Error::not_found("task", new.task_id).into());
    }
    if storage.get_user(new.user_id).is_none() {
        return Err(Error::not_found("user", new.user_id).into());
    }
    let sheet = storage.create_timesheet(new);
    Ok((StatusCode::CREATED, Json(sheet)))
}

pub async fn update_timesheet(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(patch): Json<TimesheetPatch>,
) -> ApiResult<Json<Timesheet>> {
    let mut storage = state.storage.lock().await;
    let sheet = storage
        .update_timesheet(id, patch)
        .ok_or(Error::not_found("timesheet", id))?;
    Ok(Json(sheet))
}

pub async fn delete_timesheet(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.delete_timesheet(id) {
        return Err(Error::not_found("timesheet", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Clients ----

pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Json<Vec<Client>>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_clients()))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(new): Json<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let mut storage = state.storage.lock().await;
    let client = storage.create_client(new);
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<Client>> {
    let storage = state.storage.lock().await;
    let client = storage
        .get_client(id)
        .ok_or(Error::not_found("client", id))?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(patch): Json<ClientPatch>,
) -> ApiResult<Json<Client>> {
    let mut storage = state.storage.lock().await;
    let client = storage
        .update_client(id, patch)
        .ok_or(Error::not_found("client", id))?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.delete_client(id) {
        return Err(Error::not_found("client", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Dashboard ----

pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.dashboard_stats()))
}
