use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::ok;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{ReminderPayload, ReminderUpdate};
use crate::state::AppState;

pub async fn create_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<ReminderPayload>,
) -> AppResult<impl IntoResponse> {
    let id = state.services.reminders.create(user, req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "reminder_id": id }))))
}

pub async fn list_reminders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let reminders = state.services.reminders.get_all(user).await?;
    Ok(Json(json!({ "data": reminders })))
}

pub async fn list_by_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(event_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let reminders = state.services.reminders.get_by_event(user, event_id).await?;
    Ok(Json(json!({ "data": reminders })))
}

pub async fn get_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let reminder = state.services.reminders.get_by_id(user, id).await?;
    Ok(Json(json!({ "reminder": reminder })))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReminderUpdate>,
) -> AppResult<impl IntoResponse> {
    state.services.reminders.update(user, id, req).await?;
    Ok(ok())
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.services.reminders.delete(user, id).await?;
    Ok(ok())
}
