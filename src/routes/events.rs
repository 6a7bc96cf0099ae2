use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::ok;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{CreateEventRequest, EventFullUpdate, EventUpdate, FriendRef, ReminderDraft, RemoveFriendsRequest};
use crate::state::AppState;

pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    let id = state.services.events.create(user, &req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "event_id": id }))))
}

pub async fn list_events(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> AppResult<impl IntoResponse> {
    let events = state.services.events.get_all(user).await?;
    Ok(Json(json!({ "data": events })))
}

pub async fn list_with_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let events = state.services.events.get_all_with_friends(user).await?;
    Ok(Json(json!({ "data": events })))
}

pub async fn list_full(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> AppResult<impl IntoResponse> {
    let events = state.services.events.get_all_full(user).await?;
    Ok(Json(json!({ "data": events })))
}

pub async fn list_by_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(friend_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let events = state.services.events.get_by_friend(user, friend_id).await?;
    Ok(Json(json!({ "data": events })))
}

pub async fn get_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let event = state.services.events.get_by_id(user, id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn get_with_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let event = state.services.events.get_with_friends(user, id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn get_full(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let event = state.services.events.get_full(user, id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EventUpdate>,
) -> AppResult<impl IntoResponse> {
    state.services.events.update(user, id, &req).await?;
    Ok(ok())
}

pub async fn update_full(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EventFullUpdate>,
) -> AppResult<impl IntoResponse> {
    state.services.events.update_full(user, id, &req).await?;
    Ok(ok())
}

pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.services.events.delete(user, id).await?;
    Ok(ok())
}

pub async fn add_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<Vec<FriendRef>>,
) -> AppResult<impl IntoResponse> {
    let ids = state.services.events.add_friends(user, id, &req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok", "ids": ids }))))
}

pub async fn remove_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RemoveFriendsRequest>,
) -> AppResult<impl IntoResponse> {
    state.services.events.remove_friends(user, id, &req.friend_ids).await?;
    Ok(ok())
}

pub async fn add_reminders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<Vec<ReminderDraft>>,
) -> AppResult<impl IntoResponse> {
    let ids = state.services.reminders.create_bulk(user, id, &req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok", "ids": ids }))))
}
