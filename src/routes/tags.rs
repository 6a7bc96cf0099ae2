use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::ok;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TagPayload;
use crate::service::CreateOutcome;
use crate::state::AppState;

pub async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<TagPayload>,
) -> AppResult<impl IntoResponse> {
    let res = match state.services.tags.create(user, req.title.as_deref()).await? {
        CreateOutcome::Created(id) => (StatusCode::CREATED, Json(json!({ "tag_id": id }))),
        CreateOutcome::AlreadyExists(id) => {
            (StatusCode::OK, Json(json!({ "message": "tag already exists", "tag_id": id })))
        }
    };
    Ok(res)
}

pub async fn list_tags(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> AppResult<impl IntoResponse> {
    let tags = state.services.tags.get_all(user).await?;
    Ok(Json(json!({ "data": tags })))
}

pub async fn get_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let tag = state.services.tags.get_by_id(user, id).await?;
    Ok(Json(json!({ "tag": tag })))
}

pub async fn update_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<TagPayload>,
) -> AppResult<impl IntoResponse> {
    state.services.tags.update(user, id, req.title.as_deref()).await?;
    Ok(ok())
}

pub async fn delete_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.services.tags.delete(user, id).await?;
    Ok(ok())
}
