use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::ok;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::AdditionalFieldPayload;
use crate::state::AppState;

pub async fn create_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<AdditionalFieldPayload>,
) -> AppResult<impl IntoResponse> {
    let id = state.services.additional_fields.create(user, req.title.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "additional_field_id": id }))))
}

pub async fn list_fields(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let fields = state.services.additional_fields.get_all(user).await?;
    Ok(Json(json!({ "data": fields })))
}

pub async fn get_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let field = state.services.additional_fields.get_by_id(user, id).await?;
    Ok(Json(json!({ "additional_field": field })))
}

pub async fn update_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AdditionalFieldPayload>,
) -> AppResult<impl IntoResponse> {
    state.services.additional_fields.update(user, id, req.title.as_deref()).await?;
    Ok(ok())
}

pub async fn delete_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.services.additional_fields.delete(user, id).await?;
    Ok(ok())
}
