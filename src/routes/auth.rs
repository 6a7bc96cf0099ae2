use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::extract::ApiJson;
use crate::error::AppResult;
use crate::models::{SignInRequest, SignUpRequest};
use crate::state::AppState;

pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = state.services.auth.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user_id }))))
}

pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> AppResult<impl IntoResponse> {
    let token = state.services.auth.sign_in(req).await?;
    Ok(Json(json!({ "token": token })))
}
