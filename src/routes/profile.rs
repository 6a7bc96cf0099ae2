use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use super::{discard_unreferenced_upload, ok};
use super::extract::ApiJson;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::ProfileUpdate;
use crate::state::AppState;

pub async fn get_profile(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> AppResult<impl IntoResponse> {
    let profile = state.services.users.profile(user).await?;
    Ok(Json(json!({ "user": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<ProfileUpdate>,
) -> AppResult<impl IntoResponse> {
    let new_image = req.image_id;
    match state.services.users.update_profile(user, req).await {
        Ok(replaced) => {
            if let Some(old) = replaced {
                state.images.remove_quietly(old).await;
            }
            Ok(ok())
        }
        Err(e) => {
            let current = state.services.users.profile(user).await.ok().and_then(|p| p.image_id);
            discard_unreferenced_upload(&state, new_image, current).await;
            Err(e)
        }
    }
}
