use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{discard_unreferenced_upload, link_response, ok, unlink_response};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{CreateFriendRequest, TagRef, UpdateFriendRequest};
use crate::state::AppState;

/// Creates the friend and, when a date of birth is given, its birthday event.
///
/// The birthday event is written after the friend is committed. If that step
/// fails the request answers 500 and the friend stays.
pub async fn create_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateFriendRequest>,
) -> AppResult<impl IntoResponse> {
    let created = state.services.friends.create(user, &req).await?;
    let mut body = json!({ "friend_id": created.friend_id, "work_info_id": created.work_info_id });

    if req.friend.dob.is_some() {
        let birthday: AppResult<Option<Uuid>> = async {
            let full = state.services.friends.get_by_id(user, created.friend_id).await?;
            state.services.events.create_birthday(user, &full, Utc::now()).await
        }
        .await;
        match birthday {
            Ok(Some(event_id)) => body["event_id"] = json!(event_id),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(friend_id = %created.friend_id, "birthday event was not created: {}", e);
                return Err(e);
            }
        }
    }

    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn list_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let friends = state.services.friends.get_all(user).await?;
    Ok(Json(json!({ "data": friends })))
}

pub async fn get_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let friend = state.services.friends.get_by_id(user, id).await?;
    Ok(Json(json!({ "friend": friend })))
}

pub async fn update_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateFriendRequest>,
) -> AppResult<impl IntoResponse> {
    match state.services.friends.update(user, id, &req).await {
        Ok(replaced) => {
            if let Some(old) = replaced {
                state.images.remove_quietly(old).await;
            }
            Ok(ok())
        }
        Err(e) => {
            let new_image = req.friend.as_ref().and_then(|f| f.image_id);
            let current = state.services.friends.get_by_id(user, id).await.ok().and_then(|f| f.friend.image_id);
            discard_unreferenced_upload(&state, new_image, current).await;
            Err(e)
        }
    }
}

pub async fn delete_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    if let Some(image) = state.services.friends.delete(user, id).await? {
        state.images.remove_quietly(image).await;
    }
    Ok(ok())
}

pub async fn add_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<TagRef>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.services.friends.add_tag(user, id, req.tag_id).await?;
    Ok(link_response(outcome))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, tag_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.services.friends.remove_tag(user, id, tag_id).await?;
    Ok(unlink_response(outcome))
}
