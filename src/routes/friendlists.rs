use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{discard_unreferenced_upload, link_response, ok, unlink_response};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{FriendRef, FriendlistPayload, TagRef};
use crate::state::AppState;

pub async fn create_friendlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<FriendlistPayload>,
) -> AppResult<impl IntoResponse> {
    let id = state.services.friendlists.create(user, &req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "friendlist_id": id }))))
}

pub async fn list_friendlists(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let lists = state.services.friendlists.get_all(user).await?;
    Ok(Json(json!({ "data": lists })))
}

pub async fn list_with_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let lists = state.services.friendlists.get_all_with_tags(user).await?;
    Ok(Json(json!({ "data": lists })))
}

pub async fn list_with_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let lists = state.services.friendlists.get_all_with_friends(user).await?;
    Ok(Json(json!({ "data": lists })))
}

pub async fn list_full(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> AppResult<impl IntoResponse> {
    let lists = state.services.friendlists.get_all_full(user).await?;
    Ok(Json(json!({ "data": lists })))
}

pub async fn get_friendlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let list = state.services.friendlists.get_by_id(user, id).await?;
    Ok(Json(json!({ "friendlist": list })))
}

pub async fn get_with_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let list = state.services.friendlists.get_with_tags(user, id).await?;
    Ok(Json(json!({ "friendlist": list })))
}

pub async fn get_with_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let list = state.services.friendlists.get_with_friends(user, id).await?;
    Ok(Json(json!({ "friendlist": list })))
}

pub async fn get_full(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let list = state.services.friendlists.get_full(user, id).await?;
    Ok(Json(json!({ "friendlist": list })))
}

pub async fn update_friendlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FriendlistPayload>,
) -> AppResult<impl IntoResponse> {
    match state.services.friendlists.update(user, id, &req).await {
        Ok(replaced) => {
            if let Some(old) = replaced {
                state.images.remove_quietly(old).await;
            }
            Ok(ok())
        }
        Err(e) => {
            let current = state.services.friendlists.get_by_id(user, id).await.ok().and_then(|l| l.image_id);
            discard_unreferenced_upload(&state, req.image_id, current).await;
            Err(e)
        }
    }
}

pub async fn delete_friendlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    if let Some(image) = state.services.friendlists.delete(user, id).await? {
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
    Ok(link_response(state.services.friendlists.add_tag(user, id, req.tag_id).await?))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, tag_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    Ok(unlink_response(state.services.friendlists.remove_tag(user, id, tag_id).await?))
}

pub async fn add_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FriendRef>,
) -> AppResult<impl IntoResponse> {
    Ok(link_response(state.services.friendlists.add_friend(user, id, req.friend_id).await?))
}

pub async fn remove_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, friend_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    Ok(unlink_response(state.services.friendlists.remove_friend(user, id, friend_id).await?))
}
