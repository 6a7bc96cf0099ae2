use axum::{
    extract::{Multipart, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::extract::ApiPath;
use super::ok;
use crate::error::{AppError, AppResult};
use crate::images::ImageStore;
use crate::state::AppState;

/// Name of the multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "image";

pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let ext = ImageStore::check_upload(field.file_name(), content_type.as_deref())?;
        let bytes = field.bytes().await?;
        let stored = state.images.save(&ext, &bytes).await?;
        let body = json!({
            "data": {
                "image_id": stored.id,
                "size": stored.size,
                "content_type": content_type,
            }
        });
        return Ok((StatusCode::CREATED, Json(body)));
    }
    Err(AppError::BadRequest(format!("multipart field '{}' is missing", UPLOAD_FIELD)))
}

pub async fn get_image(
    State(state): State<AppState>,
    ApiPath((id, resolution)): ApiPath<(Uuid, u32)>,
) -> AppResult<impl IntoResponse> {
    let jpeg = state.images.render(id, resolution).await?;
    Ok(([(CONTENT_TYPE, "image/jpeg")], jpeg))
}

pub async fn delete_image(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<impl IntoResponse> {
    if !state.images.delete(id).await? {
        return Err(AppError::NotFound("image not found".to_string()));
    }
    Ok(ok())
}
