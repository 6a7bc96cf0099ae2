//! HTTP route handlers for the Friendly API.
//!
//! Every handler under `/api` except sign-up and sign-in runs behind
//! [`require_auth`] and receives the caller as [`crate::middleware::CurrentUser`].
//!
//! - `auth`: sign-up and sign-in
//! - `profile`: the caller's own user record
//! - `tags`, `friends`, `friendlists`, `events`, `reminders`, `additional_fields`: entity CRUD and links
//! - `images`: multipart upload and resized JPEG delivery
//! - `health`: liveness, readiness and build info

pub mod additional_fields;
pub mod auth;
pub mod events;
pub mod extract;
pub mod friendlists;
pub mod friends;
pub mod health;
pub mod images;
pub mod profile;
pub mod reminders;
pub mod tags;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::security_headers::security_headers_middleware;
use crate::middleware::validation::{validate_request_middleware, RequestLimits};
use crate::middleware::require_auth;
use crate::repository::{LinkOutcome, UnlinkOutcome};
use crate::state::AppState;

/// Body limit of every JSON route.
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;
/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub(crate) fn ok() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) fn link_response(outcome: LinkOutcome) -> Json<Value> {
    match outcome {
        LinkOutcome::Linked => ok(),
        LinkOutcome::AlreadyLinked => Json(json!({ "status": "ok", "message": "already associated" })),
    }
}

pub(crate) fn unlink_response(outcome: UnlinkOutcome) -> Json<Value> {
    match outcome {
        UnlinkOutcome::Unlinked => ok(),
        UnlinkOutcome::AlreadyRemoved => Json(json!({ "status": "ok", "message": "already removed" })),
    }
}

/// After a failed update that tried to point an entity at `requested`, drops
/// that upload unless the entity already references it.
pub(crate) async fn discard_unreferenced_upload(state: &AppState, requested: Option<Uuid>, current: Option<Uuid>) {
    if let Some(image) = requested {
        if current != Some(image) {
            state.images.remove_quietly(image).await;
        }
    }
}

/// Builds the complete application router with all layers applied.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.images.max_upload_bytes() + MULTIPART_OVERHEAD;

    let public = Router::new()
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in));

    let protected = Router::new()
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        // Tags
        .route("/api/tag", post(tags::create_tag).get(tags::list_tags))
        .route("/api/tag/{id}", get(tags::get_tag).put(tags::update_tag).delete(tags::delete_tag))
        // Friends
        .route("/api/friend", post(friends::create_friend).get(friends::list_friends))
        .route(
            "/api/friend/{id}",
            get(friends::get_friend).put(friends::update_friend).delete(friends::delete_friend),
        )
        .route("/api/friend/{id}/tag", post(friends::add_tag))
        .route("/api/friend/{id}/tag/{tag_id}", axum::routing::delete(friends::remove_tag))
        // Friendlists
        .route("/api/friendlist", post(friendlists::create_friendlist).get(friendlists::list_friendlists))
        .route("/api/friendlist/full", get(friendlists::list_full))
        .route("/api/friendlist/tag", get(friendlists::list_with_tags))
        .route("/api/friendlist/friend", get(friendlists::list_with_friends))
        .route(
            "/api/friendlist/{id}",
            get(friendlists::get_friendlist)
                .put(friendlists::update_friendlist)
                .delete(friendlists::delete_friendlist),
        )
        .route("/api/friendlist/{id}/full", get(friendlists::get_full))
        .route("/api/friendlist/{id}/tag", get(friendlists::get_with_tags).post(friendlists::add_tag))
        .route("/api/friendlist/{id}/tag/{tag_id}", axum::routing::delete(friendlists::remove_tag))
        .route("/api/friendlist/{id}/friend", get(friendlists::get_with_friends).post(friendlists::add_friend))
        .route("/api/friendlist/{id}/friend/{friend_id}", axum::routing::delete(friendlists::remove_friend))
        // Events
        .route("/api/event", post(events::create_event).get(events::list_events))
        .route("/api/event/full", get(events::list_full))
        .route("/api/event/friends", get(events::list_with_friends))
        .route("/api/event/friend/{friend_id}", get(events::list_by_friend))
        .route("/api/event/{id}", get(events::get_event).put(events::update_event).delete(events::delete_event))
        .route("/api/event/{id}/full", get(events::get_full).put(events::update_full))
        .route(
            "/api/event/{id}/friends",
            get(events::get_with_friends).post(events::add_friends).delete(events::remove_friends),
        )
        .route("/api/event/{id}/reminders", post(events::add_reminders))
        // Reminders
        .route("/api/reminder", post(reminders::create_reminder).get(reminders::list_reminders))
        .route("/api/reminder/event/{event_id}", get(reminders::list_by_event))
        .route(
            "/api/reminder/{id}",
            get(reminders::get_reminder).put(reminders::update_reminder).delete(reminders::delete_reminder),
        )
        // Additional field definitions
        .route(
            "/api/additional-field",
            post(additional_fields::create_field).get(additional_fields::list_fields),
        )
        .route(
            "/api/additional-field/{id}",
            get(additional_fields::get_field)
                .put(additional_fields::update_field)
                .delete(additional_fields::delete_field),
        )
        // Images
        .route("/api/image", post(images::upload_image).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/api/image/{id}", axum::routing::delete(images::delete_image))
        .route("/api/image/{id}/{res}", get(images::get_image))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let limits = RequestLimits { max_body_bytes: upload_limit.max(JSON_BODY_LIMIT) };
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let cfg = state.config.clone();

    let app = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/version", get(health::version))
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(from_fn_with_state(limits, validate_request_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(from_fn_with_state(cfg, security_headers_middleware));

    // CORS: permissive in debug builds for local front-end development
    if cfg!(debug_assertions) {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
