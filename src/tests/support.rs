use std::path::Path;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{db, routes};

/// Router plus the state and temporary directory backing it.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub fn test_config(dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = format!("sqlite://{}", dir.join("friendly.db").display());
    cfg.database.max_connections = 4;
    cfg.auth.jwt_secret = "integration-test-secret".to_string();
    cfg.auth.bcrypt_cost = 4;
    cfg.images.upload_dir = dir.join("images").display().to_string();
    cfg.images.max_upload_bytes = 256 * 1024;
    cfg.images.max_resolution = 256;
    cfg
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path());
    let pool = db::connect(&cfg.database).await.unwrap();
    db::init_db(&pool).await.unwrap();
    let state = AppState::new(pool, cfg);
    let app = routes::router(state.clone());
    TestApp { app, state, _dir: dir }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.unwrap()
    }

    /// Sends a JSON request and returns the status with the parsed body
    /// (`Value::Null` for an empty body).
    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.send(req).await;
        let status = response.status();
        let bytes = body_bytes(response).await;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Signs up `mail` with a fixed password and returns a bearer token.
    pub async fn register(&self, mail: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/api/auth/sign-up",
                None,
                Some(json!({ "mail": mail, "password": "correct horse", "first_name": "Test" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/sign-in",
                None,
                Some(json!({ "mail": mail, "password": "correct horse" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

/// Reads a uuid field such as `friend_id` from a create response.
pub fn id_of(body: &Value, field: &str) -> String {
    body[field].as_str().unwrap_or_else(|| panic!("no '{}' in {}", field, body)).to_string()
}
