#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use std::io;

    use crate::auth::AuthError;
    use crate::error::{ensure_affected, validation, AppError, AppResult, OptionExt};

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("friend not found".to_string());
        assert_eq!(format!("{}", error), "Not found: friend not found");

        let error = AppError::ValidationError { field: "title".to_string(), message: "must not be empty".to_string() };
        assert_eq!(format!("{}", error), "Validation error on field 'title': must not be empty");

        assert_eq!(format!("{}", AppError::InvalidCredentials), "invalid mail or password");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::UnsupportedMediaType("x".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (AppError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Integrity("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_client_error_envelope() {
        let (status, body) = body_json(AppError::NotFound("tag not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "tag not found");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("error_id").is_none());

        let (_, body) = body_json(AppError::ValidationError {
            field: "mail".to_string(),
            message: "must not be empty".to_string(),
        })
        .await;
        assert_eq!(body["message"], "mail: must not be empty");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let (status, body) = body_json(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
        assert!(body["error_id"].is_string());

        let (_, body) = body_json(AppError::Database("no such column".into())).await;
        assert_eq!(body["message"], "A database error occurred");
        assert!(body["error_id"].is_string());
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        match app_error {
            AppError::IoError(msg) => assert!(msg.contains("File not found")),
            other => panic!("expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_sqlx_error() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
        assert!(matches!(AppError::from(sqlx::Error::PoolTimedOut), AppError::ServiceUnavailable(_)));
        assert!(matches!(AppError::from(sqlx::Error::PoolClosed), AppError::Database(_)));
    }

    #[test]
    fn test_from_auth_error() {
        assert!(matches!(AppError::from(AuthError::InvalidCredentials), AppError::InvalidCredentials));
        assert!(matches!(AppError::from(AuthError::MissingToken), AppError::Unauthorized(_)));
        match AppError::from(AuthError::InvalidToken("expired".into())) {
            AppError::Unauthorized(msg) => assert_eq!(msg, "invalid token: expired"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_option_ext() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.ok_or_not_found("friend").unwrap(), 42);

        let none: Option<i32> = None;
        match none.ok_or_not_found("friend") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "friend not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_affected() {
        assert!(ensure_affected(1, "event").is_ok());
        let result: AppResult<()> = ensure_affected(0, "event");
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "event not found"));
    }

    #[test]
    fn test_validation_helpers() {
        assert!(validation::require_non_blank(Some("Lea"), "first_name").is_ok());
        assert!(validation::require_non_blank(Some("  "), "first_name").is_err());
        assert!(validation::require_non_blank(None, "first_name").is_err());

        assert!(validation::reject_blank(None, "title").is_ok());
        assert!(validation::reject_blank(Some("Work"), "title").is_ok());
        match validation::reject_blank(Some(""), "title") {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }
}
