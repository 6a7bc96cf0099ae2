use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, header::USER_AGENT, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Upper bound on any request body, checked against `Content-Length` before
/// the body is read.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_body_bytes: usize,
}

/// Rejects requests with traversal sequences in the path or a declared body
/// larger than [`RequestLimits::max_body_bytes`], and logs scanner user agents.
pub async fn validate_request_middleware(
    State(limits): State<RequestLimits>,
    req: Request,
    next: Next,
) -> Response {
    if contains_path_traversal(req.uri().path()) {
        return AppError::BadRequest("path traversal detected in request".to_string()).into_response();
    }

    if let Some(ua) = req.headers().get(USER_AGENT).and_then(|ua| ua.to_str().ok()) {
        if is_suspicious_user_agent(ua) {
            tracing::warn!("Suspicious user agent detected: {}", sanitize_for_logging(ua));
        }
    }

    if matches!(req.method(), &Method::POST | &Method::PUT) {
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(length) = declared {
            if length > limits.max_body_bytes {
                return AppError::PayloadTooLarge(format!(
                    "request body exceeds maximum size of {} bytes",
                    limits.max_body_bytes
                ))
                .into_response();
            }
        }
    }

    next.run(req).await
}

fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }
    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }

    // Single and double URL-encoded dots, separators and NUL
    const ENCODED: &[&str] =
        &["%2e%2e", "%252e%252e", "%2e/", "%252e%2f", "/%2e", "%2f%2e", "%2e%5c", "%5c%2e", "%00"];
    if ENCODED.iter().any(|p| lower.contains(p)) {
        return true;
    }

    path.contains('\0')
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua = ua.to_lowercase();
    ["sqlmap", "nikto", "havij", "acunetix", "scanner"].iter().any(|s| ua.contains(s))
}

/// Strips control characters and caps the length of client supplied strings
/// before they reach the log.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .take(200)
        .collect::<String>()
        .replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_traversal_detection() {
        assert!(contains_path_traversal("/api/image/../etc/passwd"));
        assert!(contains_path_traversal("../secret"));
        assert!(contains_path_traversal("/api/%2e%2e/x"));
        assert!(contains_path_traversal("/api/image/%2E%2E"));
        assert!(contains_path_traversal("/api/x%00y"));

        assert!(!contains_path_traversal("/api/friend/550e8400-e29b-41d4-a716-446655440000"));
        assert!(!contains_path_traversal("/api/image/1.png"));
    }

    #[test]
    fn suspicious_user_agents() {
        assert!(is_suspicious_user_agent("sqlmap/1.7"));
        assert!(is_suspicious_user_agent("Nikto/2.1.5"));
        assert!(!is_suspicious_user_agent("Mozilla/5.0 (X11; Linux x86_64)"));
        assert!(!is_suspicious_user_agent("curl/8.4.0"));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_logging("plain agent"), "plain agent");
        assert_eq!(sanitize_for_logging("a\nb\rc\x00d"), "abcd");
        assert_eq!(sanitize_for_logging("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(sanitize_for_logging(&"x".repeat(500)).len(), 200);
    }
}
