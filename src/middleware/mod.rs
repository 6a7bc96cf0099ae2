//! Middleware components for HTTP request processing.
//!
//! Session checks, request validation and security headers. They are layered
//! onto the router in [`crate::routes::router`].

pub mod auth;
pub mod security_headers;
pub mod validation;

pub use auth::{require_auth, CurrentUser};
