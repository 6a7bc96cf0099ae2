//! Credentials and bearer sessions.
//!
//! [`password`] derives and checks the stored `bcrypt(password‖salt)` hashes,
//! [`token`] issues and verifies the HS256 tokens that the session middleware
//! turns into a [`crate::middleware::auth::CurrentUser`].

pub mod password;
pub mod token;

pub use token::{Claims, TokenService};

/// Failures of the credential and token layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid mail or password")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("stored salt is malformed: {0}")]
    Salt(String),
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}
