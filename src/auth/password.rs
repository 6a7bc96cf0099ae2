use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use super::AuthError;

/// Size of the per-user random salt before base64 encoding.
pub const SALT_LEN: usize = 32;

/// Stored credential pair of a user.
#[derive(Debug, Clone)]
pub struct HashedPassword {
    pub hash: String,
    /// Base64 (standard alphabet) of the raw salt bytes.
    pub salt: String,
}

pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Longest input bcrypt accepts without truncation. Its 72-byte key
/// includes a NUL terminator.
pub const BCRYPT_MAX_INPUT: usize = 71;

/// Longest password that still fits next to the raw salt.
pub const MAX_PASSWORD_BYTES: usize = BCRYPT_MAX_INPUT - SALT_LEN;

/// Whether `password` can be hashed without losing bytes.
pub fn fits(password: &str) -> bool {
    password.len() <= MAX_PASSWORD_BYTES
}

/// `password` followed by the decoded salt bytes.
fn salted(password: &str, salt: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let raw = STANDARD.decode(salt)?;
    let mut input = Vec::with_capacity(password.len() + raw.len());
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(&raw);
    Ok(input)
}

/// Hashes `password` with a fresh salt. CPU bound, call from a blocking task.
/// Fails with a truncation error when `password` is longer than [`MAX_PASSWORD_BYTES`].
pub fn hash_password(password: &str, cost: u32) -> Result<HashedPassword, AuthError> {
    let salt = generate_salt();
    let input = salted(password, &salt).map_err(|e| AuthError::Salt(e.to_string()))?;
    let hash = bcrypt::non_truncating_hash(input, cost)?;
    Ok(HashedPassword { hash, salt })
}

/// Recomputes the salted bcrypt comparison. Over-long input, a malformed salt
/// or a malformed stored hash all count as a mismatch.
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let input = match salted(password, salt) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!("Stored password salt could not be decoded: {}", e);
            return false;
        }
    };
    match bcrypt::non_truncating_verify(input, hash) {
        Ok(matches) => matches,
        Err(bcrypt::BcryptError::Truncation(_)) => false,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}
