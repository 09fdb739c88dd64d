//! Principal resolution and credential handling.
//!
//! Passwords are hashed with argon2id. Sessions are opaque random tokens
//! handed to the client as hex; the server keeps only the SHA-256 of each
//! token, so the sessions table never contains a usable credential. Every
//! protected handler resolves its principal through [`require_user`]; the
//! resolved user id is then a mandatory predicate of every store query, and
//! a client-supplied user id is never trusted.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::storage::{SessionRow, Storage, StorageError};
use crate::web::config::{SESSION_TTL_SECONDS, TOKEN_BYTES};
use crate::web::utils::{api_error, now_secs};

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored argon2 hash. An unparseable stored
/// hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hex SHA-256 of a session token; the only form ever stored.
pub fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Mint a session token for `user_id` and persist its hash. Expired
/// sessions are swept opportunistically on each issue.
pub fn issue_session(storage: &Storage, user_id: &str, now: u64) -> Result<String, StorageError> {
    let mut raw = [0u8; TOKEN_BYTES];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut raw);
    let token = hex::encode(raw);

    storage.purge_expired_sessions(now)?;
    storage.insert_session(&SessionRow {
        token_hash: token_hash(&token),
        user_id: user_id.to_string(),
        created_at: now,
        expires_at: now + SESSION_TTL_SECONDS,
    })?;
    Ok(token)
}

/// Resolve the authenticated user from the `Authorization: Bearer` header.
///
/// Missing header, malformed header, unknown token, and expired session all
/// yield a 401; callers return the error response as-is.
pub fn require_user(headers: &HeaderMap, storage: &Storage) -> Result<String, Response> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let Some(header) = header else {
        return Err(api_error(StatusCode::UNAUTHORIZED, "No token provided"));
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(api_error(StatusCode::UNAUTHORIZED, "No token provided"));
    };

    match storage.get_session_user(&token_hash(token), now_secs()) {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => Err(api_error(StatusCode::UNAUTHORIZED, "Invalid token")),
        Err(e) => {
            crate::plog!("session lookup failed: {e}");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication check failed",
            ))
        }
    }
}
