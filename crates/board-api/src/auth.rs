//! Bearer-session extractor, token minting and password hashing.
//!
//! Tokens are 32 random bytes, base64url-encoded. Only the SHA-256 digest of
//! a token is stored, so a leaked database cannot be replayed as sessions.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use board_core::store::BoardStore;
use chrono::Utc;
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Generate a fresh opaque bearer token.
pub fn mint_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// The key under which a token's session is stored.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `false` on a wrong password or an unparseable stored hash.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated caller. Present in a handler's arguments means the
/// request carried a live session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user_id:      Uuid,
  /// Digest of the presented token; used by logout.
  pub token_digest: String,
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: BoardStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let digest = bearer_token(&parts.headers)
      .map(token_digest)
      .ok_or_else(|| ApiError::Unauthorized("No token, authorization denied".into()))?;

    let session = state
      .store
      .get_session(digest.clone())
      .await
      .map_err(ApiError::store)?
      .filter(|s| !s.is_expired(Utc::now()))
      .ok_or_else(|| ApiError::Unauthorized("Token is not valid".into()))?;

    Ok(CurrentUser { user_id: session.user_id, token_digest: digest })
  }
}
