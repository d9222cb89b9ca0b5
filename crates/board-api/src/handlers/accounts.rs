//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"username","password","display_name","phone"}`; 201 |
//! | `POST` | `/auth/login` | Body: `{"username","password"}`; returns token + user |
//! | `POST` | `/auth/logout` | Bearer auth; 204 |
//! | `GET`  | `/auth/me` | Bearer auth; the caller's summary |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use board_core::{
  store::BoardStore,
  user::{Registration, UserSummary},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::ApiError,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
  pub message: &'static str,
  pub user:    UserSummary,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Json(body) = payload?;
  body.validate()?;

  let existing = state
    .store
    .find_user_by_username(body.username.clone())
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::BadRequest("User already exists".into()));
  }

  let hash = auth::hash_password(&body.password)?;
  let user = state
    .store
    .create_user(body.into_new_user(hash))
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, username = %user.username, "user registered");
  Ok((
    StatusCode::CREATED,
    Json(RegisterResponse {
      message: "User registered successfully",
      user:    UserSummary::from(&user),
    }),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// The caller's identity is returned alongside the token so clients never
/// need to look inside it.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       UserSummary,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Json(body) = payload?;
  let invalid = || ApiError::BadRequest("Invalid credentials".into());

  let user = state
    .store
    .find_user_by_username(body.username.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      tracing::warn!(username = %body.username, "login for unknown user");
      invalid()
    })?;

  if !auth::verify_password(&body.password, &user.password_hash) {
    tracing::warn!(user_id = %user.user_id, "login with wrong password");
    return Err(invalid());
  }

  let now = Utc::now();
  let purged = state
    .store
    .purge_expired_sessions(now)
    .await
    .map_err(ApiError::store)?;
  if purged > 0 {
    tracing::debug!(purged, "expired sessions removed");
  }

  let token = auth::mint_token();
  let session = state
    .store
    .create_session(auth::token_digest(&token), user.user_id, now + state.session_ttl)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, "user logged in");
  Ok(Json(LoginResponse {
    token,
    expires_at: session.expires_at,
    user: UserSummary::from(&user),
  }))
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `POST /auth/logout`: ends the presented session.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<StatusCode, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  state
    .store
    .delete_session(user.token_digest)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user_id = %user.user_id, "user logged out");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<UserSummary>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let found = state
    .store
    .get_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user.user_id)))?;
  Ok(Json(UserSummary::from(&found)))
}
