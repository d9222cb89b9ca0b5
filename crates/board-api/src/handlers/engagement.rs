//! Handler for `POST /entities/{subjects|comments}/:id/like`.
//!
//! One generic handler serves both entity kinds; the router instantiates it
//! once per kind. Body: `{"action": "like" | "dislike" | null}`. The `action`
//! member is required; a body without it is rejected with 400.
//!
//! The handler applies exactly the requested action. Turning a repeated
//! click into a removal is the client's decision
//! ([`board_core::engagement::resolve_toggle`]).

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
};
use board_core::{
  engagement::{self, Action, Engageable, Engagement},
  store::EngagementStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  /// Missing is an error, unlike an explicit `null`.
  pub action: serde_json::Value,
}

/// Returns the entity's membership after the toggle as
/// `{"likes": [...], "dislikes": [...]}`.
pub async fn toggle<S, E>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  path: Result<Path<Uuid>, PathRejection>,
  payload: Result<Json<ToggleBody>, JsonRejection>,
) -> Result<Json<Engagement>, ApiError>
where
  S: EngagementStore<E> + Clone + 'static,
  E: Engageable + 'static,
{
  let Path(id) = path?;
  let Json(body) = payload?;
  let action = Action::from_json(&body.action)?;

  tracing::debug!(kind = %E::KIND, %id, user_id = %user.user_id, %action, "toggle requested");

  let entity = engagement::toggle::<E, S>(state.store.as_ref(), id, user.user_id, action)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", E::KIND)))?;

  Ok(Json(entity.engagement().clone()))
}
