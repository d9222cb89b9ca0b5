//! Handlers for `/entities/comments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/entities/comments` | `?subject=<id>` required; oldest first |
//! | `POST` | `/entities/comments` | Bearer auth; body: `{"subject":"<id>","content":"..."}` |
//! | `GET`  | `/entities/comments/:id` | 404 if not found |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use board_core::{comment::NewComment, store::BoardStore, view::CommentView};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// The subject whose comments to return.
  pub subject: Uuid,
}

/// `GET /entities/comments?subject=<id>`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<CommentView>>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Query(params) = params?;
  let comments = state
    .store
    .list_comment_views(params.subject)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /entities/comments`: returns 201 + the stored comment, or 404 if
/// the subject does not exist.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Json(body) = payload?;
  body.validate()?;

  let subject_id = body.subject_id;
  if state
    .store
    .get_subject(subject_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("subject {subject_id} not found")));
  }

  let comment = state
    .store
    .add_comment(user.user_id, body)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    comment_id = %comment.comment_id,
    %subject_id,
    author = %user.user_id,
    "comment created"
  );
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entities/comments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CommentView>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Path(id) = path?;
  let view = state
    .store
    .comment_view(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(view))
}
