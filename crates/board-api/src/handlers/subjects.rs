//! Handlers for `/entities/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/entities/subjects` | Newest first, with creator and comment count |
//! | `POST` | `/entities/subjects` | Bearer auth; body: `{"title":"...","description":"..."}` |
//! | `GET`  | `/entities/subjects/:id` | 404 if not found |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use board_core::{
  store::BoardStore,
  subject::NewSubject,
  view::SubjectView,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /entities/subjects`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SubjectView>>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let subjects = state
    .store
    .list_subject_views()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /entities/subjects`: returns 201 + the stored subject.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  payload: Result<Json<NewSubject>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Json(body) = payload?;
  body.validate()?;

  let subject = state
    .store
    .add_subject(user.user_id, body)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(subject_id = %subject.subject_id, creator = %user.user_id, "subject created");
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entities/subjects/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SubjectView>, ApiError>
where
  S: BoardStore + Clone + 'static,
{
  let Path(id) = path?;
  let view = state
    .store
    .subject_view(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(view))
}
