//! The `BoardStore` and `EngagementStore` traits.
//!
//! The traits are implemented by storage backends (e.g. `board-store-sqlite`).
//! Higher layers (`board-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  comment::{Comment, NewComment},
  engagement::Engageable,
  subject::{NewSubject, Subject},
  user::{NewUser, Session, User},
  view::{CommentView, SubjectView},
};

// ─── BoardStore ──────────────────────────────────────────────────────────────

/// Abstraction over a board storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails if the username is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Record a session keyed by `token_digest`, valid until `expires_at`.
  fn create_session(
    &self,
    token_digest: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a session by token digest. Expired sessions are still returned;
  /// callers check [`Session::is_expired`].
  fn get_session(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Returns `true` if a session was removed.
  fn delete_session(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Drop every session that expired at or before `now`; returns how many.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Persist a new subject with empty engagement. Input is assumed valid.
  fn add_subject(
    &self,
    creator_id: Uuid,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn subject_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SubjectView>, Self::Error>> + Send + '_;

  /// All subjects with creator and comment count, newest first.
  fn list_subject_views(
    &self,
  ) -> impl Future<Output = Result<Vec<SubjectView>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a new comment with empty engagement. The subject must exist.
  fn add_comment(
    &self,
    author_id: Uuid,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn comment_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CommentView>, Self::Error>> + Send + '_;

  /// Comments on `subject_id` with their authors, oldest first.
  fn list_comment_views(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CommentView>, Self::Error>> + Send + '_;
}

// ─── EngagementStore ─────────────────────────────────────────────────────────

/// Load and persist an [`Engageable`] entity for the toggle engine
/// ([`crate::engagement::toggle`]).
pub trait EngagementStore<E: Engageable>: BoardStore {
  /// Load the entity with id `id`, or `None` if it does not exist.
  fn load_engageable(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// Write back the entity's like/dislike sets. No other field is touched.
  fn persist_engagement<'a>(
    &'a self,
    entity: &'a E,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
