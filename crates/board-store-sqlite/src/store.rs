//! [`SqliteStore`], the SQLite implementation of [`BoardStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use board_core::{
  comment::{Comment, NewComment},
  engagement::{Engageable, Engagement, EntityKind},
  store::{BoardStore, EngagementStore},
  subject::{NewSubject, Subject},
  user::{NewUser, Session, User},
  view::{CommentView, SubjectView},
};

use crate::{
  Error, Result,
  encode::{
    RawComment, RawCommentView, RawSession, RawSubject, RawSubjectView, RawUser,
    encode_dt, encode_user_set, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Subjects joined with their creator and a grouped comment count. The count
/// is aggregated from `comments` at read time; it is never stored.
const SUBJECT_VIEW_SELECT: &str = "
  SELECT s.subject_id, s.title, s.description, s.creator_id, s.created_at,
         s.liked_by, s.disliked_by,
         u.username, u.display_name,
         COALESCE(cc.n, 0)
  FROM subjects s
  JOIN users u ON u.user_id = s.creator_id
  LEFT JOIN (
    SELECT subject_id, COUNT(*) AS n FROM comments GROUP BY subject_id
  ) cc ON cc.subject_id = s.subject_id";

const COMMENT_VIEW_SELECT: &str = "
  SELECT c.comment_id, c.subject_id, c.author_id, c.content, c.created_at,
         c.liked_by, c.disliked_by,
         u.username, u.display_name
  FROM comments c
  JOIN users u ON u.user_id = c.author_id";

const SUBJECT_COLUMNS: &str =
  "subject_id, title, description, creator_id, created_at, liked_by, disliked_by";

const COMMENT_COLUMNS: &str =
  "comment_id, subject_id, author_id, content, created_at, liked_by, disliked_by";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A board store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_user(&self, column: &'static str, value: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE {column} = ?1", RawUser::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  /// Overwrite the like/dislike columns of one subject or comment.
  async fn write_engagement(
    &self,
    kind: EntityKind,
    id: Uuid,
    engagement: &Engagement,
  ) -> Result<()> {
    let sql = match kind {
      EntityKind::Subject => {
        "UPDATE subjects SET liked_by = ?1, disliked_by = ?2 WHERE subject_id = ?3"
      }
      EntityKind::Comment => {
        "UPDATE comments SET liked_by = ?1, disliked_by = ?2 WHERE comment_id = ?3"
      }
    };
    let liked_str    = encode_user_set(&engagement.liked_by)?;
    let disliked_str = encode_user_set(&engagement.disliked_by)?;
    let id_str       = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(sql, rusqlite::params![liked_str, disliked_str, id_str])?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EntityNotFound(kind, id));
    }

    tracing::debug!(
      %kind,
      %id,
      likes = engagement.likes(),
      dislikes = engagement.dislikes(),
      "engagement persisted"
    );
    Ok(())
  }
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      display_name:  input.display_name,
      phone:         input.phone,
      created_at:    now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let username  = user.username.clone();
    let hash      = user.password_hash.clone();
    let display   = user.display_name.clone();
    let phone     = user.phone.clone();
    let at_str    = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, password_hash, display_name, phone, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, hash, display, phone, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.find_user("user_id", encode_uuid(id)).await
  }

  async fn find_user_by_username(&self, username: String) -> Result<Option<User>> {
    self.find_user("username", username).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    token_digest: String,
    user_id:      Uuid,
    expires_at:   DateTime<Utc>,
  ) -> Result<Session> {
    let session = Session { user_id, created_at: now(), expires_at };

    let user_str    = encode_uuid(user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_digest, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, token_digest: String) -> Result<Option<Session>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, created_at, expires_at FROM sessions WHERE token_digest = ?1",
              rusqlite::params![token_digest],
              |row| {
                Ok(RawSession {
                  user_id:    row.get(0)?,
                  created_at: row.get(1)?,
                  expires_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, token_digest: String) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_digest = ?1",
          rusqlite::params![token_digest],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(removed)
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, creator_id: Uuid, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id:  Uuid::new_v4(),
      title:       input.title.trim().to_owned(),
      description: input.description.trim().to_owned(),
      creator_id,
      created_at:  now(),
      engagement:  Engagement::default(),
    };

    let id_str      = encode_uuid(subject.subject_id);
    let title       = subject.title.clone();
    let description = subject.description.clone();
    let creator_str = encode_uuid(creator_id);
    let at_str      = encode_dt(subject.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, title, description, creator_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, title, description, creator_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSubject::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn subject_view(&self, id: Uuid) -> Result<Option<SubjectView>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubjectView> = self
      .conn
      .call(move |conn| {
        let sql = format!("{SUBJECT_VIEW_SELECT} WHERE s.subject_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSubjectView::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubjectView::into_view).transpose()
  }

  async fn list_subject_views(&self) -> Result<Vec<SubjectView>> {
    let raws: Vec<RawSubjectView> = self
      .conn
      .call(|conn| {
        let sql = format!("{SUBJECT_VIEW_SELECT} ORDER BY s.created_at DESC, s.rowid DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawSubjectView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubjectView::into_view).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, author_id: Uuid, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      subject_id: input.subject_id,
      author_id,
      content:    input.content.trim().to_owned(),
      created_at: now(),
      engagement: Engagement::default(),
    };

    let id_str      = encode_uuid(comment.comment_id);
    let subject_str = encode_uuid(comment.subject_id);
    let author_str  = encode_uuid(author_id);
    let content     = comment.content.clone();
    let at_str      = encode_dt(comment.created_at);

    // Existence check and insert run on the same connection call, so the
    // subject cannot vanish in between (subjects are never deleted anyway).
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM subjects WHERE subject_id = ?1",
            rusqlite::params![subject_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO comments (comment_id, subject_id, author_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, subject_str, author_str, content, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::SubjectNotFound(comment.subject_id));
    }
    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawComment::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn comment_view(&self, id: Uuid) -> Result<Option<CommentView>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCommentView> = self
      .conn
      .call(move |conn| {
        let sql = format!("{COMMENT_VIEW_SELECT} WHERE c.comment_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawCommentView::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCommentView::into_view).transpose()
  }

  async fn list_comment_views(&self, subject_id: Uuid) -> Result<Vec<CommentView>> {
    let subject_str = encode_uuid(subject_id);

    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{COMMENT_VIEW_SELECT} WHERE c.subject_id = ?1 ORDER BY c.created_at ASC, c.rowid ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![subject_str], RawCommentView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommentView::into_view).collect()
  }
}

// ─── EngagementStore impls ───────────────────────────────────────────────────

impl EngagementStore<Subject> for SqliteStore {
  async fn load_engageable(&self, id: Uuid) -> Result<Option<Subject>> {
    self.get_subject(id).await
  }

  async fn persist_engagement<'a>(&'a self, entity: &'a Subject) -> Result<()> {
    self
      .write_engagement(Subject::KIND, entity.id(), entity.engagement())
      .await
  }
}

impl EngagementStore<Comment> for SqliteStore {
  async fn load_engageable(&self, id: Uuid) -> Result<Option<Comment>> {
    self.get_comment(id).await
  }

  async fn persist_engagement<'a>(&'a self, entity: &'a Comment) -> Result<()> {
    self
      .write_engagement(Comment::KIND, entity.id(), entity.engagement())
      .await
  }
}
