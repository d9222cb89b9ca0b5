//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! User-id sets are stored as compact JSON arrays. UUIDs are stored as
//! hyphenated lowercase strings.

use std::collections::BTreeSet;

use board_core::{
  comment::Comment,
  engagement::Engagement,
  subject::Subject,
  user::{Session, User, UserSummary},
  view::{CommentView, SubjectView},
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time truncated to what the store can represent, so a value
/// returned from a write equals the value read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── User-id sets ────────────────────────────────────────────────────────────

pub fn encode_user_set(set: &BTreeSet<Uuid>) -> Result<String> {
  Ok(serde_json::to_string(set)?)
}

pub fn decode_user_set(s: &str) -> Result<BTreeSet<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

pub fn decode_engagement(liked_by: &str, disliked_by: &str) -> Result<Engagement> {
  Ok(Engagement {
    liked_by:    decode_user_set(liked_by)?,
    disliked_by: decode_user_set(disliked_by)?,
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub display_name:  String,
  pub phone:         String,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, username, password_hash, display_name, phone, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      display_name:  row.get(3)?,
      phone:         row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      display_name:  self.display_name,
      phone:         self.phone,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub user_id:    String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

/// Raw strings read from a `subjects` row (columns 0..=6).
pub struct RawSubject {
  pub subject_id:  String,
  pub title:       String,
  pub description: String,
  pub creator_id:  String,
  pub created_at:  String,
  pub liked_by:    String,
  pub disliked_by: String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:  row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      creator_id:  row.get(3)?,
      created_at:  row.get(4)?,
      liked_by:    row.get(5)?,
      disliked_by: row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:  decode_uuid(&self.subject_id)?,
      title:       self.title,
      description: self.description,
      creator_id:  decode_uuid(&self.creator_id)?,
      created_at:  decode_dt(&self.created_at)?,
      engagement:  decode_engagement(&self.liked_by, &self.disliked_by)?,
    })
  }
}

/// A subject row joined with its creator (columns 7..=8) and the grouped
/// comment count (column 9).
pub struct RawSubjectView {
  pub subject:       RawSubject,
  pub username:      String,
  pub display_name:  String,
  pub comment_count: i64,
}

impl RawSubjectView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject:       RawSubject::from_row(row)?,
      username:      row.get(7)?,
      display_name:  row.get(8)?,
      comment_count: row.get(9)?,
    })
  }

  pub fn into_view(self) -> Result<SubjectView> {
    let subject = self.subject.into_subject()?;
    let creator = UserSummary {
      user_id:      subject.creator_id,
      username:     self.username,
      display_name: self.display_name,
    };
    Ok(SubjectView::new(subject, creator, self.comment_count.max(0) as u64))
  }
}

/// Raw strings read from a `comments` row (columns 0..=6).
pub struct RawComment {
  pub comment_id:  String,
  pub subject_id:  String,
  pub author_id:   String,
  pub content:     String,
  pub created_at:  String,
  pub liked_by:    String,
  pub disliked_by: String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:  row.get(0)?,
      subject_id:  row.get(1)?,
      author_id:   row.get(2)?,
      content:     row.get(3)?,
      created_at:  row.get(4)?,
      liked_by:    row.get(5)?,
      disliked_by: row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      engagement: decode_engagement(&self.liked_by, &self.disliked_by)?,
    })
  }
}

/// A comment row joined with its author (columns 7..=8).
pub struct RawCommentView {
  pub comment:      RawComment,
  pub username:     String,
  pub display_name: String,
}

impl RawCommentView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment:      RawComment::from_row(row)?,
      username:     row.get(7)?,
      display_name: row.get(8)?,
    })
  }

  pub fn into_view(self) -> Result<CommentView> {
    let comment = self.comment.into_comment()?;
    let author = UserSummary {
      user_id:      comment.author_id,
      username:     self.username,
      display_name: self.display_name,
    };
    Ok(CommentView::new(comment, author))
  }
}
