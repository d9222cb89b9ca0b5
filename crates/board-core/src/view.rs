//! Read models returned by listings. Never stored, always derived.
//!
//! `score` and `comment_count` are computed from source data every time a
//! view is built.

use serde::{Deserialize, Serialize};

use crate::{comment::Comment, subject::Subject, user::UserSummary};

/// A subject joined with its creator and derived counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectView {
  #[serde(flatten)]
  pub subject:       Subject,
  pub creator:       UserSummary,
  /// Number of comments referencing this subject at read time.
  pub comment_count: u64,
  pub score:         i64,
}

impl SubjectView {
  pub fn new(subject: Subject, creator: UserSummary, comment_count: u64) -> Self {
    let score = subject.engagement.score();
    Self { subject, creator, comment_count, score }
  }
}

/// A comment joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  #[serde(flatten)]
  pub comment: Comment,
  pub author:  UserSummary,
  pub score:   i64,
}

impl CommentView {
  pub fn new(comment: Comment, author: UserSummary) -> Self {
    let score = comment.engagement.score();
    Self { comment, author, score }
  }
}
