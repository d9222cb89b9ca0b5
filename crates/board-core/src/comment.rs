//! Comment: a reply posted on a subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  engagement::{Engageable, Engagement, EntityKind},
};

/// A comment on a subject. Immutable after creation except for `engagement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub subject_id: Uuid,
  pub author_id:  Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub engagement: Engagement,
}

impl Engageable for Comment {
  const KIND: EntityKind = EntityKind::Comment;

  fn id(&self) -> Uuid { self.comment_id }

  fn engagement(&self) -> &Engagement { &self.engagement }

  fn engagement_mut(&mut self) -> &mut Engagement { &mut self.engagement }
}

/// Input to [`crate::store::BoardStore::add_comment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
  /// The subject being commented on.
  #[serde(alias = "subject")]
  pub subject_id: Uuid,
  pub content:    String,
}

impl NewComment {
  pub fn validate(&self) -> Result<()> {
    if self.content.trim().is_empty() {
      return Err(Error::Validation("Comment content is required.".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_content_is_rejected() {
    let c = NewComment { subject_id: Uuid::new_v4(), content: " \n ".into() };
    assert!(c.validate().is_err());
  }

  #[test]
  fn accepts_subject_alias() {
    let id = Uuid::new_v4();
    let c: NewComment =
      serde_json::from_value(serde_json::json!({ "subject": id, "content": "hi" })).unwrap();
    assert_eq!(c.subject_id, id);
    assert!(c.validate().is_ok());
  }
}
