//! Subject: a discussion topic that comments hang off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  engagement::{Engageable, Engagement, EntityKind},
};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// A discussion subject. Immutable after creation except for `engagement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub creator_id:  Uuid,
  pub created_at:  DateTime<Utc>,
  #[serde(flatten)]
  pub engagement:  Engagement,
}

impl Engageable for Subject {
  const KIND: EntityKind = EntityKind::Subject;

  fn id(&self) -> Uuid { self.subject_id }

  fn engagement(&self) -> &Engagement { &self.engagement }

  fn engagement_mut(&mut self) -> &mut Engagement { &mut self.engagement }
}

/// Input to [`crate::store::BoardStore::add_subject`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub title:       String,
  pub description: String,
}

impl NewSubject {
  pub fn validate(&self) -> Result<()> {
    let title = self.title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
      return Err(Error::Validation(format!(
        "Title is required and must be at most {TITLE_MAX_CHARS} characters."
      )));
    }
    let description = self.description.trim();
    if description.is_empty() || description.chars().count() > DESCRIPTION_MAX_CHARS {
      return Err(Error::Validation(format!(
        "Description is required and must be at most {DESCRIPTION_MAX_CHARS} characters."
      )));
    }
    Ok(())
  }
}
