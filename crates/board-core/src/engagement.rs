//! Like/dislike engagement shared by subjects and comments.
//!
//! An [`Engagement`] holds two disjoint sets of user ids. Every mutation goes
//! through [`Engagement::apply`], which first clears the user from both sets
//! and then inserts into at most one of them, so a user never holds both
//! stances at once.
//!
//! The engine ([`toggle`]) is a pure three-way set transition. Detecting a
//! repeated click ("already liked, clicked like again") is the caller's job;
//! see [`resolve_toggle`].

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::EngagementStore};

// ─── Entity kinds ────────────────────────────────────────────────────────────

/// The two kinds of record engagement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Subject,
  Comment,
}

impl EntityKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Subject => "subject",
      Self::Comment => "comment",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Stance / Action ─────────────────────────────────────────────────────────

/// A position a user currently holds on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
  Like,
  Dislike,
}

/// The request accepted by [`toggle`].
///
/// On the wire this is `"like"`, `"dislike"` or `null` (removal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Stance>", into = "Option<Stance>")]
pub enum Action {
  Like,
  Dislike,
  /// Explicit removal: the user ends up in neither set.
  None,
}

impl Action {
  /// Parse the `action` member of a request body.
  ///
  /// `null` means [`Action::None`]. Anything other than the strings `"like"`
  /// and `"dislike"` is rejected, including the string `"null"`.
  pub fn from_json(value: &serde_json::Value) -> Result<Self> {
    match value {
      serde_json::Value::Null => Ok(Self::None),
      serde_json::Value::String(s) => s.parse(),
      other => Err(Error::InvalidAction(other.to_string())),
    }
  }

  /// The stance this action leaves the user holding.
  pub fn stance(self) -> Option<Stance> {
    match self {
      Self::Like => Some(Stance::Like),
      Self::Dislike => Some(Stance::Dislike),
      Self::None => None,
    }
  }
}

impl FromStr for Action {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "like" => Ok(Self::Like),
      "dislike" => Ok(Self::Dislike),
      other => Err(Error::InvalidAction(format!("{other:?}"))),
    }
  }
}

impl From<Option<Stance>> for Action {
  fn from(stance: Option<Stance>) -> Self {
    match stance {
      Some(Stance::Like) => Self::Like,
      Some(Stance::Dislike) => Self::Dislike,
      None => Self::None,
    }
  }
}

impl From<Action> for Option<Stance> {
  fn from(action: Action) -> Self { action.stance() }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Like => "like",
      Self::Dislike => "dislike",
      Self::None => "none",
    })
  }
}

/// Caller-side toggle policy: clicking the stance you already hold removes
/// it, anything else switches to the requested stance.
pub fn resolve_toggle(current: Option<Stance>, requested: Stance) -> Action {
  if current == Some(requested) {
    Action::None
  } else {
    Action::from(Some(requested))
  }
}

// ─── Engagement ──────────────────────────────────────────────────────────────

/// The like/dislike membership of one entity.
///
/// Serialises as `{"likes": [...], "dislikes": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
  #[serde(rename = "likes")]
  pub liked_by:    BTreeSet<Uuid>,
  #[serde(rename = "dislikes")]
  pub disliked_by: BTreeSet<Uuid>,
}

impl Engagement {
  /// Apply `action` on behalf of `user`.
  pub fn apply(&mut self, user: Uuid, action: Action) {
    self.liked_by.remove(&user);
    self.disliked_by.remove(&user);
    match action {
      Action::Like => {
        self.liked_by.insert(user);
      }
      Action::Dislike => {
        self.disliked_by.insert(user);
      }
      Action::None => {}
    }
  }

  pub fn stance_of(&self, user: Uuid) -> Option<Stance> {
    if self.liked_by.contains(&user) {
      Some(Stance::Like)
    } else if self.disliked_by.contains(&user) {
      Some(Stance::Dislike)
    } else {
      None
    }
  }

  pub fn likes(&self) -> usize { self.liked_by.len() }

  pub fn dislikes(&self) -> usize { self.disliked_by.len() }

  /// Likes minus dislikes. May be negative.
  pub fn score(&self) -> i64 { self.likes() as i64 - self.dislikes() as i64 }
}

// ─── Engageable ──────────────────────────────────────────────────────────────

/// A record that carries an [`Engagement`] and can be toggled.
pub trait Engageable: Send + Sync {
  const KIND: EntityKind;

  fn id(&self) -> Uuid;

  fn engagement(&self) -> &Engagement;

  fn engagement_mut(&mut self) -> &mut Engagement;

  fn score(&self) -> i64 { self.engagement().score() }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Load entity `id`, apply `action` for `user`, persist, and return the
/// updated entity. Returns `Ok(None)` without writing anything if the entity
/// does not exist.
///
/// This is a read-modify-write with no version check: two concurrent toggles
/// by the same user on the same entity may race, and the later write wins.
pub async fn toggle<E, S>(
  store: &S,
  id: Uuid,
  user: Uuid,
  action: Action,
) -> Result<Option<E>, S::Error>
where
  E: Engageable,
  S: EngagementStore<E>,
{
  let Some(mut entity) = store.load_engageable(id).await? else {
    return Ok(None);
  };

  entity.engagement_mut().apply(user, action);
  store.persist_engagement(&entity).await?;

  Ok(Some(entity))
}
