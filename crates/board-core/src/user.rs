//! Users, registration input and sessions.
//!
//! Other records reference users by `user_id` only; the public face of a user
//! is [`UserSummary`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  /// Unique login handle; an e-mail address.
  pub username:      String,
  /// argon2 PHC string.
  pub password_hash: String,
  pub display_name:  String,
  /// Formatted as `(###) ###-####`.
  pub phone:         String,
  pub created_at:    DateTime<Utc>,
}

/// The fields of a [`User`] that are safe to show to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
  pub user_id:      Uuid,
  pub username:     String,
  pub display_name: String,
}

impl From<&User> for UserSummary {
  fn from(u: &User) -> Self {
    Self {
      user_id:      u.user_id,
      username:     u.username.clone(),
      display_name: u.display_name.clone(),
    }
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

/// Raw registration input, before the password is hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub username:     String,
  pub password:     String,
  pub display_name: String,
  pub phone:        String,
}

impl Registration {
  /// Check every field, returning the first problem found.
  pub fn validate(&self) -> Result<()> {
    if !is_email(&self.username) {
      return Err(Error::Validation(
        "A valid email address is required as userid.".into(),
      ));
    }
    if !is_strong_password(&self.password) {
      return Err(Error::Validation(
        "Password must be at least 8 characters, include uppercase, lowercase, and a digit."
          .into(),
      ));
    }
    if self.display_name.chars().count() < 2 {
      return Err(Error::Validation("Display name is required.".into()));
    }
    if !is_phone(&self.phone) {
      return Err(Error::Validation(
        "Phone number must be in the format (###) ###-####".into(),
      ));
    }
    Ok(())
  }

  /// Convert into a store input once the password has been hashed.
  pub fn into_new_user(self, password_hash: String) -> NewUser {
    NewUser {
      username: self.username,
      password_hash,
      display_name: self.display_name,
      phone: self.phone,
    }
  }
}

/// Input to [`crate::store::BoardStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub display_name:  String,
  pub phone:         String,
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
/// with text on both sides.
fn is_email(s: &str) -> bool {
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

fn is_strong_password(s: &str) -> bool {
  s.chars().count() >= 8
    && s.chars().any(|c| c.is_ascii_lowercase())
    && s.chars().any(|c| c.is_ascii_uppercase())
    && s.chars().any(|c| c.is_ascii_digit())
}

fn is_phone(s: &str) -> bool {
  const PATTERN: &[u8] = b"(###) ###-####";
  s.len() == PATTERN.len()
    && s
      .bytes()
      .zip(PATTERN)
      .all(|(b, &p)| if p == b'#' { b.is_ascii_digit() } else { b == p })
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A server-side login session. The store keys it by the digest of the bearer
/// token; the token itself is only ever held by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}
