//! The CLI's authenticated-session context.
//!
//! A [`Session`] is created by `login`, written to a TOML file, and passed
//! explicitly to every command that needs an identity. The user id used for
//! "did I already like this" comes from here, never from the token.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use board_core::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       UserSummary,
}

impl Session {
  /// Read the session file, failing with a helpful message if there is no
  /// usable session.
  pub fn load(path: &Path) -> Result<Self> {
    let raw = match std::fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        bail!("not logged in (no session at {}); run `board login`", path.display())
      }
      Err(e) => {
        return Err(e).with_context(|| format!("reading session file {}", path.display()));
      }
    };
    let session: Self = toml::from_str(&raw).context("parsing session file")?;
    if session.expires_at <= Utc::now() {
      bail!("session expired at {}; run `board login`", session.expires_at);
    }
    Ok(session)
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    }
    let raw = toml::to_string(self).context("serialising session")?;
    std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
  }

  /// Delete the session file; a missing file is not an error.
  pub fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
  }
}

/// `$HOME/.config/board/session.toml`, or `board-session.toml` in the
/// working directory when `HOME` is unset.
pub fn default_path() -> PathBuf {
  match std::env::var("HOME") {
    Ok(home) => PathBuf::from(home).join(".config/board/session.toml"),
    Err(_) => PathBuf::from("board-session.toml"),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use tempfile::TempDir;
  use uuid::Uuid;

  use super::*;

  fn session(expires_at: DateTime<Utc>) -> Session {
    Session {
      token: "tok".into(),
      expires_at,
      user: UserSummary {
        user_id:      Uuid::new_v4(),
        username:     "ada@example.com".into(),
        display_name: "Ada".into(),
      },
    }
  }

  #[test]
  fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("session.toml");
    let s = session(Utc::now() + Duration::hours(1));
    s.save(&path).unwrap();
    assert_eq!(Session::load(&path).unwrap(), s);
    Session::clear(&path).unwrap();
    assert!(Session::load(&path).is_err());
    Session::clear(&path).unwrap();
  }

  #[test]
  fn expired_session_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("expired.toml");
    session(Utc::now() - Duration::seconds(5)).save(&path).unwrap();
    let err = Session::load(&path).unwrap_err();
    assert!(err.to_string().contains("expired"));
  }
}
