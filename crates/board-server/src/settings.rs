//! Runtime server configuration.
//!
//! Values come from an optional TOML file layered under `BOARD_*`
//! environment variables (e.g. `BOARD_PORT=8080`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("board.sqlite3") }

fn default_session_ttl_secs() -> i64 { 3600 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// How long a login session stays valid.
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs: i64,
}

impl ServerConfig {
  /// Load from `path` (missing file is fine) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("BOARD"))
      .build()
      .context("failed to read config file")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    if cfg.session_ttl_secs <= 0 {
      anyhow::bail!("session_ttl_secs must be positive, got {}", cfg.session_ttl_secs);
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.session_ttl_secs)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(src: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(src, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_apply_to_empty_file() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:5000");
    assert_eq!(cfg.store_path, PathBuf::from("board.sqlite3"));
    assert_eq!(cfg.session_ttl(), chrono::Duration::hours(1));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 8080
        store_path = "/var/lib/board.db"
        session_ttl_secs = 60
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.session_ttl(), chrono::Duration::minutes(1));
  }

  #[test]
  fn tilde_is_expanded_only_at_start() {
    let plain = Path::new("data/board.db");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/b.db")), PathBuf::from(home).join("b.db"));
    }
  }
}
