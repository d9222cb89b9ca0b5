//! Error types for `board-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An engagement action outside `like`, `dislike` and `null`.
  #[error("Invalid action: {0}")]
  InvalidAction(String),

  /// User input rejected before it reaches the store. The message is meant
  /// to be shown to the user as-is.
  #[error("{0}")]
  Validation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
