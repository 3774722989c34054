//! Error types for `tourhub-core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Client-side input check failed; no backend call was made.
  #[error("{0}")]
  Validation(String),

  #[error("No user logged in")]
  NotAuthenticated,

  /// The backend could not be reached (network or transport failure).
  #[error("service unavailable: {0}")]
  ServiceUnavailable(String),

  /// The backend answered with a structured error.
  #[error("{0}")]
  Rejected(String),

  /// The backend answered with something the client could not read.
  #[error("unexpected response: {0}")]
  Unexpected(String),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn rejected(message: impl Into<String>) -> Self {
    Self::Rejected(message.into())
  }

  pub fn unavailable(message: impl Into<String>) -> Self {
    Self::ServiceUnavailable(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::NotAuthenticated => ErrorKind::NotAuthenticated,
      Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
      Self::Rejected(_) => ErrorKind::Rejected,
      Self::Unexpected(_) => ErrorKind::Unexpected,
    }
  }
}

/// Machine-readable category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  NotAuthenticated,
  ServiceUnavailable,
  Rejected,
  Unexpected,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
