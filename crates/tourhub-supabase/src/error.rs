//! Error type for `tourhub-supabase`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never produced an HTTP response.
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),

  /// The service answered with an error status.
  #[error("{message}")]
  Api { status: u16, message: String },

  #[error("unexpected response body: {0}")]
  Decode(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("session file error: {0}")]
  Io(#[from] std::io::Error),

  #[error("no active session")]
  NoSession,
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode(err.to_string())
    } else {
      Self::Transport(err)
    }
  }
}

impl From<Error> for tourhub_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Transport(e) => Self::ServiceUnavailable(e.to_string()),
      Error::Io(e) => Self::ServiceUnavailable(e.to_string()),
      Error::Api { message, .. } => Self::Rejected(message),
      Error::NoSession => Self::NotAuthenticated,
      Error::Decode(message) => Self::Unexpected(message),
      Error::Json(e) => Self::Unexpected(e.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
