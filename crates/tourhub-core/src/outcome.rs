//! The uniform operation result handed to front ends.
//!
//! Credential operations never return `Err` for expected failures. Every
//! caller gets the same `{success, data?, error?, message?}` shape and
//! renders `error` or `message` inline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  /// User-facing failure text.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
  /// User-facing informational text on success.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind:    Option<ErrorKind>,
}

impl<T> Outcome<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      data:    Some(data),
      error:   None,
      message: None,
      kind:    None,
    }
  }

  /// Success without a payload, carrying only a message.
  pub fn done(message: impl Into<String>) -> Self {
    Self {
      success: true,
      data:    None,
      error:   None,
      message: Some(message.into()),
      kind:    None,
    }
  }

  /// Failure with an explicit user-facing message.
  pub fn fail(kind: ErrorKind, error: impl Into<String>) -> Self {
    Self {
      success: false,
      data:    None,
      error:   Some(error.into()),
      message: None,
      kind:    Some(kind),
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn is_success(&self) -> bool { self.success }

  /// Drop the payload, keeping status and messages.
  pub fn discard(self) -> Outcome<()> {
    Outcome {
      success: self.success,
      data:    self.data.map(|_| ()),
      error:   self.error,
      message: self.message,
      kind:    self.kind,
    }
  }
}

impl Outcome<()> {
  /// Success with neither payload nor message.
  pub fn empty() -> Self {
    Self {
      success: true,
      data:    None,
      error:   None,
      message: None,
      kind:    None,
    }
  }
}

impl<T> From<Error> for Outcome<T> {
  fn from(err: Error) -> Self { Self::fail(err.kind(), err.to_string()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_serialises_without_data() {
    let outcome: Outcome<u32> = Error::validation("Email and password are required").into();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "success": false,
        "error": "Email and password are required",
        "kind": "validation",
      })
    );
  }

  #[test]
  fn not_authenticated_message() {
    let outcome: Outcome<()> = Error::NotAuthenticated.into();
    assert_eq!(outcome.error.as_deref(), Some("No user logged in"));
    assert_eq!(outcome.kind, Some(ErrorKind::NotAuthenticated));
  }

  #[test]
  fn done_carries_message_only() {
    let outcome: Outcome<()> = Outcome::done("Password updated successfully");
    assert!(outcome.is_success());
    assert!(outcome.data.is_none());
    assert_eq!(outcome.message.as_deref(), Some("Password updated successfully"));
  }
}
