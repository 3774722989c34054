//! Identity: the backend-issued authenticated principal.
//!
//! The application never mutates an identity directly; email and password
//! changes go through the identity service, which hands back a new record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form metadata attached to an identity at sign-up.
///
/// Only `full_name` and `role` are interpreted; anything else the backend
/// returns is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_name: Option<String>,
  /// Role hint recorded at sign-up. A profile role takes precedence.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:      Option<String>,
  #[serde(flatten)]
  pub extra:     serde_json::Map<String, serde_json::Value>,
}

/// The authenticated principal as issued by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  pub id:                 Uuid,
  #[serde(default)]
  pub email:              Option<String>,
  /// Set once the user has clicked the confirmation link.
  #[serde(default)]
  pub email_confirmed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub user_metadata:      UserMetadata,
}

impl Identity {
  /// Convenience constructor with no metadata and an unconfirmed email.
  pub fn new(id: Uuid, email: impl Into<String>) -> Self {
    Self {
      id,
      email: Some(email.into()),
      email_confirmed_at: None,
      user_metadata: UserMetadata::default(),
    }
  }

  pub fn is_verified(&self) -> bool { self.email_confirmed_at.is_some() }

  /// The part of the email address before the `@`, if any.
  pub fn email_local_part(&self) -> Option<&str> {
    self
      .email
      .as_deref()
      .and_then(|e| e.split('@').next())
      .filter(|s| !s.is_empty())
  }
}
