//! Sessions and session-change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// The transient validity window of an authenticated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub access_token:  String,
  #[serde(default)]
  pub refresh_token: Option<String>,
  #[serde(default)]
  pub expires_at:    Option<DateTime<Utc>>,
  /// The principal this session belongs to. A session without a user is
  /// treated exactly like no session at all.
  #[serde(default)]
  pub user:          Option<Identity>,
}

impl Session {
  pub fn identity(&self) -> Option<&Identity> { self.user.as_ref() }

  /// True once `expires_at` has passed. Sessions without an expiry never
  /// expire on the client side.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at <= now)
  }
}

/// Kind of session change reported by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
  InitialSession,
  SignedIn,
  SignedOut,
  TokenRefreshed,
  UserUpdated,
  /// The user followed a password-recovery link.
  PasswordRecovery,
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
  pub event:   AuthEvent,
  pub session: Option<Session>,
}

impl AuthChange {
  pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
    Self { event, session }
  }
}
