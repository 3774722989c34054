//! The `AuthBackend` trait and its request/response types.
//!
//! The trait covers both hosted collaborators the client talks to: the
//! identity service (sessions and credentials) and the profile table. It is
//! implemented by `tourhub-supabase`; the session store depends only on this
//! abstraction so tests can inject an in-memory backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  identity::Identity,
  profile::{Profile, ProfileChanges},
  role::Role,
  session::{AuthChange, Session},
};

// ─── Request / response types ────────────────────────────────────────────────

/// Input to [`AuthBackend::sign_up`]. Fields are already validated and
/// trimmed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpRequest {
  pub email:       String,
  pub password:    String,
  pub full_name:   String,
  pub role:        Role,
  /// Where the confirmation link should land.
  pub redirect_to: Option<String>,
}

/// What the identity service returns from a sign-up.
///
/// With email confirmation enabled there is no session until the link is
/// followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpResponse {
  pub user:    Option<Identity>,
  pub session: Option<Session>,
}

/// Attributes accepted by [`AuthBackend::update_user`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAttributes {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hosted identity service and profile store.
///
/// Every call is attempted exactly once. Implementations report transport
/// failures as [`crate::Error::ServiceUnavailable`] and structured backend
/// errors as [`crate::Error::Rejected`] once converted.
///
/// All methods return `Send` futures so the session store can run profile
/// fetches on spawned tasks.
pub trait AuthBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Return the persisted session, if any.
  fn get_session(
    &self,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Subscribe to session-change notifications. Dropping the receiver
  /// unsubscribes.
  fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

  // ── Credentials ───────────────────────────────────────────────────────

  fn sign_in_with_password<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  fn sign_up<'a>(
    &'a self,
    request: &'a SignUpRequest,
  ) -> impl Future<Output = Result<SignUpResponse, Self::Error>> + Send + 'a;

  /// Invalidate the current session on the server.
  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Send a password-reset link to `email`.
  fn reset_password_for_email<'a>(
    &'a self,
    email: &'a str,
    redirect_to: Option<&'a str>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Change the signed-in user's email and/or password.
  fn update_user<'a>(
    &'a self,
    attributes: &'a UserAttributes,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + 'a;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Fetch the profile row for `user_id`. Returns `None` if there is none.
  fn fetch_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Patch the profile row for `user_id` and return the row as stored.
  fn update_profile<'a>(
    &'a self,
    user_id: Uuid,
    changes: &'a ProfileChanges,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + 'a;
}
