//! [`SessionStore`]: the injectable auth state container.
//!
//! # Lifecycle
//!
//! 1. [`SessionStore::mount`] enters `Loading`, subscribes to change
//!    notifications and asks the backend for the persisted session.
//! 2. The session lookup and every later notification go through one
//!    synchronous handler. An identity moves the store to `Authenticated`
//!    and starts a detached profile fetch; no identity moves it to
//!    `Anonymous`.
//! 3. The profile fetch only ever touches the nested profile state.
//! 4. [`SessionStore::unmount`] stops listening for notifications.
//!
//! All credential operations return an [`Outcome`] and never fail the store.

use std::sync::{
  Arc, Mutex, PoisonError, Weak,
  atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use serde::Deserialize;
use tokio::{
  sync::{broadcast::error::RecvError, watch},
  task::JoinHandle,
};
use tourhub_core::{
  Error, Outcome,
  backend::{AuthBackend, SignUpRequest, SignUpResponse, UserAttributes},
  identity::Identity,
  profile::{Profile, ProfileChanges},
  role::Role,
  session::{AuthEvent, Session},
  validate,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  messages,
  state::{AuthState, ProfileState},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings that shape the links the backend emails out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
  /// Public origin of the front end, e.g. `https://tourismhub.com`.
  /// Empty means "let the backend use its default redirect".
  #[serde(default)]
  pub site_url: String,
}

impl SessionConfig {
  pub fn new(site_url: impl Into<String>) -> Self {
    Self { site_url: site_url.into() }
  }

  fn link(&self, path: &str) -> Option<String> {
    if self.site_url.is_empty() {
      None
    } else {
      Some(format!("{}{}", self.site_url.trim_end_matches('/'), path))
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Auth state container shared by every consumer.
///
/// Cheap to clone; all clones observe the same state.
pub struct SessionStore<B> {
  inner: Arc<Inner<B>>,
}

impl<B> Clone for SessionStore<B> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

struct Inner<B> {
  backend:       Arc<B>,
  config:        SessionConfig,
  state:         watch::Sender<AuthState>,
  /// Bumped whenever a profile result in flight becomes stale.
  profile_epoch: AtomicU64,
  listener:      Mutex<Option<JoinHandle<()>>>,
}

impl<B> SessionStore<B>
where
  B: AuthBackend + 'static,
{
  pub fn new(backend: Arc<B>, config: SessionConfig) -> Self {
    let (state, _) = watch::channel(AuthState::Uninitialized);
    Self {
      inner: Arc::new(Inner {
        backend,
        config,
        state,
        profile_epoch: AtomicU64::new(0),
        listener: Mutex::new(None),
      }),
    }
  }

  pub fn backend(&self) -> &Arc<B> { &self.inner.backend }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Start the store: enter `Loading`, subscribe to notifications and look
  /// up the persisted session in the background.
  ///
  /// Must be called from within a tokio runtime. Mounting again replaces
  /// the previous subscription.
  pub fn mount(&self) {
    self.inner.state.send_replace(AuthState::Loading);
    debug!("session store mounted");

    // Subscribe before the lookup so no notification can slip in between.
    let mut changes = self.inner.backend.subscribe();
    let weak: Weak<Inner<B>> = Arc::downgrade(&self.inner);
    let listener = tokio::spawn(async move {
      loop {
        match changes.recv().await {
          Ok(change) => {
            let Some(inner) = weak.upgrade() else { break };
            inner.handle_change(change.event, change.session);
          }
          Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "session notifications lagged");
          }
          Err(RecvError::Closed) => break,
        }
      }
    });

    let previous = self
      .inner
      .listener
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .replace(listener);
    if let Some(previous) = previous {
      previous.abort();
    }

    let inner = Arc::clone(&self.inner);
    tokio::spawn(async move {
      let session = match inner.backend.get_session().await {
        Ok(session) => session,
        Err(err) => {
          let err: Error = err.into();
          warn!(error = %err, "session check failed");
          None
        }
      };
      inner.handle_initial(session);
    });
  }

  /// Cancel the change-notification subscription. In-flight requests are
  /// left to finish.
  pub fn unmount(&self) {
    let listener = self
      .inner
      .listener
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(listener) = listener {
      listener.abort();
      debug!("session store unmounted");
    }
  }

  pub fn is_mounted(&self) -> bool {
    self
      .inner
      .listener
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .is_some_and(|l| !l.is_finished())
  }

  // ── Observation ───────────────────────────────────────────────────────

  /// Snapshot of the current state.
  pub fn state(&self) -> AuthState { self.inner.state.borrow().clone() }

  /// Receiver that is notified on every state change.
  pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.inner.state.subscribe() }

  /// Wait until the outer state has resolved. The store must be mounted.
  pub async fn ready(&self) -> AuthState {
    self.wait_for(|s| !s.is_loading()).await
  }

  /// Wait until both the outer state and the nested profile state have
  /// resolved. The store must be mounted.
  pub async fn settled(&self) -> AuthState {
    self
      .wait_for(|s| !s.is_loading() && !s.is_profile_loading())
      .await
  }

  async fn wait_for(&self, done: impl FnMut(&AuthState) -> bool) -> AuthState {
    let mut rx = self.subscribe();
    match rx.wait_for(done).await {
      Ok(state) => AuthState::clone(&state),
      Err(_) => self.state(),
    }
  }

  // ── Derived reads ─────────────────────────────────────────────────────

  pub fn identity(&self) -> Option<Identity> { self.inner.state.borrow().identity().cloned() }

  pub fn profile(&self) -> Option<Profile> { self.inner.state.borrow().profile().cloned() }

  pub fn is_loading(&self) -> bool { self.inner.state.borrow().is_loading() }

  pub fn is_profile_loading(&self) -> bool { self.inner.state.borrow().is_profile_loading() }

  pub fn is_authenticated(&self) -> bool { self.inner.state.borrow().is_authenticated() }

  pub fn is_admin(&self) -> bool { self.inner.state.borrow().is_admin() }

  pub fn is_agent(&self) -> bool { self.inner.state.borrow().is_agent() }

  pub fn is_tourist(&self) -> bool { self.inner.state.borrow().is_tourist() }

  pub fn has_role(&self, role: Role) -> bool { self.inner.state.borrow().has_role(role) }

  pub fn is_verified(&self) -> bool { self.inner.state.borrow().is_verified() }

  pub fn effective_role(&self) -> Role { self.inner.state.borrow().effective_role() }

  pub fn display_name(&self) -> String { self.inner.state.borrow().display_name() }

  pub fn initials(&self) -> String { self.inner.state.borrow().initials() }

  // ── Credential operations ─────────────────────────────────────────────

  pub async fn sign_in(&self, email: &str, password: &str) -> Outcome<Session> {
    if let Err(err) = validate::sign_in(email, password) {
      return err.into();
    }

    match self
      .inner
      .backend
      .sign_in_with_password(email.trim(), password)
      .await
    {
      Ok(session) => {
        self.inner.handle_change(AuthEvent::SignedIn, Some(session.clone()));
        Outcome::ok(session)
      }
      Err(err) => {
        let err: Error = err.into();
        debug!(error = %err, "sign-in rejected");
        messages::sign_in_failure(err)
      }
    }
  }

  pub async fn sign_up(
    &self,
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
  ) -> Outcome<SignUpResponse> {
    if let Err(err) = validate::sign_up(email, password, full_name) {
      return err.into();
    }

    let request = SignUpRequest {
      email:       email.trim().to_owned(),
      password:    password.to_owned(),
      full_name:   full_name.trim().to_owned(),
      role,
      redirect_to: self.inner.config.link("/login"),
    };

    match self.inner.backend.sign_up(&request).await {
      Ok(response) => {
        // Only present when the backend auto-confirms new accounts.
        if response.session.is_some() {
          self
            .inner
            .handle_change(AuthEvent::SignedIn, response.session.clone());
        }
        Outcome::ok(response)
      }
      Err(err) => {
        let err: Error = err.into();
        debug!(error = %err, "sign-up rejected");
        messages::sign_up_failure(err)
      }
    }
  }

  /// Clear the local session, then ask the backend to invalidate it.
  ///
  /// The local clear is never rolled back; a backend failure is reported in
  /// the outcome only.
  pub async fn sign_out(&self) -> Outcome<()> {
    self.inner.clear();

    match self.inner.backend.sign_out().await {
      Ok(()) => Outcome::empty(),
      Err(err) => {
        let err: Error = err.into();
        warn!(error = %err, "server sign-out failed; local session already cleared");
        messages::failure(err, messages::SIGN_OUT_FAILED)
      }
    }
  }

  /// Request a password-reset email.
  ///
  /// Reports success for every well-formed address whether or not it is
  /// registered and whether or not the backend call worked.
  pub async fn request_password_reset(&self, email: &str) -> Outcome<()> {
    if let Err(err) = validate::email(email) {
      return err.into();
    }

    let redirect = self.inner.config.link("/reset-password");
    if let Err(err) = self
      .inner
      .backend
      .reset_password_for_email(email.trim(), redirect.as_deref())
      .await
    {
      let err: Error = err.into();
      warn!(error = %err, "password reset request failed");
    }

    Outcome::done(messages::RESET_REQUESTED)
  }

  /// Older name for [`request_password_reset`](Self::request_password_reset).
  pub async fn reset_password(&self, email: &str) -> Outcome<()> {
    self.request_password_reset(email).await
  }

  pub async fn update_password(&self, new_password: &str) -> Outcome<()> {
    if let Err(err) = validate::strong_password(new_password) {
      return err.into();
    }

    let attributes = UserAttributes {
      password: Some(new_password.to_owned()),
      ..Default::default()
    };
    match self.inner.backend.update_user(&attributes).await {
      Ok(identity) => {
        self.inner.replace_identity(identity);
        Outcome::done(messages::PASSWORD_UPDATED)
      }
      Err(err) => {
        let err: Error = err.into();
        warn!(error = %err, "password update failed");
        messages::failure(err, messages::PASSWORD_UPDATE_FAILED)
      }
    }
  }

  /// Start an email change. The backend sends a confirmation link to the
  /// new address.
  pub async fn update_email(&self, new_email: &str) -> Outcome<()> {
    if let Err(err) = validate::email(new_email) {
      return err.into();
    }

    let attributes = UserAttributes {
      email: Some(new_email.trim().to_owned()),
      ..Default::default()
    };
    match self.inner.backend.update_user(&attributes).await {
      Ok(identity) => {
        self.inner.replace_identity(identity);
        Outcome::done(messages::EMAIL_CHANGE_SENT)
      }
      Err(err) => messages::failure(err.into(), messages::EMAIL_UPDATE_FAILED),
    }
  }

  /// Patch the signed-in user's profile. On success the in-memory profile is
  /// replaced by the row the backend returned.
  pub async fn update_profile(&self, changes: &ProfileChanges) -> Outcome<Profile> {
    let Some(user_id) = self.inner.state.borrow().identity().map(|i| i.id) else {
      return Error::NotAuthenticated.into();
    };

    let changes = changes.sanitized().stamped(Utc::now());
    match self.inner.backend.update_profile(user_id, &changes).await {
      Ok(profile) => {
        self.inner.replace_profile(user_id, profile.clone());
        Outcome::ok(profile)
      }
      Err(err) => {
        let err: Error = err.into();
        warn!(%user_id, error = %err, "profile update failed");
        messages::failure(err, messages::PROFILE_UPDATE_FAILED)
      }
    }
  }
}

// ─── Transition handler ──────────────────────────────────────────────────────

impl<B> Inner<B>
where
  B: AuthBackend + 'static,
{
  /// Apply the result of the bootstrap lookup, unless a notification has
  /// already resolved the state.
  fn handle_initial(self: &Arc<Self>, session: Option<Session>) {
    if !self.transition(AuthEvent::InitialSession, session, true) {
      debug!("initial session superseded by a notification");
    }
  }

  /// The single synchronous entry point for session changes.
  fn handle_change(self: &Arc<Self>, event: AuthEvent, session: Option<Session>) {
    self.transition(event, session, false);
  }

  /// Move the store for `session` and start a profile load when it carries
  /// an identity. With `only_while_loading` the check and the move happen
  /// under one lock, and nothing is applied once the state has resolved.
  fn transition(
    self: &Arc<Self>,
    event: AuthEvent,
    session: Option<Session>,
    only_while_loading: bool,
  ) -> bool {
    if event == AuthEvent::PasswordRecovery {
      info!("password recovery session detected");
    }

    let identity = session.and_then(|s| s.user);
    let mut applied = false;
    let mut fetch = None;
    self.state.send_if_modified(|state| {
      if only_while_loading && !state.is_loading() {
        return false;
      }
      applied = true;

      let Some(identity) = identity else {
        self.profile_epoch.fetch_add(1, Ordering::SeqCst);
        *state = AuthState::Anonymous;
        return true;
      };

      fetch = Some(identity.id);
      match state {
        // Same user: keep a loaded profile on screen while it is refreshed.
        AuthState::Authenticated {
          identity: current,
          profile,
        } if current.id == identity.id => {
          *current = identity;
          if *profile == ProfileState::Absent {
            *profile = ProfileState::Loading;
          }
        }
        _ => {
          *state = AuthState::Authenticated {
            identity,
            profile: ProfileState::Loading,
          };
        }
      }
      true
    });

    match fetch {
      Some(user_id) => {
        debug!(?event, %user_id, "session authenticated");
        self.spawn_profile_load(user_id);
      }
      None if applied => debug!(?event, "session cleared"),
      None => {}
    }
    applied
  }

  /// Fire-and-forget profile lookup. Only the nested profile state is
  /// touched when it completes.
  fn spawn_profile_load(self: &Arc<Self>, user_id: Uuid) {
    let epoch = self.profile_epoch.fetch_add(1, Ordering::SeqCst) + 1;
    let inner = Arc::clone(self);
    tokio::spawn(async move {
      let next = match inner.backend.fetch_profile(user_id).await {
        Ok(Some(profile)) => ProfileState::Ready(profile),
        Ok(None) => {
          debug!(%user_id, "no profile row");
          ProfileState::Absent
        }
        Err(err) => {
          let err: Error = err.into();
          warn!(%user_id, error = %err, "profile load failed");
          ProfileState::Absent
        }
      };
      inner.settle_profile(user_id, epoch, next);
    });
  }

  fn settle_profile(&self, user_id: Uuid, epoch: u64, next: ProfileState) {
    self.state.send_if_modified(|state| {
      if self.profile_epoch.load(Ordering::SeqCst) != epoch {
        return false;
      }
      match state {
        AuthState::Authenticated { identity, profile } if identity.id == user_id => {
          *profile = next;
          true
        }
        _ => false,
      }
    });
  }

  fn replace_identity(&self, updated: Identity) {
    self.state.send_if_modified(|state| match state {
      AuthState::Authenticated { identity, .. } if identity.id == updated.id => {
        *identity = updated;
        true
      }
      _ => false,
    });
  }

  fn replace_profile(&self, user_id: Uuid, row: Profile) {
    self.profile_epoch.fetch_add(1, Ordering::SeqCst);
    self.state.send_if_modified(|state| match state {
      AuthState::Authenticated { identity, profile } if identity.id == user_id => {
        *profile = ProfileState::Ready(row);
        true
      }
      _ => false,
    });
  }

  fn clear(&self) {
    self.profile_epoch.fetch_add(1, Ordering::SeqCst);
    self.state.send_replace(AuthState::Anonymous);
  }
}
