//! [`SupabaseClient`]: GoTrue + PostgREST implementation of
//! [`AuthBackend`].

use std::{
  path::PathBuf,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tourhub_catalog::{
  booking::{
    BOOKING_SELECT, BOOKING_TABLE, Booking, BookingStatus, NewBooking, booking_reference,
  },
  package::{PACKAGE_SELECT, PACKAGE_TABLE, TourPackage},
};
use tourhub_core::{
  backend::{AuthBackend, SignUpRequest, SignUpResponse, UserAttributes},
  identity::Identity,
  profile::{PROFILE_TABLE, Profile, ProfileChanges},
  session::{AuthChange, AuthEvent, Session},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Error, Result, persist::SessionFile};

/// Capacity of the change-notification channel.
const CHANGE_BUFFER: usize = 32;

/// Fields GoTrue and PostgREST use for the human-readable error text, in
/// order of preference.
const ERROR_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for a Supabase project.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
  /// Project URL, e.g. `https://abcd.supabase.co`.
  pub url:          String,
  /// Public anon key sent as `apikey` on every request.
  pub anon_key:     String,
  /// Where to keep the session between runs. In-memory only when unset.
  #[serde(default)]
  pub session_file: Option<PathBuf>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

impl SupabaseConfig {
  pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
    Self {
      url:          url.into(),
      anon_key:     anon_key.into(),
      session_file: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token:  String,
  #[serde(default)]
  refresh_token: Option<String>,
  #[serde(default)]
  expires_in:    Option<i64>,
  /// Unix seconds.
  #[serde(default)]
  expires_at:    Option<i64>,
  #[serde(default)]
  user:          Option<Identity>,
}

impl TokenResponse {
  fn into_session(self, now: DateTime<Utc>) -> Session {
    let expires_at = self
      .expires_at
      .and_then(|secs| DateTime::from_timestamp(secs, 0))
      .or_else(|| {
        self
          .expires_in
          .map(|secs| now + chrono::Duration::seconds(secs))
      });
    Session {
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      expires_at,
      user: self.user,
    }
  }
}

fn error_message(status: u16, body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| {
      ERROR_FIELDS
        .iter()
        .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_owned))
    })
    .unwrap_or_else(|| format!("HTTP {status}"))
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for one Supabase project.
///
/// Holds the current session in memory (and optionally on disk) and
/// broadcasts a change notification whenever it changes.
pub struct SupabaseClient {
  http:    Client,
  config:  SupabaseConfig,
  file:    Option<SessionFile>,
  session: Mutex<Option<Session>>,
  changes: broadcast::Sender<AuthChange>,
}

impl SupabaseClient {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    let (changes, _) = broadcast::channel(CHANGE_BUFFER);
    Ok(Self {
      http,
      file: config.session_file.clone().map(SessionFile::new),
      config,
      session: Mutex::new(None),
      changes,
    })
  }

  pub fn config(&self) -> &SupabaseConfig { &self.config }

  fn auth_url(&self, path: &str) -> String {
    format!("{}/auth/v1{}", self.config.url.trim_end_matches('/'), path)
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
  }

  // ── Session bookkeeping ───────────────────────────────────────────────

  /// The in-memory session, without touching disk or network.
  pub fn current_session(&self) -> Option<Session> {
    self
      .session
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  fn access_token(&self) -> Option<String> {
    self
      .session
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .map(|s| s.access_token.clone())
  }

  fn emit(&self, event: AuthEvent, session: Option<Session>) {
    // No receivers is fine.
    let _ = self.changes.send(AuthChange::new(event, session));
  }

  async fn store_session(&self, session: Session, event: AuthEvent) {
    *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    if let Some(file) = &self.file {
      if let Err(e) = file.save(&session).await {
        warn!(path = %file.path().display(), error = %e, "failed to persist session");
      }
    }
    debug!(?event, "session stored");
    self.emit(event, Some(session));
  }

  async fn drop_session(&self) {
    *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
    if let Some(file) = &self.file {
      if let Err(e) = file.clear().await {
        warn!(path = %file.path().display(), error = %e, "failed to remove session file");
      }
    }
    debug!("session dropped");
    self.emit(AuthEvent::SignedOut, None);
  }

  async fn load_persisted(&self) -> Result<Option<Session>> {
    let Some(file) = &self.file else {
      return Ok(None);
    };
    let session = file.load().await?;
    if let Some(session) = &session {
      *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }
    Ok(session)
  }

  // ── Requests ──────────────────────────────────────────────────────────

  /// Build a request carrying the anon key and the best available bearer.
  fn request(&self, method: Method, url: String) -> RequestBuilder {
    let bearer = self
      .access_token()
      .unwrap_or_else(|| self.config.anon_key.clone());
    self.request_as(method, url, &bearer)
  }

  /// Token endpoints authenticate with the anon key alone.
  fn anon_request(&self, method: Method, url: String) -> RequestBuilder {
    self.request_as(method, url, &self.config.anon_key)
  }

  fn request_as(&self, method: Method, url: String, bearer: &str) -> RequestBuilder {
    self
      .http
      .request(method, url)
      .header("apikey", &self.config.anon_key)
      .bearer_auth(bearer)
  }

  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
      status:  status.as_u16(),
      message: error_message(status.as_u16(), &body),
    })
  }

  async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = Self::check(req.send().await?).await?;
    Ok(resp.json().await?)
  }

  async fn send_empty(req: RequestBuilder) -> Result<()> {
    Self::check(req.send().await?).await?;
    Ok(())
  }

  // ── Extra auth operations ─────────────────────────────────────────────

  /// `POST /auth/v1/token?grant_type=refresh_token`
  pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
    let req = self
      .anon_request(Method::POST, self.auth_url("/token"))
      .query(&[("grant_type", "refresh_token")])
      .json(&json!({ "refresh_token": refresh_token }));
    let token: TokenResponse = Self::send_json(req).await?;
    let session = token.into_session(Utc::now());
    self
      .store_session(session.clone(), AuthEvent::TokenRefreshed)
      .await;
    Ok(session)
  }

  /// `GET /auth/v1/user` for the current session.
  pub async fn get_user(&self) -> Result<Identity> {
    if self.access_token().is_none() {
      return Err(Error::NoSession);
    }
    Self::send_json(self.request(Method::GET, self.auth_url("/user"))).await
  }

  /// Adopt the tokens from a password-recovery link and announce the
  /// recovery session.
  pub async fn recover_session(
    &self,
    access_token: &str,
    refresh_token: Option<&str>,
  ) -> Result<Session> {
    let req = self.request_as(Method::GET, self.auth_url("/user"), access_token);
    let user: Identity = Self::send_json(req).await?;
    let session = Session {
      access_token:  access_token.to_owned(),
      refresh_token: refresh_token.map(str::to_owned),
      expires_at:    None,
      user:          Some(user),
    };
    self
      .store_session(session.clone(), AuthEvent::PasswordRecovery)
      .await;
    Ok(session)
  }

  // ── Data ──────────────────────────────────────────────────────────────

  /// `GET /rest/v1/tour_packages` with destinations and review ratings
  /// embedded. Inactive packages are excluded.
  pub async fn list_tour_packages(&self) -> Result<Vec<TourPackage>> {
    let req = self
      .request(Method::GET, self.rest_url(PACKAGE_TABLE))
      .query(&[("select", PACKAGE_SELECT), ("is_active", "eq.true")]);
    Self::send_json(req).await
  }

  /// `GET /rest/v1/bookings`, newest first. `user_id` narrows the list to one
  /// traveller; without it the caller sees whatever row security allows.
  pub async fn list_bookings(
    &self,
    user_id: Option<Uuid>,
    status: Option<BookingStatus>,
  ) -> Result<Vec<Booking>> {
    let mut query = vec![
      ("select", BOOKING_SELECT.to_owned()),
      ("order", "created_at.desc".to_owned()),
    ];
    if let Some(user_id) = user_id {
      query.push(("user_id", format!("eq.{user_id}")));
    }
    if let Some(status) = status {
      query.push(("status", format!("eq.{}", status.as_str())));
    }
    let req = self
      .request(Method::GET, self.rest_url(BOOKING_TABLE))
      .query(&query);
    Self::send_json(req).await
  }

  /// Insert a pending booking under a fresh `TH…` reference and return the
  /// stored row.
  pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking> {
    if self.access_token().is_none() {
      return Err(Error::NoSession);
    }
    let row = booking.insert(booking_reference());
    debug!(reference = %row.booking_reference, "creating booking");
    let req = self
      .request(Method::POST, self.rest_url(BOOKING_TABLE))
      .query(&[("select", BOOKING_SELECT)])
      .header("Prefer", "return=representation")
      .json(&[row]);
    let rows: Vec<Booking> = Self::send_json(req).await?;
    rows
      .into_iter()
      .next()
      .ok_or_else(|| Error::Decode("insert returned no row".to_owned()))
  }
}

// ─── AuthBackend impl ────────────────────────────────────────────────────────

impl AuthBackend for SupabaseClient {
  type Error = Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// Memory first, then the session file. An expired session with a refresh
  /// token is refreshed; if that fails the session is dropped.
  async fn get_session(&self) -> Result<Option<Session>> {
    let session = match self.current_session() {
      Some(session) => Some(session),
      None => self.load_persisted().await?,
    };

    let Some(session) = session else {
      return Ok(None);
    };
    if !session.is_expired(Utc::now()) {
      return Ok(Some(session));
    }

    match session.refresh_token.as_deref() {
      Some(refresh_token) => match self.refresh_session(refresh_token).await {
        Ok(fresh) => Ok(Some(fresh)),
        Err(e) => {
          warn!(error = %e, "session refresh failed");
          self.drop_session().await;
          Ok(None)
        }
      },
      None => {
        self.drop_session().await;
        Ok(None)
      }
    }
  }

  fn subscribe(&self) -> broadcast::Receiver<AuthChange> { self.changes.subscribe() }

  // ── Credentials ───────────────────────────────────────────────────────────

  async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
    let req = self
      .anon_request(Method::POST, self.auth_url("/token"))
      .query(&[("grant_type", "password")])
      .json(&json!({ "email": email, "password": password }));
    let token: TokenResponse = Self::send_json(req).await?;
    let session = token.into_session(Utc::now());
    self.store_session(session.clone(), AuthEvent::SignedIn).await;
    Ok(session)
  }

  async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse> {
    let mut req = self.anon_request(Method::POST, self.auth_url("/signup"));
    if let Some(redirect) = &request.redirect_to {
      req = req.query(&[("redirect_to", redirect)]);
    }
    let req = req.json(&json!({
      "email": request.email,
      "password": request.password,
      "data": {
        "full_name": request.full_name,
        "role": request.role.as_str(),
      },
    }));

    // Auto-confirming projects answer with a full token; otherwise the body
    // is the new user.
    let body: Value = Self::send_json(req).await?;
    if body.get("access_token").is_some() {
      let token: TokenResponse = serde_json::from_value(body)?;
      let session = token.into_session(Utc::now());
      self.store_session(session.clone(), AuthEvent::SignedIn).await;
      Ok(SignUpResponse {
        user:    session.user.clone(),
        session: Some(session),
      })
    } else {
      let user = match body.get("user") {
        Some(user) if user.is_object() => serde_json::from_value(user.clone())?,
        _ => serde_json::from_value(body)?,
      };
      Ok(SignUpResponse {
        user:    Some(user),
        session: None,
      })
    }
  }

  /// Always drops the local session; the server call is attempted only if
  /// there was a token to revoke.
  async fn sign_out(&self) -> Result<()> {
    let token = self.access_token();
    let req = token.map(|token| self.request_as(Method::POST, self.auth_url("/logout"), &token));
    self.drop_session().await;

    match req {
      Some(req) => Self::send_empty(req).await,
      None => Ok(()),
    }
  }

  async fn reset_password_for_email(
    &self,
    email: &str,
    redirect_to: Option<&str>,
  ) -> Result<()> {
    let mut req = self.anon_request(Method::POST, self.auth_url("/recover"));
    if let Some(redirect) = redirect_to {
      req = req.query(&[("redirect_to", redirect)]);
    }
    Self::send_empty(req.json(&json!({ "email": email }))).await
  }

  async fn update_user(&self, attributes: &UserAttributes) -> Result<Identity> {
    if self.access_token().is_none() {
      return Err(Error::NoSession);
    }
    let req = self
      .request(Method::PUT, self.auth_url("/user"))
      .json(attributes);
    let user: Identity = Self::send_json(req).await?;

    if let Some(mut session) = self.current_session() {
      session.user = Some(user.clone());
      self.store_session(session, AuthEvent::UserUpdated).await;
    }
    Ok(user)
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let req = self
      .request(Method::GET, self.rest_url(PROFILE_TABLE))
      .query(&[("id", format!("eq.{user_id}")), ("select", "*".to_owned())]);
    let rows: Vec<Profile> = Self::send_json(req).await?;
    Ok(rows.into_iter().next())
  }

  async fn update_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<Profile> {
    let req = self
      .request(Method::PATCH, self.rest_url(PROFILE_TABLE))
      .query(&[("id", format!("eq.{user_id}"))])
      .header("Prefer", "return=representation")
      .json(changes);
    let rows: Vec<Profile> = Self::send_json(req).await?;
    rows.into_iter().next().ok_or_else(|| Error::Api {
      status:  404,
      message: "Profile not found".to_owned(),
    })
  }
}
