//! The session state union and the pure reads derived from it.

use serde::Serialize;
use tourhub_core::{
  identity::Identity,
  profile::Profile,
  role::{Role, RoleView},
};

/// Progress of the profile lookup for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "profile", rename_all = "snake_case")]
pub enum ProfileState {
  Loading,
  Ready(Profile),
  /// The lookup failed or found no row.
  Absent,
}

impl ProfileState {
  pub fn profile(&self) -> Option<&Profile> {
    match self {
      Self::Ready(p) => Some(p),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool { matches!(self, Self::Loading) }
}

/// Where the session store currently stands.
///
/// The outer state resolves as soon as the session is known and drives
/// route gating. The nested [`ProfileState`] resolves independently and
/// drives role-dependent UI.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
  #[default]
  Uninitialized,
  Loading,
  Anonymous,
  Authenticated {
    identity: Identity,
    profile:  ProfileState,
  },
}

impl AuthState {
  pub fn identity(&self) -> Option<&Identity> {
    match self {
      Self::Authenticated { identity, .. } => Some(identity),
      _ => None,
    }
  }

  pub fn profile_state(&self) -> Option<&ProfileState> {
    match self {
      Self::Authenticated { profile, .. } => Some(profile),
      _ => None,
    }
  }

  pub fn profile(&self) -> Option<&Profile> {
    self.profile_state().and_then(ProfileState::profile)
  }

  /// True until the initial session lookup has resolved.
  pub fn is_loading(&self) -> bool {
    matches!(self, Self::Uninitialized | Self::Loading)
  }

  pub fn is_profile_loading(&self) -> bool {
    self.profile_state().is_some_and(ProfileState::is_loading)
  }

  pub fn is_authenticated(&self) -> bool { self.identity().is_some() }

  pub fn roles(&self) -> RoleView<'_> { RoleView::new(self.identity(), self.profile()) }

  pub fn is_admin(&self) -> bool { self.roles().is_admin() }

  pub fn is_agent(&self) -> bool { self.roles().is_agent() }

  pub fn is_tourist(&self) -> bool { self.roles().is_tourist() }

  pub fn has_role(&self, role: Role) -> bool { self.roles().has_role(role) }

  pub fn is_verified(&self) -> bool { self.roles().is_verified() }

  pub fn effective_role(&self) -> Role { self.roles().effective_role() }

  pub fn display_name(&self) -> String { self.roles().display_name() }

  pub fn initials(&self) -> String { self.roles().initials() }
}
