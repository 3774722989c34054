//! Route gating on top of [`AuthState`].

use serde::Serialize;

use crate::state::AuthState;

/// Access requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
  Public,
  Authenticated,
  Admin,
}

/// What a route should do for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
  /// Not enough is known yet; show a spinner.
  Pending,
  Granted,
  RedirectToLogin,
  Forbidden,
}

pub fn evaluate(gate: Gate, state: &AuthState) -> Access {
  if gate == Gate::Public {
    return Access::Granted;
  }
  if state.is_loading() {
    return Access::Pending;
  }
  if !state.is_authenticated() {
    return Access::RedirectToLogin;
  }

  match gate {
    Gate::Public | Gate::Authenticated => Access::Granted,
    Gate::Admin => {
      let roles = state.roles();
      if roles.is_admin() {
        Access::Granted
      } else if state.is_profile_loading() {
        Access::Pending
      } else {
        Access::Forbidden
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use tourhub_core::{identity::Identity, profile::Profile};
  use uuid::Uuid;

  use super::*;
  use crate::state::ProfileState;

  fn signed_in(metadata_role: Option<&str>, profile: ProfileState) -> AuthState {
    let mut identity = Identity::new(Uuid::new_v4(), "someone@tourismhub.com");
    identity.user_metadata.role = metadata_role.map(str::to_owned);
    AuthState::Authenticated { identity, profile }
  }

  fn profile_with(role: &str) -> ProfileState {
    let mut profile = Profile::new(Uuid::new_v4());
    profile.role = Some(role.to_owned());
    ProfileState::Ready(profile)
  }

  #[test]
  fn loading_is_pending_except_public() {
    assert_eq!(evaluate(Gate::Authenticated, &AuthState::Loading), Access::Pending);
    assert_eq!(evaluate(Gate::Admin, &AuthState::Uninitialized), Access::Pending);
    assert_eq!(evaluate(Gate::Public, &AuthState::Loading), Access::Granted);
  }

  #[test]
  fn anonymous_is_redirected() {
    assert_eq!(
      evaluate(Gate::Authenticated, &AuthState::Anonymous),
      Access::RedirectToLogin
    );
    assert_eq!(evaluate(Gate::Admin, &AuthState::Anonymous), Access::RedirectToLogin);
  }

  #[test]
  fn authenticated_gate_ignores_profile_progress() {
    let state = signed_in(None, ProfileState::Loading);
    assert_eq!(evaluate(Gate::Authenticated, &state), Access::Granted);
  }

  #[test]
  fn admin_gate_waits_for_profile() {
    let state = signed_in(None, ProfileState::Loading);
    assert_eq!(evaluate(Gate::Admin, &state), Access::Pending);

    let state = signed_in(Some("admin"), ProfileState::Loading);
    assert_eq!(evaluate(Gate::Admin, &state), Access::Granted);
  }

  #[test]
  fn admin_gate_resolves_on_profile() {
    assert_eq!(
      evaluate(Gate::Admin, &signed_in(None, profile_with("admin"))),
      Access::Granted
    );
    assert_eq!(
      evaluate(Gate::Admin, &signed_in(None, profile_with("agent"))),
      Access::Forbidden
    );
    assert_eq!(
      evaluate(Gate::Admin, &signed_in(None, ProfileState::Absent)),
      Access::Forbidden
    );
  }
}
