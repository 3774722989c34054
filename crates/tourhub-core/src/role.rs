//! Role resolution and display helpers.
//!
//! A role can come from two places: the profile row and the identity's
//! sign-up metadata. Either one matching is enough for a role check. When
//! neither carries a role the user is treated as a tourist.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{identity::Identity, profile::Profile};

/// Application role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Agent,
  #[default]
  Tourist,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Agent => "agent",
      Self::Tourist => "tourist",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "agent" => Ok(Self::Agent),
      "tourist" => Ok(Self::Tourist),
      other => Err(crate::Error::validation(format!("unknown role: {other:?}"))),
    }
  }
}

/// Read-only view over whatever is currently known about the user.
///
/// Both halves are optional: an anonymous visitor has neither, and an
/// authenticated user may still be waiting for their profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleView<'a> {
  pub identity: Option<&'a Identity>,
  pub profile:  Option<&'a Profile>,
}

impl<'a> RoleView<'a> {
  pub fn new(identity: Option<&'a Identity>, profile: Option<&'a Profile>) -> Self {
    Self { identity, profile }
  }

  fn profile_role(&self) -> Option<&'a str> {
    self
      .profile
      .and_then(|p| p.role.as_deref())
      .filter(|r| !r.is_empty())
  }

  fn metadata_role(&self) -> Option<&'a str> {
    self
      .identity
      .and_then(|i| i.user_metadata.role.as_deref())
      .filter(|r| !r.is_empty())
  }

  /// True if either the profile or the metadata names `role`.
  pub fn has_role(&self, role: Role) -> bool {
    self.profile_role() == Some(role.as_str())
      || self.metadata_role() == Some(role.as_str())
  }

  pub fn is_admin(&self) -> bool { self.has_role(Role::Admin) }

  pub fn is_agent(&self) -> bool { self.has_role(Role::Agent) }

  /// Explicit tourist, or no role recorded anywhere.
  pub fn is_tourist(&self) -> bool {
    self.has_role(Role::Tourist)
      || (self.profile_role().is_none() && self.metadata_role().is_none())
  }

  /// True when neither source carries a role yet.
  pub fn role_unknown(&self) -> bool {
    self.profile_role().is_none() && self.metadata_role().is_none()
  }

  /// The role to display: profile first, then metadata, then tourist.
  /// Unrecognised role strings fall back to tourist.
  pub fn effective_role(&self) -> Role {
    self
      .profile_role()
      .or_else(|| self.metadata_role())
      .and_then(|r| r.parse().ok())
      .unwrap_or_default()
  }

  pub fn is_verified(&self) -> bool {
    self.identity.is_some_and(Identity::is_verified)
  }

  /// Profile name, then metadata name, then the email local part, then
  /// `"User"`.
  pub fn display_name(&self) -> String {
    let non_empty = |s: &&str| !s.is_empty();
    self
      .profile
      .and_then(|p| p.full_name.as_deref())
      .filter(non_empty)
      .or_else(|| {
        self
          .identity
          .and_then(|i| i.user_metadata.full_name.as_deref())
          .filter(non_empty)
      })
      .or_else(|| self.identity.and_then(Identity::email_local_part))
      .unwrap_or("User")
      .to_owned()
  }

  /// Two-letter avatar initials derived from [`display_name`](Self::display_name).
  pub fn initials(&self) -> String {
    initials_of(&self.display_name())
  }
}

/// First letters of the first two words, or the first two characters of a
/// single word, upper-cased.
pub fn initials_of(name: &str) -> String {
  let mut words = name.split_whitespace();
  match (words.next(), words.next()) {
    (Some(first), Some(second)) => first
      .chars()
      .take(1)
      .chain(second.chars().take(1))
      .flat_map(char::to_uppercase)
      .collect(),
    (Some(only), None) => only.chars().take(2).flat_map(char::to_uppercase).collect(),
    _ => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn identity_with_role(role: Option<&str>) -> Identity {
    let mut identity = Identity::new(Uuid::new_v4(), "jane.doe@example.com");
    identity.user_metadata.role = role.map(str::to_owned);
    identity
  }

  fn profile_with_role(id: Uuid, role: Option<&str>) -> Profile {
    let mut profile = Profile::new(id);
    profile.role = role.map(str::to_owned);
    profile
  }

  #[test]
  fn no_role_anywhere_is_tourist() {
    let identity = identity_with_role(None);
    let profile = profile_with_role(identity.id, None);
    let view = RoleView::new(Some(&identity), Some(&profile));
    assert!(view.is_tourist());
    assert!(!view.is_admin());
    assert!(!view.is_agent());
    assert_eq!(view.effective_role(), Role::Tourist);
  }

  #[test]
  fn empty_role_string_counts_as_absent() {
    let identity = identity_with_role(Some(""));
    let view = RoleView::new(Some(&identity), None);
    assert!(view.is_tourist());
  }

  #[test]
  fn profile_admin_is_not_tourist() {
    let identity = identity_with_role(None);
    let profile = profile_with_role(identity.id, Some("admin"));
    let view = RoleView::new(Some(&identity), Some(&profile));
    assert!(view.is_admin());
    assert!(!view.is_tourist());
  }

  #[test]
  fn metadata_agent_is_not_tourist() {
    let identity = identity_with_role(Some("agent"));
    let view = RoleView::new(Some(&identity), None);
    assert!(view.is_agent());
    assert!(!view.is_tourist());
  }

  #[test]
  fn either_source_satisfies_has_role() {
    let identity = identity_with_role(Some("agent"));
    let profile = profile_with_role(identity.id, Some("admin"));
    let view = RoleView::new(Some(&identity), Some(&profile));
    assert!(view.has_role(Role::Admin));
    assert!(view.has_role(Role::Agent));
    assert_eq!(view.effective_role(), Role::Admin);
  }

  #[test]
  fn display_name_fallback_chain() {
    let mut identity = identity_with_role(None);
    assert_eq!(RoleView::new(Some(&identity), None).display_name(), "jane.doe");

    identity.user_metadata.full_name = Some("Meta Name".into());
    assert_eq!(RoleView::new(Some(&identity), None).display_name(), "Meta Name");

    let mut profile = Profile::new(identity.id);
    profile.full_name = Some("Jane Doe".into());
    let view = RoleView::new(Some(&identity), Some(&profile));
    assert_eq!(view.display_name(), "Jane Doe");
    assert_eq!(view.initials(), "JD");

    assert_eq!(RoleView::default().display_name(), "User");
  }

  #[test]
  fn initials_single_word() {
    assert_eq!(initials_of("admin"), "AD");
    assert_eq!(initials_of("x"), "X");
    assert_eq!(initials_of(""), "");
  }

  #[test]
  fn role_parse_and_display() {
    assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
    assert!("owner".parse::<Role>().is_err());
    assert_eq!(Role::Admin.to_string(), "admin");
    assert_eq!(serde_json::to_string(&Role::Tourist).unwrap(), "\"tourist\"");
  }
}
