//! Profile: the mutable application-level record keyed by identity id.
//!
//! Rows live in the `user_profiles` table and are created by a backend
//! trigger at sign-up. The client only ever reads and patches them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the table holding profile rows.
pub const PROFILE_TABLE: &str = "user_profiles";

/// A row of the `user_profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub id:            Uuid,
  #[serde(default)]
  pub email:         Option<String>,
  #[serde(default)]
  pub full_name:     Option<String>,
  #[serde(default)]
  pub phone:         Option<String>,
  #[serde(default)]
  pub nationality:   Option<String>,
  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  /// URL or data URI of the avatar.
  #[serde(default)]
  pub profile_image: Option<String>,
  /// `admin`, `agent` or `tourist`; absent means tourist.
  #[serde(default)]
  pub role:          Option<String>,
  #[serde(default)]
  pub created_at:    Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:    Option<DateTime<Utc>>,
}

impl Profile {
  /// An empty profile for `id`, as created by the sign-up trigger.
  pub fn new(id: Uuid) -> Self {
    Self {
      id,
      email: None,
      full_name: None,
      phone: None,
      nationality: None,
      date_of_birth: None,
      profile_image: None,
      role: None,
      created_at: None,
      updated_at: None,
    }
  }
}

/// Partial update accepted by
/// [`AuthBackend::update_profile`](crate::backend::AuthBackend::update_profile).
///
/// `None` fields are left untouched and are not serialised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileChanges {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_name:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nationality:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile_image: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at:    Option<DateTime<Utc>>,
}

impl ProfileChanges {
  /// Drop empty fields and trim the free-text ones.
  ///
  /// Emptiness is judged before trimming, so a whitespace-only name is sent
  /// as an empty string rather than dropped.
  pub fn sanitized(&self) -> Self {
    fn text(value: &Option<String>) -> Option<String> {
      value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.trim().to_owned())
    }

    Self {
      full_name:     text(&self.full_name),
      phone:         text(&self.phone),
      nationality:   text(&self.nationality),
      date_of_birth: self.date_of_birth,
      profile_image: self
        .profile_image
        .clone()
        .filter(|v| !v.is_empty()),
      updated_at:    self.updated_at,
    }
  }

  /// Stamp the change set with a modification time.
  pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
    self.updated_at = Some(at);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitize_trims_text_fields() {
    let changes = ProfileChanges {
      full_name: Some("  Jane Doe  ".into()),
      phone: Some(" +30 210 000 ".into()),
      nationality: Some("Greek ".into()),
      ..Default::default()
    };
    let clean = changes.sanitized();
    assert_eq!(clean.full_name.as_deref(), Some("Jane Doe"));
    assert_eq!(clean.phone.as_deref(), Some("+30 210 000"));
    assert_eq!(clean.nationality.as_deref(), Some("Greek"));
  }

  #[test]
  fn sanitize_drops_empty_fields() {
    let changes = ProfileChanges {
      full_name: Some(String::new()),
      profile_image: Some(String::new()),
      ..Default::default()
    };
    let clean = changes.sanitized();
    assert_eq!(clean, ProfileChanges::default());
  }

  #[test]
  fn unset_fields_are_not_serialised() {
    let changes = ProfileChanges {
      full_name: Some("Jane".into()),
      ..Default::default()
    };
    let json = serde_json::to_value(&changes).unwrap();
    assert_eq!(json, serde_json::json!({ "full_name": "Jane" }));
  }

  #[test]
  fn profile_row_tolerates_missing_columns() {
    let id = Uuid::new_v4();
    let row: Profile =
      serde_json::from_value(serde_json::json!({ "id": id, "role": "agent" }))
        .unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.role.as_deref(), Some("agent"));
    assert!(row.full_name.is_none());
  }
}
