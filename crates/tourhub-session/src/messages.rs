//! User-facing wording for backend failures.
//!
//! Backend messages are matched by substring, the same way the hosted
//! service phrases them.

use tourhub_core::{Error, ErrorKind, Outcome};

pub const SERVICE_UNAVAILABLE: &str = "Cannot connect to authentication service. The service may be \
   paused or unreachable; check your connection and the project status, then try again.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const EMAIL_NOT_CONFIRMED: &str = "Please verify your email address before signing in";
pub const ALREADY_REGISTERED: &str = "This email is already registered";
pub const RESET_REQUESTED: &str =
  "If an account exists with this email, you will receive a password reset link.";
pub const PASSWORD_UPDATED: &str = "Password updated successfully";
pub const PASSWORD_UPDATE_FAILED: &str = "Failed to update password. Please try again.";
pub const EMAIL_CHANGE_SENT: &str =
  "Verification email sent to your new address. Please confirm to complete the change.";
pub const EMAIL_UPDATE_FAILED: &str = "Failed to update email";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
pub const SIGN_OUT_FAILED: &str = "Something went wrong during sign out.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";

/// Sign-in failure → outcome.
pub fn sign_in_failure<T>(err: Error) -> Outcome<T> {
  match err {
    Error::Rejected(msg) if msg.contains("Invalid login credentials") => {
      Outcome::fail(ErrorKind::Rejected, INVALID_CREDENTIALS)
    }
    Error::Rejected(msg) if msg.contains("Email not confirmed") => {
      Outcome::fail(ErrorKind::Rejected, EMAIL_NOT_CONFIRMED)
    }
    Error::ServiceUnavailable(_) => unavailable(),
    Error::Unexpected(_) => unexpected(SOMETHING_WENT_WRONG),
    other => other.into(),
  }
}

/// Sign-up failure → outcome.
pub fn sign_up_failure<T>(err: Error) -> Outcome<T> {
  match err {
    Error::Rejected(msg) if msg.contains("already registered") => {
      Outcome::fail(ErrorKind::Rejected, ALREADY_REGISTERED)
    }
    Error::ServiceUnavailable(_) => unavailable(),
    Error::Unexpected(_) => unexpected(SOMETHING_WENT_WRONG),
    other => other.into(),
  }
}

/// Failure of any other operation: backend rejections keep the backend's
/// wording, transport failures and unreadable responses get `fallback`.
pub fn failure<T>(err: Error, fallback: &str) -> Outcome<T> {
  match err {
    Error::ServiceUnavailable(_) => Outcome::fail(ErrorKind::ServiceUnavailable, fallback),
    Error::Unexpected(_) => unexpected(fallback),
    other => other.into(),
  }
}

fn unavailable<T>() -> Outcome<T> {
  Outcome::fail(ErrorKind::ServiceUnavailable, SERVICE_UNAVAILABLE)
}

fn unexpected<T>(message: &str) -> Outcome<T> { Outcome::fail(ErrorKind::Unexpected, message) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_credentials_is_normalised() {
    let out: Outcome<()> =
      sign_in_failure(Error::rejected("Invalid login credentials"));
    assert_eq!(out.error.as_deref(), Some(INVALID_CREDENTIALS));
  }

  #[test]
  fn unconfirmed_email_is_normalised() {
    let out: Outcome<()> = sign_in_failure(Error::rejected("Email not confirmed"));
    assert_eq!(out.error.as_deref(), Some(EMAIL_NOT_CONFIRMED));
  }

  #[test]
  fn transport_failure_hides_raw_error() {
    let out: Outcome<()> =
      sign_in_failure(Error::unavailable("error sending request: connection refused"));
    assert_eq!(out.error.as_deref(), Some(SERVICE_UNAVAILABLE));
    assert_eq!(out.kind, Some(ErrorKind::ServiceUnavailable));
  }

  #[test]
  fn other_rejections_pass_through() {
    let out: Outcome<()> = sign_up_failure(Error::rejected("Signups not allowed"));
    assert_eq!(out.error.as_deref(), Some("Signups not allowed"));

    let out: Outcome<()> = sign_up_failure(Error::rejected("User already registered"));
    assert_eq!(out.error.as_deref(), Some(ALREADY_REGISTERED));
  }

  #[test]
  fn unreadable_response_gets_generic_message() {
    let raw = Error::Unexpected("error decoding response body: expected value".into());

    let out: Outcome<()> = sign_in_failure(raw.clone());
    assert_eq!(out.error.as_deref(), Some(SOMETHING_WENT_WRONG));
    assert_eq!(out.kind, Some(ErrorKind::Unexpected));

    let out: Outcome<()> = sign_up_failure(raw.clone());
    assert_eq!(out.error.as_deref(), Some(SOMETHING_WENT_WRONG));

    let out: Outcome<()> = failure(raw, PROFILE_UPDATE_FAILED);
    assert_eq!(out.error.as_deref(), Some(PROFILE_UPDATE_FAILED));
  }
}
