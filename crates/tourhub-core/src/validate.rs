//! Client-side input checks run before any backend call.
//!
//! Each check returns [`Error::Validation`] carrying the exact message a form
//! displays.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MSG_CREDENTIALS_REQUIRED: &str = "Email and password are required";
pub const MSG_ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
pub const MSG_PASSWORD_TOO_WEAK: &str =
  "Password must contain uppercase, lowercase, number, and special character";
pub const MSG_EMAIL_REQUIRED: &str = "Email address is required";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address";

/// Sign-in needs a non-blank email and a non-empty password.
pub fn sign_in(email: &str, password: &str) -> Result<()> {
  if email.trim().is_empty() || password.is_empty() {
    return Err(Error::validation(MSG_CREDENTIALS_REQUIRED));
  }
  Ok(())
}

/// Sign-up needs every field and a password of at least eight characters.
pub fn sign_up(email: &str, password: &str, full_name: &str) -> Result<()> {
  if email.trim().is_empty() || password.is_empty() || full_name.trim().is_empty() {
    return Err(Error::validation(MSG_ALL_FIELDS_REQUIRED));
  }
  password_length(password)
}

/// Non-blank and shaped like `local@domain.tld`. Checks the trimmed value.
pub fn email(email: &str) -> Result<()> {
  let email = email.trim();
  if email.is_empty() {
    return Err(Error::validation(MSG_EMAIL_REQUIRED));
  }
  if !EMAIL_RE.is_match(email) {
    return Err(Error::validation(MSG_EMAIL_INVALID));
  }
  Ok(())
}

fn password_length(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::validation(MSG_PASSWORD_TOO_SHORT));
  }
  Ok(())
}

/// Length of at least eight plus upper, lower, digit and symbol classes.
pub fn strong_password(password: &str) -> Result<()> {
  password_length(password)?;

  let upper = password.chars().any(|c| c.is_ascii_uppercase());
  let lower = password.chars().any(|c| c.is_ascii_lowercase());
  let digit = password.chars().any(|c| c.is_ascii_digit());
  let symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

  if !(upper && lower && digit && symbol) {
    return Err(Error::validation(MSG_PASSWORD_TOO_WEAK));
  }
  Ok(())
}
