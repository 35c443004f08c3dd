//! Users, sessions, and the [`IdentityProvider`] trait.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, contact::non_blank};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub photo_url:  Option<String>,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// The name stamped on posts written by this user.
  pub fn display_name(&self) -> &str { &self.email }
}

/// A bearer token paired with the user it authenticates. The token is only
/// ever returned once, at sign-in or sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  User,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub photo_url: Option<String>,
}

/// Trim and lowercase an email, rejecting anything without a local part and
/// a domain.
pub fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
    {
      Ok(email)
    }
    _ => Err(Error::InvalidEmail(email)),
  }
}

/// Validate sign-up credentials, returning the normalised email.
pub fn validate_credentials(email: &str, password: &str) -> Result<String> {
  let email = normalize_email(email)?;
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::WeakPassword { min: MIN_PASSWORD_LEN });
  }
  Ok(email)
}

impl ProfileUpdate {
  pub fn normalized(self) -> Self {
    Self { photo_url: non_blank(self.photo_url) }
  }
}

/// Authenticates users and issues sessions.
///
/// Rejections that a user can act on (wrong password, taken email) are
/// reported as `Ok(None)`; `Err` is reserved for backend failures.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an account and open a session for it. `None` if the email is
  /// already registered. Callers validate input with
  /// [`validate_credentials`] first.
  fn sign_up(
    &self,
    email: String,
    password: String,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Open a session. `None` if the email is unknown or the password is
  /// wrong; the two cases are indistinguishable to the caller.
  fn sign_in(
    &self,
    email: String,
    password: String,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Revoke a session token. Returns whether a session was removed.
  fn sign_out(
    &self,
    token: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Resolve a bearer token to its user, if the session is live.
  fn authenticate(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Update the user's profile; `None` if the user does not exist.
  fn update_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
