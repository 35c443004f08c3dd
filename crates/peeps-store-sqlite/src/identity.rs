//! [`IdentityProvider`] implementation: argon2 password hashes and opaque
//! bearer sessions.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore as _};
use rusqlite::{OptionalExtension as _, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use peeps_core::identity::{IdentityProvider, ProfileUpdate, Session, User, normalize_email};

use crate::{
  Error, Result, SqliteStore,
  encode::{RawUser, encode_dt, encode_uuid, now},
};

/// Bytes of entropy in a session token.
const TOKEN_BYTES: usize = 32;

fn new_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

impl SqliteStore {
  async fn open_session(&self, user: User) -> Result<Session> {
    let token      = new_token();
    let token_hash = hash_token(&token);
    let user_str   = encode_uuid(user.user_id);
    let at_str     = encode_dt(now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
          params![token_hash, user_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Session { token, user })
  }

  /// Look up a user and their password hash by normalised email.
  async fn user_by_email(&self, email: String) -> Result<Option<(User, String)>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}, password_hash FROM users WHERE email = ?1",
          RawUser::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![email], |row| {
              Ok((RawUser::from_row(row)?, row.get::<_, String>(4)?))
            })
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some((user, hash)) => Ok(Some((user.into_user()?, hash))),
      None => Ok(None),
    }
  }

  async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS);
        Ok(conn.query_row(&sql, params![id_str], RawUser::from_row).optional()?)
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }
}

impl IdentityProvider for SqliteStore {
  type Error = Error;

  async fn sign_up(&self, email: String, password: String) -> Result<Option<Session>> {
    let email = normalize_email(&email)?;
    if self.user_by_email(email.clone()).await?.is_some() {
      return Ok(None);
    }

    let user = User {
      user_id:    Uuid::new_v4(),
      email,
      photo_url:  None,
      created_at: now(),
    };
    let phc = hash_password(&password)?;

    let id_str    = encode_uuid(user.user_id);
    let email_str = user.email.clone();
    let at_str    = encode_dt(user.created_at);

    // A concurrent sign-up can still win the race; the UNIQUE constraint
    // turns that into zero inserted rows.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, email_str, phc, at_str],
        )?)
      })
      .await?;
    if inserted == 0 {
      return Ok(None);
    }

    tracing::info!(user_id = %user.user_id, "user signed up");
    self.open_session(user).await.map(Some)
  }

  async fn sign_in(&self, email: String, password: String) -> Result<Option<Session>> {
    let Ok(email) = normalize_email(&email) else {
      return Ok(None);
    };
    let Some((user, phc)) = self.user_by_email(email).await? else {
      return Ok(None);
    };
    if !verify_password(&password, &phc) {
      tracing::debug!(user_id = %user.user_id, "password mismatch");
      return Ok(None);
    }
    self.open_session(user).await.map(Some)
  }

  async fn sign_out(&self, token: String) -> Result<bool> {
    let token_hash = hash_token(&token);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn authenticate(&self, token: String) -> Result<Option<User>> {
    let token_hash = hash_token(&token);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.user_id, u.email, u.photo_url, u.created_at
               FROM sessions s
               JOIN users u ON u.user_id = s.user_id
               WHERE s.token_hash = ?1",
              params![token_hash],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
    let update    = update.normalized();
    let id_str    = encode_uuid(user_id);
    let photo_url = update.photo_url;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET photo_url = ?2 WHERE user_id = ?1",
          params![id_str, photo_url],
        )?)
      })
      .await?;
    if changed == 0 {
      return Ok(None);
    }
    self.user_by_id(user_id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_are_unique_and_url_safe() {
    let a = new_token();
    let b = new_token();
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
  }

  #[test]
  fn token_hash_is_stable_hex() {
    let h = hash_token("abc");
    assert_eq!(h, hash_token("abc"));
    assert_eq!(h.len(), 64);
  }

  #[test]
  fn password_hash_verifies() {
    let phc = hash_password("hunter22").unwrap();
    assert!(verify_password("hunter22", &phc));
    assert!(!verify_password("hunter23", &phc));
    assert!(!verify_password("hunter22", "not-a-phc-string"));
  }
}
