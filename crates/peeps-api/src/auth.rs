//! Bearer-token extractor and the `/auth` endpoints.
//!
//! | Method  | Path             | Notes |
//! |---------|------------------|-------|
//! | `POST`  | `/auth/sign-up`  | 201 + session; 409 if the email is taken |
//! | `POST`  | `/auth/sign-in`  | 200 + session; 401 on bad credentials |
//! | `POST`  | `/auth/sign-out` | 204; revokes the presented token |
//! | `GET`   | `/auth/me`       | the signed-in user |
//! | `PATCH` | `/auth/me`       | body: `{"photo_url": "..."}` |

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use peeps_core::identity::{
  IdentityProvider, ProfileUpdate, Session, User, validate_credentials,
};
use serde::Deserialize;

use crate::{AppState, Backend, error::ApiError};

// ─── Extractor ────────────────────────────────────────────────────────────────

/// The authenticated caller. Present in a handler means the bearer token
/// resolved to a live session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user:  User,
  pub token: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S: Backend> FromRequestParts<AppState<S>> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?
      .to_owned();

    let user = state
      .store
      .authenticate(token.clone())
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::Unauthorized("invalid session".into()))?;

    Ok(CurrentUser { user, token })
  }
}

// ─── Sign up / sign in ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/sign-up`
pub async fn sign_up<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
  let email = validate_credentials(&body.email, &body.password)?;
  let session = state
    .store
    .sign_up(email, body.password)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict("email already registered".into()))?;
  Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /auth/sign-in`
pub async fn sign_in<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
  let session = state
    .store
    .sign_in(body.email, body.password)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Unauthorized("invalid email or password".into()))?;
  Ok(Json(session))
}

/// `POST /auth/sign-out`
pub async fn sign_out<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .sign_out(current.token)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(user_id = %current.user.user_id, "session revoked");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S: Backend>(current: CurrentUser) -> Json<User> { Json(current.user) }

/// `PATCH /auth/me`
pub async fn update_me<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
  let user_id = current.user.user_id;
  let user = state
    .store
    .update_profile(user_id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))?;
  Ok(Json(user))
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn bearer_token_is_extracted() {
    assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
    assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
  }

  #[test]
  fn other_schemes_are_ignored() {
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
