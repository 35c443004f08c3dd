//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path             | Notes |
//! |----------|------------------|-------|
//! | `GET`    | `/contacts`      | the caller's contacts, oldest first |
//! | `POST`   | `/contacts`      | body: [`NewContact`] |
//! | `GET`    | `/contacts/{id}` | 404 if missing or owned by someone else |
//! | `PATCH`  | `/contacts/{id}` | body: [`ContactPatch`] |
//! | `DELETE` | `/contacts/{id}` | 204; also drops group memberships |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use peeps_core::{
  contact::{Contact, ContactPatch, NewContact},
  identity::User,
  store::PeopleStore,
};
use uuid::Uuid;

use crate::{AppState, Backend, CurrentUser, error::ApiError};

/// Fetch a contact, treating other users' contacts as missing.
pub(crate) async fn owned_contact<S: Backend>(
  store: &S,
  user: &User,
  id: Uuid,
) -> Result<Contact, ApiError> {
  store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .filter(|c| c.owner_id == user.user_id)
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let contacts = state
    .store
    .list_contacts(current.user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Json(body): Json<NewContact>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body.normalized()?;
  let contact = state
    .store
    .add_contact(current.user.user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError> {
  Ok(Json(owned_contact(&*state.store, &current.user, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /contacts/{id}`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError> {
  let mut preview = owned_contact(&*state.store, &current.user, id).await?;
  patch.clone().apply(&mut preview)?;

  let contact = state
    .store
    .update_contact(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  owned_contact(&*state.store, &current.user, id).await?;
  if !state.store.delete_contact(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("contact {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
