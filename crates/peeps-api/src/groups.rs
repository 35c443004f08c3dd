//! Handlers for `/groups` endpoints.
//!
//! | Method   | Path                                | Notes |
//! |----------|-------------------------------------|-------|
//! | `GET`    | `/groups`                           | the caller's groups |
//! | `POST`   | `/groups`                           | body: [`NewGroup`]; starts empty |
//! | `GET`    | `/groups/{id}`                      | 404 if missing or foreign |
//! | `PATCH`  | `/groups/{id}`                      | body: [`GroupPatch`] |
//! | `DELETE` | `/groups/{id}`                      | member contacts are kept |
//! | `PUT`    | `/groups/{id}/members/{contact_id}` | idempotent add |
//! | `DELETE` | `/groups/{id}/members/{contact_id}` | idempotent remove |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use peeps_core::{
  group::{Group, GroupPatch, NewGroup},
  identity::User,
  store::PeopleStore,
};
use uuid::Uuid;

use crate::{
  AppState, Backend, CurrentUser, contacts::owned_contact, error::ApiError,
};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("group {id} not found")) }

async fn owned_group<S: Backend>(store: &S, user: &User, id: Uuid) -> Result<Group, ApiError> {
  store
    .get_group(id)
    .await
    .map_err(ApiError::store)?
    .filter(|g| g.owner_id == user.user_id)
    .ok_or_else(|| not_found(id))
}

// ─── Collection ───────────────────────────────────────────────────────────────

/// `GET /groups`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Json<Vec<Group>>, ApiError> {
  let groups = state
    .store
    .list_groups(current.user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(groups))
}

/// `POST /groups`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Json(body): Json<NewGroup>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body.normalized()?;
  let group = state
    .store
    .add_group(current.user.user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(group)))
}

// ─── Single group ─────────────────────────────────────────────────────────────

/// `GET /groups/{id}`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
  Ok(Json(owned_group(&*state.store, &current.user, id).await?))
}

/// `PATCH /groups/{id}`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError> {
  let mut preview = owned_group(&*state.store, &current.user, id).await?;
  patch.clone().apply(&mut preview)?;

  let group = state
    .store
    .update_group(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(group))
}

/// `DELETE /groups/{id}`
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  owned_group(&*state.store, &current.user, id).await?;
  if !state.store.delete_group(id).await.map_err(ApiError::store)? {
    return Err(not_found(id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Members ──────────────────────────────────────────────────────────────────

/// `PUT /groups/{id}/members/{contact_id}`
pub async fn add_member<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path((id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Group>, ApiError> {
  owned_group(&*state.store, &current.user, id).await?;
  owned_contact(&*state.store, &current.user, contact_id).await?;

  let group = state
    .store
    .add_member(id, contact_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(group))
}

/// `DELETE /groups/{id}/members/{contact_id}`
pub async fn remove_member<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path((id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Group>, ApiError> {
  owned_group(&*state.store, &current.user, id).await?;

  let group = state
    .store
    .remove_member(id, contact_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(group))
}
