//! Handlers for `/posts` endpoints.
//!
//! The feed is shared by every signed-in user. Reacting to or reposting a
//! post that no longer exists is a silent no-op answered with 204.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use peeps_core::{
  post::{NewPost, Post},
  reaction::Reaction,
  store::PeopleStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, Backend, CurrentUser, error::ApiError};

// ─── Feed ─────────────────────────────────────────────────────────────────────

/// `GET /posts`
pub async fn feed<S: Backend>(
  State(state): State<AppState<S>>,
  _current: CurrentUser,
) -> Result<Json<Vec<Post>>, ApiError> {
  let posts = state.store.feed().await.map_err(ApiError::store)?;
  Ok(Json(posts))
}

// ─── Create / delete ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content: String,
}

/// `POST /posts` — body: `{"content":"..."}`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let user = &current.user;
  let input = NewPost::new(user.user_id, user.display_name(), body.content)?;
  let post = state
    .store
    .create_post(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `DELETE /posts/{id}` — author only.
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let post = state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))?;
  if post.author_id != current.user.user_id {
    return Err(ApiError::Forbidden("only the author may delete a post".into()));
  }

  state.store.delete_post(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reactions ────────────────────────────────────────────────────────────────

/// Response body for the toggle endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionBody {
  pub reaction: Reaction,
}

fn reaction_response(outcome: Option<Reaction>) -> Response {
  match outcome {
    Some(reaction) => Json(ReactionBody { reaction }).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  }
}

/// `POST /posts/{id}/like`
pub async fn like<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  let outcome = state
    .store
    .toggle_like(id, current.user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(reaction_response(outcome))
}

/// `POST /posts/{id}/dislike`
pub async fn dislike<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  let outcome = state
    .store
    .toggle_dislike(id, current.user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(reaction_response(outcome))
}

// ─── Repost ───────────────────────────────────────────────────────────────────

/// `POST /posts/{id}/repost`
pub async fn repost<S: Backend>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  let user = current.user;
  let created = state
    .store
    .repost(id, user.user_id, user.display_name().to_owned())
    .await
    .map_err(ApiError::store)?;

  Ok(match created {
    Some(post) => (StatusCode::CREATED, Json(post)).into_response(),
    None => {
      tracing::debug!(post_id = %id, "repost of missing post ignored");
      StatusCode::NO_CONTENT.into_response()
    }
  })
}
