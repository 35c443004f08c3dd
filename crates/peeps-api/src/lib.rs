//! JSON HTTP API for Peeps.
//!
//! Exposes an axum [`Router`] backed by any type implementing both
//! [`PeopleStore`] and [`IdentityProvider`]. Every route except sign-up,
//! sign-in and image downloads requires `Authorization: Bearer <token>`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = peeps_api::api_router(AppState::new(store, images));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod contacts;
pub mod error;
pub mod groups;
pub mod images;
pub mod posts;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use peeps_core::{identity::IdentityProvider, store::PeopleStore};
use tower_http::trace::TraceLayer;

pub use auth::CurrentUser;
pub use error::{ApiError, Result};
pub use images::FsImageStore;

/// Everything the API needs from a backend.
pub trait Backend: PeopleStore + IdentityProvider + 'static {}

impl<T> Backend for T where T: PeopleStore + IdentityProvider + 'static {}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub images: Arc<FsImageStore>,
}

impl<S> AppState<S> {
  pub fn new(store: S, images: FsImageStore) -> Self {
    Self { store: Arc::new(store), images: Arc::new(images) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), images: Arc::clone(&self.images) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<S: Backend>(state: AppState<S>) -> Router<()> {
  let upload_limit = state.images.max_bytes();

  Router::new()
    // Auth
    .route("/auth/sign-up", post(auth::sign_up::<S>))
    .route("/auth/sign-in", post(auth::sign_in::<S>))
    .route("/auth/sign-out", post(auth::sign_out::<S>))
    .route("/auth/me", get(auth::me::<S>).patch(auth::update_me::<S>))
    // Contacts
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .patch(contacts::update::<S>)
        .delete(contacts::delete::<S>),
    )
    // Groups
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route(
      "/groups/{id}",
      get(groups::get_one::<S>)
        .patch(groups::update::<S>)
        .delete(groups::delete::<S>),
    )
    .route(
      "/groups/{id}/members/{contact_id}",
      put(groups::add_member::<S>).delete(groups::remove_member::<S>),
    )
    // Posts
    .route("/posts", get(posts::feed::<S>).post(posts::create::<S>))
    .route("/posts/{id}", axum::routing::delete(posts::delete::<S>))
    .route("/posts/{id}/like", post(posts::like::<S>))
    .route("/posts/{id}/dislike", post(posts::dislike::<S>))
    .route("/posts/{id}/repost", post(posts::repost::<S>))
    // Images
    .route(
      "/images",
      post(images::upload::<S>).layer(DefaultBodyLimit::max(upload_limit)),
    )
    .route("/images/{file}", get(images::download::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
