//! The `PeopleStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `peeps-store-sqlite`).
//! Higher layers (`peeps-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  contact::{Contact, ContactPatch, NewContact},
  group::{Group, GroupPatch, NewGroup},
  post::{NewPost, Post},
  reaction::Reaction,
};

/// Abstraction over the contact, group and post collections.
///
/// Lookups and mutations addressed at a missing record return `Ok(None)` (or
/// `Ok(false)` for deletes) rather than an error.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PeopleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Persist a new contact owned by `owner_id`. The store assigns the id
  /// and creation timestamp.
  fn add_contact(
    &self,
    owner_id: Uuid,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// All contacts owned by `owner_id`, oldest first.
  fn list_contacts(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  fn update_contact(
    &self,
    contact_id: Uuid,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Delete a contact and drop it from every group it belongs to.
  fn delete_contact(
    &self,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Persist a new, empty group owned by `owner_id`.
  fn add_group(
    &self,
    owner_id: Uuid,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  /// All groups owned by `owner_id`, oldest first.
  fn list_groups(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  fn update_group(
    &self,
    group_id: Uuid,
    patch: GroupPatch,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  /// Delete a group. Member contacts are left untouched.
  fn delete_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set-union a contact into a group's members.
  fn add_member(
    &self,
    group_id: Uuid,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  /// Set-remove a contact from a group's members.
  fn remove_member(
    &self,
    group_id: Uuid,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post with no reactions or reposts.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// A single post, without the original-post snapshot.
  fn get_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Every post, newest first, with the current snapshot of the original
  /// attached to each repost whose original still exists.
  fn feed(&self) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  fn delete_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Flip `user_id`'s like on a post. Returns the resulting reaction, or
  /// `None` if the post does not exist.
  fn toggle_like(
    &self,
    post_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Reaction>, Self::Error>> + Send + '_;

  /// Flip `user_id`'s dislike on a post. Mirror of
  /// [`PeopleStore::toggle_like`].
  fn toggle_dislike(
    &self,
    post_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Reaction>, Self::Error>> + Send + '_;

  /// Copy the original's content into a new post authored by `user_id`
  /// and append `user_id` to the original's `reposted_by`. Repeated reposts
  /// are not deduplicated. `None` if the original does not exist.
  fn repost(
    &self,
    original_post_id: Uuid,
    user_id: Uuid,
    user_name: String,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;
}
