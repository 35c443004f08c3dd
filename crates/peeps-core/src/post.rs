//! Post: a short social update, possibly a repost of another.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, reaction::Reaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:          Uuid,
  pub author_id:        Uuid,
  pub author_name:      String,
  pub content:          String,
  pub created_at:       DateTime<Utc>,
  /// Non-`None` reactions keyed by user.
  #[serde(default)]
  pub reactions:        BTreeMap<Uuid, Reaction>,
  /// One entry per repost, in repost order. A user who reposts twice appears
  /// twice.
  #[serde(default)]
  pub reposted_by:      Vec<Uuid>,
  pub original_post_id: Option<Uuid>,
  /// Snapshot of the original, attached during feed assembly.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub original_post:    Option<Box<Post>>,
}

impl Post {
  pub fn reaction_of(&self, user_id: Uuid) -> Reaction {
    self.reactions.get(&user_id).copied().unwrap_or_default()
  }

  /// Set `user_id`'s reaction; `Reaction::None` removes the entry.
  pub fn set_reaction(&mut self, user_id: Uuid, reaction: Reaction) {
    if reaction.is_none() {
      self.reactions.remove(&user_id);
    } else {
      self.reactions.insert(user_id, reaction);
    }
  }

  pub fn toggle_like(&mut self, user_id: Uuid) -> Reaction {
    let next = self.reaction_of(user_id).toggle_like();
    self.set_reaction(user_id, next);
    next
  }

  pub fn toggle_dislike(&mut self, user_id: Uuid) -> Reaction {
    let next = self.reaction_of(user_id).toggle_dislike();
    self.set_reaction(user_id, next);
    next
  }

  pub fn liked_by(&self) -> Vec<Uuid> { self.users_with(Reaction::Liked) }

  pub fn disliked_by(&self) -> Vec<Uuid> { self.users_with(Reaction::Disliked) }

  pub fn has_reposted(&self, user_id: Uuid) -> bool {
    self.reposted_by.contains(&user_id)
  }

  pub fn is_repost(&self) -> bool { self.original_post_id.is_some() }

  fn users_with(&self, wanted: Reaction) -> Vec<Uuid> {
    self
      .reactions
      .iter()
      .filter(|(_, r)| **r == wanted)
      .map(|(id, _)| *id)
      .collect()
  }
}

/// Input to [`crate::store::PeopleStore::create_post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
  pub author_id:   Uuid,
  pub author_name: String,
  pub content:     String,
}

impl NewPost {
  pub fn new(
    author_id: Uuid,
    author_name: impl Into<String>,
    content: impl Into<String>,
  ) -> Result<Self> {
    let content = content.into();
    if content.trim().is_empty() {
      return Err(Error::Empty { field: "content" });
    }
    Ok(Self { author_id, author_name: author_name.into(), content })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn post() -> Post {
    Post {
      post_id:          Uuid::new_v4(),
      author_id:        Uuid::new_v4(),
      author_name:      "alice@example.com".into(),
      content:          "hello".into(),
      created_at:       Utc::now(),
      reactions:        BTreeMap::new(),
      reposted_by:      Vec::new(),
      original_post_id: None,
      original_post:    None,
    }
  }

  #[test]
  fn like_clears_dislike() {
    let u2 = Uuid::new_v4();
    let mut p = post();
    p.set_reaction(u2, Reaction::Disliked);
    assert_eq!(p.disliked_by(), vec![u2]);

    p.toggle_like(u2);
    assert_eq!(p.liked_by(), vec![u2]);
    assert!(p.disliked_by().is_empty());
  }

  #[test]
  fn dislike_clears_like() {
    let u = Uuid::new_v4();
    let mut p = post();
    p.toggle_like(u);
    p.toggle_dislike(u);
    assert!(p.liked_by().is_empty());
    assert_eq!(p.disliked_by(), vec![u]);
  }

  #[test]
  fn like_is_an_involution_on_liked_by() {
    let u = Uuid::new_v4();
    let other = Uuid::new_v4();
    let mut p = post();
    p.toggle_like(other);
    let before = p.liked_by();

    p.toggle_like(u);
    assert!(p.liked_by().contains(&u));
    assert!(!p.disliked_by().contains(&u));
    p.toggle_like(u);
    assert_eq!(p.liked_by(), before);
  }

  #[test]
  fn clearing_a_reaction_drops_the_entry() {
    let u = Uuid::new_v4();
    let mut p = post();
    p.toggle_dislike(u);
    p.toggle_dislike(u);
    assert!(p.reactions.is_empty());
  }

  #[test]
  fn new_post_rejects_blank_content() {
    assert!(NewPost::new(Uuid::new_v4(), "a", "  \n").is_err());
  }
}
