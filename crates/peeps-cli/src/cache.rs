//! Local JSON cache for contacts and groups.
//!
//! Two files live under the cache directory, `contacts.json` and
//! `groups.json`, each a JSON array. Reads fail open: a missing or malformed
//! file means "nothing cached". A list is only written when it is
//! non-empty, so an empty fetch never wipes the cache.

use std::{
  io,
  path::PathBuf,
};

use peeps_core::{contact::Contact, group::Group};
use serde::{Serialize, de::DeserializeOwned};

const CONTACTS_FILE: &str = "contacts.json";
const GROUPS_FILE: &str = "groups.json";

#[derive(Debug, Clone)]
pub struct LocalCache {
  dir: PathBuf,
}

impl LocalCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn load_contacts(&self) -> Vec<Contact> { self.load(CONTACTS_FILE) }

  pub fn load_groups(&self) -> Vec<Group> { self.load(GROUPS_FILE) }

  pub fn save_contacts(&self, contacts: &[Contact]) { self.save(CONTACTS_FILE, contacts) }

  pub fn save_groups(&self, groups: &[Group]) { self.save(GROUPS_FILE, groups) }

  fn load<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
    let path = self.dir.join(name);
    let raw = match std::fs::read_to_string(&path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "cache unreadable");
        return Vec::new();
      }
    };
    match serde_json::from_str(&raw) {
      Ok(items) => items,
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "cache malformed; ignoring");
        Vec::new()
      }
    }
  }

  fn save<T: Serialize>(&self, name: &str, items: &[T]) {
    if items.is_empty() {
      return;
    }
    if let Err(e) = self.try_save(name, items) {
      tracing::warn!(file = name, error = %e, "cache write failed");
    }
  }

  fn try_save<T: Serialize>(&self, name: &str, items: &[T]) -> io::Result<()> {
    std::fs::create_dir_all(&self.dir)?;
    let json = serde_json::to_vec_pretty(items)?;
    std::fs::write(self.dir.join(name), json)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn temp_cache() -> LocalCache {
    LocalCache::new(std::env::temp_dir().join(format!("peeps-cache-test-{}", Uuid::new_v4())))
  }

  fn contact(name: &str) -> Contact {
    Contact {
      contact_id:   Uuid::new_v4(),
      owner_id:     Uuid::new_v4(),
      name:         name.into(),
      role:         String::new(),
      organization: String::new(),
      notes:        String::new(),
      created_at:   Utc::now(),
      photo_url:    None,
      phone:        None,
      email:        None,
      profile_url:  None,
    }
  }

  #[test]
  fn missing_files_load_empty() {
    let cache = temp_cache();
    assert!(cache.load_contacts().is_empty());
    assert!(cache.load_groups().is_empty());
  }

  #[test]
  fn contacts_survive_a_save() {
    let cache = temp_cache();
    let saved = vec![contact("Alice"), contact("Bob")];
    cache.save_contacts(&saved);
    assert_eq!(cache.load_contacts(), saved);
  }

  #[test]
  fn empty_lists_do_not_overwrite() {
    let cache = temp_cache();
    let saved = vec![contact("Alice")];
    cache.save_contacts(&saved);
    cache.save_contacts(&[]);
    assert_eq!(cache.load_contacts(), saved);
  }

  #[test]
  fn malformed_file_is_treated_as_empty() {
    let cache = temp_cache();
    std::fs::create_dir_all(&cache.dir).unwrap();
    std::fs::write(cache.dir.join(GROUPS_FILE), "{not json").unwrap();
    assert!(cache.load_groups().is_empty());
  }
}
