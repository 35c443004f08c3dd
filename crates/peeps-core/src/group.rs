//! Group: a named collection of contacts.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A named set of contacts owned by one user.
///
/// Membership is a set: adding a contact twice leaves one entry. Deleting a
/// group never touches the contacts it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub group_id:    Uuid,
  pub owner_id:    Uuid,
  pub name:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
  #[serde(default)]
  pub members:     BTreeSet<Uuid>,
}

impl Group {
  pub fn has_member(&self, contact_id: Uuid) -> bool {
    self.members.contains(&contact_id)
  }
}

/// Input to [`crate::store::PeopleStore::add_group`]. Groups always start
/// with no members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}

impl NewGroup {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self { name: name.into(), description: description.into() }
  }

  pub fn normalized(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Empty { field: "name" });
    }
    Ok(Self { name, description: self.description.trim().to_owned() })
  }
}

/// Partial update for a group's descriptive fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl GroupPatch {
  pub fn apply(self, group: &mut Group) -> Result<()> {
    if let Some(name) = self.name {
      let name = name.trim().to_owned();
      if name.is_empty() {
        return Err(Error::Empty { field: "name" });
      }
      group.name = name;
    }
    if let Some(description) = self.description {
      group.description = description.trim().to_owned();
    }
    Ok(())
  }
}
