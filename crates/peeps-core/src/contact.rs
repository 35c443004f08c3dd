//! Contact: a person record tracked by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A person in a user's network. Owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:   Uuid,
  pub owner_id:     Uuid,
  pub name:         String,
  pub role:         String,
  pub organization: String,
  /// Free-text notes.
  pub notes:        String,
  pub created_at:   DateTime<Utc>,
  /// Durable URL returned by the image store.
  pub photo_url:    Option<String>,
  pub phone:        Option<String>,
  pub email:        Option<String>,
  /// A social profile, e.g. a LinkedIn page.
  pub profile_url:  Option<String>,
}

/// Input to [`crate::store::PeopleStore::add_contact`].
/// `contact_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
  pub name:         String,
  #[serde(default)]
  pub role:         String,
  #[serde(default)]
  pub organization: String,
  #[serde(default)]
  pub notes:        String,
  pub photo_url:    Option<String>,
  pub phone:        Option<String>,
  pub email:        Option<String>,
  pub profile_url:  Option<String>,
}

impl NewContact {
  /// Convenience constructor with every optional field empty.
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  /// Trim text fields and collapse blank optionals to `None`.
  pub fn normalized(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::Empty { field: "name" });
    }
    Ok(Self {
      name,
      role: self.role.trim().to_owned(),
      organization: self.organization.trim().to_owned(),
      notes: self.notes,
      photo_url: non_blank(self.photo_url),
      phone: non_blank(self.phone),
      email: non_blank(self.email),
      profile_url: non_blank(self.profile_url),
    })
  }
}

/// Partial update for a contact. `None` leaves a field untouched; for the
/// optional fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub organization: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes:        Option<String>,
  #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
  pub photo_url:    Option<Option<String>>,
  #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
  pub phone:        Option<Option<String>>,
  #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
  pub email:        Option<Option<String>>,
  #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
  pub profile_url:  Option<Option<String>>,
}

impl ContactPatch {
  /// Apply the patch to `contact` in place.
  pub fn apply(self, contact: &mut Contact) -> Result<()> {
    if let Some(name) = self.name {
      let name = name.trim().to_owned();
      if name.is_empty() {
        return Err(Error::Empty { field: "name" });
      }
      contact.name = name;
    }
    if let Some(role) = self.role {
      contact.role = role.trim().to_owned();
    }
    if let Some(org) = self.organization {
      contact.organization = org.trim().to_owned();
    }
    if let Some(notes) = self.notes {
      contact.notes = notes;
    }
    if let Some(v) = self.photo_url {
      contact.photo_url = non_blank(v);
    }
    if let Some(v) = self.phone {
      contact.phone = non_blank(v);
    }
    if let Some(v) = self.email {
      contact.email = non_blank(v);
    }
    if let Some(v) = self.profile_url {
      contact.profile_url = non_blank(v);
    }
    Ok(())
  }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

/// Distinguishes an absent key from an explicit `null` when deserialising a
/// patch body.
mod double_option {
  use serde::{Deserialize, Deserializer, Serialize, Serializer};

  pub fn serialize<S>(
    value: &Option<Option<String>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match value {
      Some(inner) => inner.serialize(serializer),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D,
  ) -> Result<Option<Option<String>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<String>::deserialize(deserializer).map(Some)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alice() -> Contact {
    Contact {
      contact_id:   Uuid::new_v4(),
      owner_id:     Uuid::new_v4(),
      name:         "Alice".into(),
      role:         "Engineer".into(),
      organization: "Acme".into(),
      notes:        String::new(),
      created_at:   Utc::now(),
      photo_url:    None,
      phone:        Some("555-0100".into()),
      email:        None,
      profile_url:  None,
    }
  }

  #[test]
  fn normalized_rejects_blank_name() {
    let err = NewContact::named("   ").normalized().unwrap_err();
    assert!(matches!(err, Error::Empty { field: "name" }));
  }

  #[test]
  fn normalized_collapses_blank_optionals() {
    let input = NewContact {
      email: Some("  ".into()),
      phone: Some(" 555 ".into()),
      ..NewContact::named(" Bob ")
    };
    let out = input.normalized().unwrap();
    assert_eq!(out.name, "Bob");
    assert_eq!(out.email, None);
    assert_eq!(out.phone.as_deref(), Some("555"));
  }

  #[test]
  fn patch_distinguishes_absent_from_null() {
    let patch: ContactPatch =
      serde_json::from_str(r#"{"role":"Manager","phone":null}"#).unwrap();
    let mut c = alice();
    patch.apply(&mut c).unwrap();
    assert_eq!(c.role, "Manager");
    assert_eq!(c.phone, None);
    assert_eq!(c.organization, "Acme");
  }

  #[test]
  fn patch_keeps_optionals_when_absent() {
    let patch: ContactPatch = serde_json::from_str(r#"{"notes":"met at conf"}"#).unwrap();
    let mut c = alice();
    patch.apply(&mut c).unwrap();
    assert_eq!(c.notes, "met at conf");
    assert_eq!(c.phone.as_deref(), Some("555-0100"));
  }
}
