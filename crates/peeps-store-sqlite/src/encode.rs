//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use peeps_core::{
  contact::Contact,
  group::Group,
  identity::User,
  post::Post,
  reaction::Reaction,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Current time truncated to the stored precision, so values read back
/// compare equal to the ones returned at creation.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub photo_url:  Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, email, photo_url, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      email:      row.get(1)?,
      photo_url:  row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      photo_url:  self.photo_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:   String,
  pub owner_id:     String,
  pub name:         String,
  pub role:         String,
  pub organization: String,
  pub notes:        String,
  pub created_at:   String,
  pub photo_url:    Option<String>,
  pub phone:        Option<String>,
  pub email:        Option<String>,
  pub profile_url:  Option<String>,
}

impl RawContact {
  pub const COLUMNS: &'static str = "contact_id, owner_id, name, role, organization, notes, \
                                     created_at, photo_url, phone, email, profile_url";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:   row.get(0)?,
      owner_id:     row.get(1)?,
      name:         row.get(2)?,
      role:         row.get(3)?,
      organization: row.get(4)?,
      notes:        row.get(5)?,
      created_at:   row.get(6)?,
      photo_url:    row.get(7)?,
      phone:        row.get(8)?,
      email:        row.get(9)?,
      profile_url:  row.get(10)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:   decode_uuid(&self.contact_id)?,
      owner_id:     decode_uuid(&self.owner_id)?,
      name:         self.name,
      role:         self.role,
      organization: self.organization,
      notes:        self.notes,
      created_at:   decode_dt(&self.created_at)?,
      photo_url:    self.photo_url,
      phone:        self.phone,
      email:        self.email,
      profile_url:  self.profile_url,
    })
  }
}

/// A `contact_groups` row plus its member ids.
pub struct RawGroup {
  pub group_id:    String,
  pub owner_id:    String,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
  pub members:     Vec<String>,
}

impl RawGroup {
  pub const COLUMNS: &'static str = "group_id, owner_id, name, description, created_at";

  /// Reads the group columns; `members` is filled in separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      group_id:    row.get(0)?,
      owner_id:    row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      created_at:  row.get(4)?,
      members:     Vec::new(),
    })
  }

  pub fn into_group(self) -> Result<Group> {
    let members = self
      .members
      .iter()
      .map(|m| decode_uuid(m))
      .collect::<Result<BTreeSet<_>>>()?;
    Ok(Group {
      group_id: decode_uuid(&self.group_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      name: self.name,
      description: self.description,
      created_at: decode_dt(&self.created_at)?,
      members,
    })
  }
}

/// A `posts` row plus its reaction and repost rows.
pub struct RawPost {
  pub post_id:          String,
  pub author_id:        String,
  pub author_name:      String,
  pub content:          String,
  pub created_at:       String,
  pub original_post_id: Option<String>,
  /// `(user_id, reaction)` pairs.
  pub reactions:        Vec<(String, String)>,
  /// User ids in repost order.
  pub reposted_by:      Vec<String>,
}

impl RawPost {
  pub const COLUMNS: &'static str =
    "post_id, author_id, author_name, content, created_at, original_post_id";

  /// Reads the post columns; reactions and reposts are filled in separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:          row.get(0)?,
      author_id:        row.get(1)?,
      author_name:      row.get(2)?,
      content:          row.get(3)?,
      created_at:       row.get(4)?,
      original_post_id: row.get(5)?,
      reactions:        Vec::new(),
      reposted_by:      Vec::new(),
    })
  }

  pub fn into_post(self) -> Result<Post> {
    let reactions = self
      .reactions
      .iter()
      .map(|(user, reaction)| {
        Ok((decode_uuid(user)?, reaction.parse::<Reaction>()?))
      })
      .collect::<Result<BTreeMap<_, _>>>()?;

    let reposted_by = self
      .reposted_by
      .iter()
      .map(|u| decode_uuid(u))
      .collect::<Result<Vec<_>>>()?;

    Ok(Post {
      post_id: decode_uuid(&self.post_id)?,
      author_id: decode_uuid(&self.author_id)?,
      author_name: self.author_name,
      content: self.content,
      created_at: decode_dt(&self.created_at)?,
      reactions,
      reposted_by,
      original_post_id: self
        .original_post_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      original_post: None,
    })
  }
}
