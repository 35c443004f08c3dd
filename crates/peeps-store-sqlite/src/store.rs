//! [`SqliteStore`]: the SQLite implementation of [`PeopleStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use peeps_core::{
  contact::{Contact, ContactPatch, NewContact},
  group::{Group, GroupPatch, NewGroup},
  post::{NewPost, Post},
  reaction::Reaction,
  store::PeopleStore,
};

use crate::{
  Result,
  encode::{RawContact, RawGroup, RawPost, encode_dt, encode_uuid, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Peeps store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn write_contact(&self, contact: &Contact) -> Result<()> {
    let id_str       = encode_uuid(contact.contact_id);
    let name         = contact.name.clone();
    let role         = contact.role.clone();
    let organization = contact.organization.clone();
    let notes        = contact.notes.clone();
    let photo_url    = contact.photo_url.clone();
    let phone        = contact.phone.clone();
    let email        = contact.email.clone();
    let profile_url  = contact.profile_url.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contacts SET
             name = ?2, role = ?3, organization = ?4, notes = ?5,
             photo_url = ?6, phone = ?7, email = ?8, profile_url = ?9
           WHERE contact_id = ?1",
          params![
            id_str, name, role, organization, notes, photo_url, phone, email,
            profile_url,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn write_group(&self, group: &Group) -> Result<()> {
    let id_str      = encode_uuid(group.group_id);
    let name        = group.name.clone();
    let description = group.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contact_groups SET name = ?2, description = ?3 WHERE group_id = ?1",
          params![id_str, name, description],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Shared body of the two toggle operations.
  async fn toggle_reaction(
    &self,
    post_id: Uuid,
    user_id: Uuid,
    transition: fn(Reaction) -> Reaction,
  ) -> Result<Option<Reaction>> {
    let post_str = encode_uuid(post_id);
    let user_str = encode_uuid(user_id);

    let next = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !post_exists(&tx, &post_str)? {
          return Ok(None);
        }

        let current: Option<String> = tx
          .query_row(
            "SELECT reaction FROM reactions WHERE post_id = ?1 AND user_id = ?2",
            params![post_str, user_str],
            |r| r.get(0),
          )
          .optional()?;
        let current = match current {
          Some(s) => s
            .parse::<Reaction>()
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
          None => Reaction::None,
        };

        let next = transition(current);
        if next.is_none() {
          tx.execute(
            "DELETE FROM reactions WHERE post_id = ?1 AND user_id = ?2",
            params![post_str, user_str],
          )?;
        } else {
          tx.execute(
            "INSERT INTO reactions (post_id, user_id, reaction) VALUES (?1, ?2, ?3)
             ON CONFLICT (post_id, user_id) DO UPDATE SET reaction = excluded.reaction",
            params![post_str, user_str, next.as_str()],
          )?;
        }
        tx.commit()?;
        Ok(Some(next))
      })
      .await?;

    Ok(next)
  }
}

// ─── Row helpers (run on the connection thread) ─────────────────────────────

fn post_exists(conn: &Connection, post_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM posts WHERE post_id = ?1", params![post_id], |_| {
        Ok(true)
      })
      .optional()?
      .unwrap_or(false),
  )
}

fn query_group(conn: &Connection, group_id: &str) -> rusqlite::Result<Option<RawGroup>> {
  let sql = format!("SELECT {} FROM contact_groups WHERE group_id = ?1", RawGroup::COLUMNS);
  let Some(mut group) = conn
    .query_row(&sql, params![group_id], RawGroup::from_row)
    .optional()?
  else {
    return Ok(None);
  };
  group.members = query_members(conn, group_id)?;
  Ok(Some(group))
}

fn query_members(conn: &Connection, group_id: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt =
    conn.prepare_cached("SELECT contact_id FROM group_members WHERE group_id = ?1")?;
  stmt
    .query_map(params![group_id], |r| r.get(0))?
    .collect()
}

fn query_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Option<RawPost>> {
  let sql = format!("SELECT {} FROM posts WHERE post_id = ?1", RawPost::COLUMNS);
  let Some(mut post) = conn
    .query_row(&sql, params![post_id], RawPost::from_row)
    .optional()?
  else {
    return Ok(None);
  };

  let mut stmt =
    conn.prepare_cached("SELECT user_id, reaction FROM reactions WHERE post_id = ?1")?;
  post.reactions = stmt
    .query_map(params![post_id], |r| Ok((r.get(0)?, r.get(1)?)))?
    .collect::<rusqlite::Result<_>>()?;

  let mut stmt = conn.prepare_cached(
    "SELECT user_id FROM reposts WHERE post_id = ?1 ORDER BY repost_seq",
  )?;
  post.reposted_by = stmt
    .query_map(params![post_id], |r| r.get(0))?
    .collect::<rusqlite::Result<_>>()?;

  Ok(Some(post))
}

// ─── PeopleStore impl ────────────────────────────────────────────────────────

impl PeopleStore for SqliteStore {
  type Error = crate::Error;

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn add_contact(&self, owner_id: Uuid, input: NewContact) -> Result<Contact> {
    let input = input.normalized()?;
    let contact = Contact {
      contact_id:   Uuid::new_v4(),
      owner_id,
      name:         input.name,
      role:         input.role,
      organization: input.organization,
      notes:        input.notes,
      created_at:   now(),
      photo_url:    input.photo_url,
      phone:        input.phone,
      email:        input.email,
      profile_url:  input.profile_url,
    };

    let c = contact.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             contact_id, owner_id, name, role, organization, notes,
             created_at, photo_url, phone, email, profile_url
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          params![
            encode_uuid(c.contact_id),
            encode_uuid(c.owner_id),
            c.name,
            c.role,
            c.organization,
            c.notes,
            encode_dt(c.created_at),
            c.photo_url,
            c.phone,
            c.email,
            c.profile_url,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(contact_id = %contact.contact_id, "contact added");
    Ok(contact)
  }

  async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(contact_id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM contacts WHERE contact_id = ?1", RawContact::COLUMNS);
        Ok(conn.query_row(&sql, params![id_str], RawContact::from_row).optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn list_contacts(&self, owner_id: Uuid) -> Result<Vec<Contact>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM contacts WHERE owner_id = ?1 ORDER BY created_at, rowid",
          RawContact::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![owner_str], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn update_contact(
    &self,
    contact_id: Uuid,
    patch:      ContactPatch,
  ) -> Result<Option<Contact>> {
    let mut contact = match self.get_contact(contact_id).await? {
      Some(c) => c,
      None    => return Ok(None),
    };
    patch.apply(&mut contact)?;
    self.write_contact(&contact).await?;
    Ok(Some(contact))
  }

  async fn delete_contact(&self, contact_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(contact_id);

    // Memberships go with the contact via ON DELETE CASCADE.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM contacts WHERE contact_id = ?1", params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, owner_id: Uuid, input: NewGroup) -> Result<Group> {
    let input = input.normalized()?;
    let group = Group {
      group_id:    Uuid::new_v4(),
      owner_id,
      name:        input.name,
      description: input.description,
      created_at:  now(),
      members:     Default::default(),
    };

    let id_str    = encode_uuid(group.group_id);
    let owner_str = encode_uuid(owner_id);
    let name      = group.name.clone();
    let desc      = group.description.clone();
    let at_str    = encode_dt(group.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contact_groups (group_id, owner_id, name, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, owner_str, name, desc, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(group_id = %group.group_id, "group added");
    Ok(group)
  }

  async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
    let id_str = encode_uuid(group_id);
    let raw = self
      .conn
      .call(move |conn| Ok(query_group(conn, &id_str)?))
      .await?;
    raw.map(RawGroup::into_group).transpose()
  }

  async fn list_groups(&self, owner_id: Uuid) -> Result<Vec<Group>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawGroup> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM contact_groups WHERE owner_id = ?1 ORDER BY created_at, rowid",
          RawGroup::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut groups = stmt
          .query_map(params![owner_str], RawGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for g in &mut groups {
          g.members = query_members(conn, &g.group_id)?;
        }
        Ok(groups)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn update_group(&self, group_id: Uuid, patch: GroupPatch) -> Result<Option<Group>> {
    let mut group = match self.get_group(group_id).await? {
      Some(g) => g,
      None    => return Ok(None),
    };
    patch.apply(&mut group)?;
    self.write_group(&group).await?;
    Ok(Some(group))
  }

  async fn delete_group(&self, group_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(group_id);

    // Only memberships cascade; the contacts themselves stay.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM contact_groups WHERE group_id = ?1", params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn add_member(&self, group_id: Uuid, contact_id: Uuid) -> Result<Option<Group>> {
    let group_str   = encode_uuid(group_id);
    let contact_str = encode_uuid(contact_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let contact_exists = tx
          .query_row(
            "SELECT 1 FROM contacts WHERE contact_id = ?1",
            params![contact_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !contact_exists || query_group(&tx, &group_str)?.is_none() {
          return Ok(None);
        }
        tx.execute(
          "INSERT OR IGNORE INTO group_members (group_id, contact_id) VALUES (?1, ?2)",
          params![group_str, contact_str],
        )?;
        let group = query_group(&tx, &group_str)?;
        tx.commit()?;
        Ok(group)
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn remove_member(&self, group_id: Uuid, contact_id: Uuid) -> Result<Option<Group>> {
    let group_str   = encode_uuid(group_id);
    let contact_str = encode_uuid(contact_id);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM group_members WHERE group_id = ?1 AND contact_id = ?2",
          params![group_str, contact_str],
        )?;
        Ok(query_group(conn, &group_str)?)
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      post_id:          Uuid::new_v4(),
      author_id:        input.author_id,
      author_name:      input.author_name,
      content:          input.content,
      created_at:       now(),
      reactions:        Default::default(),
      reposted_by:      Vec::new(),
      original_post_id: None,
      original_post:    None,
    };

    let p = post.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, author_id, author_name, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            encode_uuid(p.post_id),
            encode_uuid(p.author_id),
            p.author_name,
            p.content,
            encode_dt(p.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(post_id = %post.post_id, "post created");
    Ok(post)
  }

  async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(post_id);
    let raw = self
      .conn
      .call(move |conn| Ok(query_post(conn, &id_str)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn feed(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {} FROM posts ORDER BY created_at DESC, rowid DESC",
          RawPost::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut posts = stmt
          .query_map([], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let index: HashMap<String, usize> = posts
          .iter()
          .enumerate()
          .map(|(i, p)| (p.post_id.clone(), i))
          .collect();

        let mut stmt = conn.prepare("SELECT post_id, user_id, reaction FROM reactions")?;
        let rows = stmt.query_map([], |r| {
          Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?))
        })?;
        for row in rows {
          let (post_id, user_id, reaction) = row?;
          if let Some(&i) = index.get(&post_id) {
            posts[i].reactions.push((user_id, reaction));
          }
        }

        let mut stmt =
          conn.prepare("SELECT post_id, user_id FROM reposts ORDER BY repost_seq")?;
        let rows = stmt.query_map([], |r| {
          Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        for row in rows {
          let (post_id, user_id) = row?;
          if let Some(&i) = index.get(&post_id) {
            posts[i].reposted_by.push(user_id);
          }
        }

        Ok(posts)
      })
      .await?;

    let posts = raws
      .into_iter()
      .map(RawPost::into_post)
      .collect::<Result<Vec<_>>>()?;

    // Attach the current snapshot of each original; a deleted original
    // leaves the repost without one.
    let by_id: HashMap<Uuid, Post> =
      posts.iter().map(|p| (p.post_id, p.clone())).collect();
    let feed = posts
      .into_iter()
      .map(|mut p| {
        p.original_post = p
          .original_post_id
          .and_then(|id| by_id.get(&id))
          .cloned()
          .map(Box::new);
        p
      })
      .collect();

    Ok(feed)
  }

  async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(post_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM posts WHERE post_id = ?1", params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Reaction>> {
    self.toggle_reaction(post_id, user_id, Reaction::toggle_like).await
  }

  async fn toggle_dislike(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Reaction>> {
    self.toggle_reaction(post_id, user_id, Reaction::toggle_dislike).await
  }

  async fn repost(
    &self,
    original_post_id: Uuid,
    user_id:          Uuid,
    user_name:        String,
  ) -> Result<Option<Post>> {
    let original_str = encode_uuid(original_post_id);
    let new_id       = Uuid::new_v4();
    let created_at   = now();
    let new_id_str   = encode_uuid(new_id);
    let user_str     = encode_uuid(user_id);
    let at_str       = encode_dt(created_at);
    let name         = user_name.clone();

    let content: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let content: Option<String> = tx
          .query_row(
            "SELECT content FROM posts WHERE post_id = ?1",
            params![original_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(content) = content else {
          return Ok(None);
        };

        tx.execute(
          "INSERT INTO posts (
             post_id, author_id, author_name, content, created_at, original_post_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![new_id_str, user_str, name, content, at_str, original_str],
        )?;
        tx.execute(
          "INSERT INTO reposts (post_id, user_id) VALUES (?1, ?2)",
          params![original_str, user_str],
        )?;
        tx.commit()?;
        Ok(Some(content))
      })
      .await?;

    Ok(content.map(|content| Post {
      post_id: new_id,
      author_id: user_id,
      author_name: user_name,
      content,
      created_at,
      reactions: Default::default(),
      reposted_by: Vec::new(),
      original_post_id: Some(original_post_id),
      original_post: None,
    }))
  }
}
