//! SQL schema for the Peeps SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- trimmed + lowercased
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    photo_url     TEXT,
    created_at    TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id   TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL,
    name         TEXT NOT NULL,
    role         TEXT NOT NULL DEFAULT '',
    organization TEXT NOT NULL DEFAULT '',
    notes        TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL,
    photo_url    TEXT,
    phone        TEXT,
    email        TEXT,
    profile_url  TEXT
);

CREATE TABLE IF NOT EXISTS contact_groups (
    group_id    TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

-- Set semantics: the primary key rejects duplicate members.
CREATE TABLE IF NOT EXISTS group_members (
    group_id   TEXT NOT NULL REFERENCES contact_groups(group_id) ON DELETE CASCADE,
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id) ON DELETE CASCADE,
    PRIMARY KEY (group_id, contact_id)
);

-- `original_post_id` is not a foreign key; reposts outlive the post they
-- copied.
CREATE TABLE IF NOT EXISTS posts (
    post_id          TEXT PRIMARY KEY,
    author_id        TEXT NOT NULL,
    author_name      TEXT NOT NULL,
    content          TEXT NOT NULL,
    created_at       TEXT NOT NULL,   -- fixed-width RFC 3339, sorts lexically
    original_post_id TEXT
);

-- One row per (post, user); absence means no reaction.
CREATE TABLE IF NOT EXISTS reactions (
    post_id  TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    user_id  TEXT NOT NULL,
    reaction TEXT NOT NULL CHECK (reaction IN ('liked', 'disliked')),
    PRIMARY KEY (post_id, user_id)
);

-- Append-only; duplicates are allowed.
CREATE TABLE IF NOT EXISTS reposts (
    repost_seq INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id    TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_owner_idx  ON contacts(owner_id);
CREATE INDEX IF NOT EXISTS groups_owner_idx    ON contact_groups(owner_id);
CREATE INDEX IF NOT EXISTS members_contact_idx ON group_members(contact_id);
CREATE INDEX IF NOT EXISTS posts_created_idx   ON posts(created_at);
CREATE INDEX IF NOT EXISTS sessions_user_idx   ON sessions(user_id);

PRAGMA user_version = 1;
";
