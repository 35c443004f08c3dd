//! SQLite backend for Peeps.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] implements both
//! [`peeps_core::store::PeopleStore`] and
//! [`peeps_core::identity::IdentityProvider`].

mod encode;
mod identity;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
