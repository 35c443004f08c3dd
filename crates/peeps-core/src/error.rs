//! Error types for `peeps-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{field} must not be empty")]
  Empty { field: &'static str },

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("password must be at least {min} characters")]
  WeakPassword { min: usize },

  #[error("unknown reaction: {0:?}")]
  UnknownReaction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
