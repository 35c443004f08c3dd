//! Per-user reaction state on a post.
//!
//! Each user holds exactly one [`Reaction`] per post, so a user can never be
//! counted as both liking and disliking the same post.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
  #[default]
  None,
  Liked,
  Disliked,
}

impl Reaction {
  /// `Liked` clears; anything else becomes `Liked`.
  pub fn toggle_like(self) -> Self {
    match self {
      Self::Liked => Self::None,
      Self::None | Self::Disliked => Self::Liked,
    }
  }

  /// `Disliked` clears; anything else becomes `Disliked`.
  pub fn toggle_dislike(self) -> Self {
    match self {
      Self::Disliked => Self::None,
      Self::None | Self::Liked => Self::Disliked,
    }
  }

  pub fn is_none(self) -> bool { matches!(self, Self::None) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Liked => "liked",
      Self::Disliked => "disliked",
    }
  }
}

impl fmt::Display for Reaction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Reaction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "none" => Ok(Self::None),
      "liked" => Ok(Self::Liked),
      "disliked" => Ok(Self::Disliked),
      other => Err(Error::UnknownReaction(other.to_owned())),
    }
  }
}
